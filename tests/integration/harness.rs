//! Shared test infrastructure for programmatic test directory setup.
//!
//! Trees are described with the `Entry` DSL, created under a temp directory,
//! and then have every mtime frozen to one fixed timestamp (children before
//! parents) so that metadata comparison only trips on differences a test
//! introduces on purpose.

use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;

/// Filesystem entry for test setup.
#[derive(Clone, Debug)]
#[allow(dead_code)] // Not every test module uses every variant
pub enum Entry {
    /// Regular file with name and content: `File("name.txt", "content")`
    File(&'static str, &'static str),
    /// Empty directory: `Dir("dirname")`
    Dir(&'static str),
    /// Symlink: `Sym("link", "target")`
    Sym(&'static str, &'static str),
}

#[allow(unused_imports)]
pub use Entry::*;

/// Create filesystem entries in the given directory.
pub fn create_entries(dir: &Path, entries: &[Entry]) {
    for entry in entries {
        match entry {
            Entry::File(name, content) => {
                let path = dir.join(name);
                if let Some(parent) = path.parent() {
                    if parent != dir {
                        fs::create_dir_all(parent).unwrap();
                    }
                }
                fs::write(&path, content).unwrap();
            }
            Entry::Dir(name) => {
                fs::create_dir_all(dir.join(name)).unwrap();
            }
            Entry::Sym(name, target) => {
                std::os::unix::fs::symlink(target, dir.join(name)).unwrap();
            }
        }
    }
}

pub fn frozen_time() -> FileTime {
    FileTime::from_unix_time(1_700_000_000, 123_456_789)
}

/// Set every mtime under `dir` (and `dir` itself) to `ft`, children before
/// parents so the directory updates stick.
pub fn freeze_times_to(dir: &Path, ft: FileTime) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let meta = fs::symlink_metadata(&path).unwrap();
        if meta.is_dir() {
            freeze_times_to(&path, ft);
        } else if meta.file_type().is_symlink() {
            let _ = filetime::set_symlink_file_times(&path, ft, ft);
        } else {
            filetime::set_file_times(&path, ft, ft).unwrap();
        }
    }
    filetime::set_file_times(dir, ft, ft).unwrap();
}

pub fn freeze_times(dir: &Path) {
    freeze_times_to(dir, frozen_time());
}

/// Two trees under one temp directory, mtimes frozen to the same instant.
/// The TempDir must stay alive for the duration of the test.
pub struct TestTrees {
    _tmp: tempfile::TempDir,
    pub a: PathBuf,
    pub b: PathBuf,
}

impl TestTrees {
    pub fn a_str(&self) -> String {
        self.a.to_str().unwrap().to_string()
    }

    pub fn b_str(&self) -> String {
        self.b.to_str().unwrap().to_string()
    }
}

pub fn setup(left: &[Entry], right: &[Entry]) -> TestTrees {
    let tmp = tempfile::tempdir().expect("Failed to create temp dir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    create_entries(&a, left);
    create_entries(&b, right);
    freeze_times(&a);
    freeze_times(&b);
    TestTrees { _tmp: tmp, a, b }
}
