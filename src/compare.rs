//! Recursive directory-equality engine.
//!
//! [`verify`] walks two trees in lockstep, depth-first over sorted names, and
//! aborts at the first structural or metadata mismatch. Per directory level
//! the checks run in a fixed order (one-side-only names, then content
//! differences, then uncomparable pairs, then per-entry metadata), so the
//! first failure is deterministic. [`TreeComparison::compute`] exposes the
//! full recursive structural diff for library consumers.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::error::VerifyError;
use crate::meta::EntryRecord;
use crate::precision::Capabilities;
use crate::stats::{DiffReasons, Stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Dirs,
    Entries,
}

/// Options for one verification run. The capability policy is computed once
/// at startup and passed in here; the walk never consults global state.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// One side is served through a virtualizing filesystem layer: accept its
    /// synthesized directory link counts and coarser mtime precision.
    pub virtualized: bool,
    pub caps: Capabilities,
    /// Number of random 32-byte windows to compare per file pair.
    pub samples: u32,
    /// Full BLAKE3 content comparison for file pairs.
    pub hash: bool,
    pub verbosity: Verbosity,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            virtualized: false,
            caps: Capabilities::exact(),
            samples: 0,
            hash: false,
            verbosity: Verbosity::Quiet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
    Symlink,
    Other,
}

impl EntryKind {
    fn of(meta: &fs::Metadata) -> EntryKind {
        let ft = meta.file_type();
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Dir => "directory",
            EntryKind::File => "file",
            EntryKind::Symlink => "symlink",
            EntryKind::Other => "special file",
        };
        write!(f, "{}", label)
    }
}

/// Structural comparison of two directories at the same relative path.
///
/// For overall equality, `left_only`, `right_only`, `diff_files`, and
/// `funny_files` must be empty at every level.
#[derive(Debug, Default)]
pub struct TreeComparison {
    pub left_only: BTreeSet<OsString>,
    pub right_only: BTreeSet<OsString>,
    pub common: BTreeSet<OsString>,
    /// Same name, differing content by quick comparison.
    pub diff_files: BTreeMap<OsString, DiffReasons>,
    /// Same name, uncomparable: incompatible types or unreadable content.
    pub funny_files: BTreeMap<OsString, String>,
    /// Common names that are directories on both sides.
    pub common_dirs: BTreeSet<OsString>,
    /// One entry per common subdirectory, filled by [`TreeComparison::compute`].
    pub subdirs: BTreeMap<OsString, TreeComparison>,
}

impl TreeComparison {
    /// Compare one directory level: partition names and classify every
    /// common pair. Does not recurse.
    pub fn compute_level(
        left_dir: &Path,
        right_dir: &Path,
        opts: &VerifyOptions,
    ) -> Result<TreeComparison, VerifyError> {
        let left_names = read_dir_names(left_dir)?;
        let right_names = read_dir_names(right_dir)?;

        let mut cmp = TreeComparison {
            left_only: left_names.difference(&right_names).cloned().collect(),
            right_only: right_names.difference(&left_names).cloned().collect(),
            common: left_names.intersection(&right_names).cloned().collect(),
            ..TreeComparison::default()
        };

        for name in &cmp.common {
            let left_path = left_dir.join(name);
            let right_path = right_dir.join(name);

            let left_meta = fs::symlink_metadata(&left_path).map_err(|e| VerifyError::Io {
                path: left_path.clone(),
                source: e,
            })?;
            let right_meta = fs::symlink_metadata(&right_path).map_err(|e| VerifyError::Io {
                path: right_path.clone(),
                source: e,
            })?;

            let left_kind = EntryKind::of(&left_meta);
            let right_kind = EntryKind::of(&right_meta);
            if left_kind != right_kind {
                cmp.funny_files.insert(
                    name.clone(),
                    format!("left is a {}, right is a {}", left_kind, right_kind),
                );
                continue;
            }

            match left_kind {
                EntryKind::Dir => {
                    cmp.common_dirs.insert(name.clone());
                }
                EntryKind::File => {
                    if opts.verbosity >= Verbosity::Entries {
                        println!(
                            "DEBUG: Comparing file {} to {}",
                            left_path.display(),
                            right_path.display()
                        );
                    }
                    let quick = quick_compare_file(
                        &left_path,
                        &right_path,
                        left_meta.len(),
                        right_meta.len(),
                        opts,
                    );
                    match quick {
                        Ok(reasons) if reasons.any() => {
                            cmp.diff_files.insert(name.clone(), reasons);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            cmp.funny_files
                                .insert(name.clone(), format!("read failed: {}", e));
                        }
                    }
                }
                EntryKind::Symlink => {
                    match (fs::read_link(&left_path), fs::read_link(&right_path)) {
                        (Ok(l), Ok(r)) if l != r => {
                            cmp.diff_files.insert(name.clone(), DiffReasons::target());
                        }
                        (Ok(_), Ok(_)) => {}
                        (Err(e), _) | (_, Err(e)) => {
                            cmp.funny_files
                                .insert(name.clone(), format!("read failed: {}", e));
                        }
                    }
                }
                // Device/FIFO/socket pairs carry no readable content; the
                // metadata phase compares their mode and rdev.
                EntryKind::Other => {}
            }
        }

        Ok(cmp)
    }

    /// Full recursive structural diff, one node per common subdirectory.
    pub fn compute(
        left_dir: &Path,
        right_dir: &Path,
        opts: &VerifyOptions,
    ) -> Result<TreeComparison, VerifyError> {
        let mut node = Self::compute_level(left_dir, right_dir, opts)?;
        for name in node.common_dirs.clone() {
            let sub = Self::compute(&left_dir.join(&name), &right_dir.join(&name), opts)?;
            node.subdirs.insert(name, sub);
        }
        Ok(node)
    }

    /// True when no level of the comparison holds a mismatch.
    pub fn is_clean(&self) -> bool {
        self.left_only.is_empty()
            && self.right_only.is_empty()
            && self.diff_files.is_empty()
            && self.funny_files.is_empty()
            && self.subdirs.values().all(|s| s.is_clean())
    }
}

/// Verify that the trees rooted at `left` and `right` are identical in
/// structure and metadata. Returns at the first mismatch; there is no
/// partial-success mode.
pub fn verify(
    left: &Path,
    right: &Path,
    opts: &VerifyOptions,
    stats: &Stats,
) -> Result<(), VerifyError> {
    walk(left, right, Path::new(""), opts, stats)
}

fn walk(
    left_dir: &Path,
    right_dir: &Path,
    rel: &Path,
    opts: &VerifyOptions,
    stats: &Stats,
) -> Result<(), VerifyError> {
    if opts.verbosity >= Verbosity::Dirs {
        println!(
            "DEBUG: Comparing {} to {}",
            left_dir.display(),
            right_dir.display()
        );
    }
    stats.inc_dirs();

    let cmp = TreeComparison::compute_level(left_dir, right_dir, opts)?;

    if let Some(name) = cmp.left_only.iter().next() {
        return Err(VerifyError::LeftOnly {
            path: rel.join(name),
        });
    }
    if let Some(name) = cmp.right_only.iter().next() {
        return Err(VerifyError::RightOnly {
            path: rel.join(name),
        });
    }
    if let Some((name, reasons)) = cmp.diff_files.iter().next() {
        return Err(VerifyError::Different {
            path: rel.join(name),
            reasons: reasons.clone(),
        });
    }
    if let Some((name, detail)) = cmp.funny_files.iter().next() {
        return Err(VerifyError::Funny {
            path: rel.join(name),
            detail: detail.clone(),
        });
    }

    for name in &cmp.common {
        stats.inc_entries();
        let left_path = left_dir.join(name);
        let right_path = right_dir.join(name);

        let left_record =
            EntryRecord::capture(&left_path, name, opts.virtualized, &opts.caps, stats).map_err(
                |e| VerifyError::Io {
                    path: left_path.clone(),
                    source: e,
                },
            )?;
        let right_record =
            EntryRecord::capture(&right_path, name, opts.virtualized, &opts.caps, stats).map_err(
                |e| VerifyError::Io {
                    path: right_path.clone(),
                    source: e,
                },
            )?;

        if left_record != right_record {
            return Err(VerifyError::Metadata {
                path: rel.join(name),
                fields: left_record.diff_fields(&right_record),
                left: left_record,
                right: right_record,
            });
        }
    }

    for name in &cmp.common_dirs {
        walk(
            &left_dir.join(name),
            &right_dir.join(name),
            &rel.join(name),
            opts,
            stats,
        )?;
    }

    Ok(())
}

// ── Quick content comparison ────────────────────────────────────────────────

/// Compare two files without reading them fully: size check, then random
/// samples, then a full BLAKE3 hash. Each later stage only runs if the
/// previous one found no difference.
fn quick_compare_file(
    left: &Path,
    right: &Path,
    left_size: u64,
    right_size: u64,
    opts: &VerifyOptions,
) -> std::io::Result<DiffReasons> {
    let mut reasons = DiffReasons::default();

    if left_size != right_size {
        reasons.size = true;
    }

    if !reasons.any() && opts.samples > 0 && left_size > 0 {
        let mut rng = rand::rng();
        let sample_size: u64 = 32;

        for _ in 0..opts.samples {
            let max_offset = left_size.saturating_sub(sample_size);
            let offset = if max_offset > 0 {
                rng.random_range(0..=max_offset)
            } else {
                0
            };
            let read_len = std::cmp::min(sample_size, left_size) as usize;

            let a = read_sample(left, offset, read_len)?;
            let b = read_sample(right, offset, read_len)?;
            if a != b {
                reasons.sample = true;
                break;
            }
        }
    }

    if !reasons.any() && opts.hash {
        let (left_hash, right_hash) = rayon::join(|| hash_file(left), || hash_file(right));
        let left_hash = left_hash?;
        let right_hash = right_hash?;

        if opts.verbosity >= Verbosity::Entries {
            println!("DEBUG: BLAKE3 {} {}", left_hash.to_hex(), left.display());
            println!("DEBUG: BLAKE3 {} {}", right_hash.to_hex(), right.display());
        }

        if left_hash != right_hash {
            reasons.hash = true;
        }
    }

    Ok(reasons)
}

// ── Utilities ───────────────────────────────────────────────────────────────

fn read_dir_names(dir: &Path) -> Result<BTreeSet<OsString>, VerifyError> {
    let io_err = |e| VerifyError::Io {
        path: PathBuf::from(dir),
        source: e,
    };
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        names.insert(entry.file_name());
    }
    Ok(names)
}

fn read_sample(path: &Path, offset: u64, len: usize) -> std::io::Result<Vec<u8>> {
    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

fn hash_file(path: &Path) -> std::io::Result<blake3::Hash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap_rayon(path)?;
    Ok(hasher.finalize())
}
