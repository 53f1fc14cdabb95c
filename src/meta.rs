//! Per-entry metadata capture and comparison.
//!
//! An [`EntryRecord`] is built fresh for each entry pair at comparison time
//! with symlink-aware stat (never follows links), and never reused across
//! entries. Two records are equal iff every included field compares equal;
//! excluded fields (`nlink` for virtualized directories, `mtime_ns` for
//! symlinks on platforms that cannot address symlink times) are `None` on
//! both sides and therefore never fail the comparison.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::error::FieldSet;
use crate::precision::{reduce_to_step, Capabilities, VIRTUALIZED_MTIME_STEP};
use crate::stats::Stats;

/// Extended attributes for one entry, or the signal that none could be read
/// because the attribute interface is unsupported or denied here.
#[derive(Debug)]
pub enum Xattrs {
    Map(BTreeMap<OsString, Vec<u8>>),
    Unsupported,
}

/// Fetch all extended attributes of `path` without following symlinks.
///
/// Unsupported/denied is a normal answer (`Xattrs::Unsupported`), so that
/// filesystems lacking xattr support do not fail unrelated comparisons. Any
/// other I/O failure propagates.
pub fn read_xattrs(path: &Path) -> io::Result<Xattrs> {
    #[cfg(unix)]
    {
        let names = match xattr::list(path) {
            Ok(names) => names,
            Err(e) if xattr_unsupported(&e) => return Ok(Xattrs::Unsupported),
            Err(e) => return Err(e),
        };
        let mut map = BTreeMap::new();
        for name in names {
            match xattr::get(path, &name) {
                // Attribute vanished between list and get
                Ok(None) => {}
                Ok(Some(value)) => {
                    map.insert(name, value);
                }
                Err(e) if xattr_unsupported(&e) => return Ok(Xattrs::Unsupported),
                Err(e) => return Err(e),
            }
        }
        Ok(Xattrs::Map(map))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(Xattrs::Unsupported)
    }
}

#[cfg(unix)]
fn xattr_unsupported(err: &io::Error) -> bool {
    match err.raw_os_error() {
        Some(code) => {
            code == libc::ENOTSUP
                || code == libc::EOPNOTSUPP
                || code == libc::ENOSYS
                || code == libc::EPERM
                || code == libc::EACCES
        }
        None => false,
    }
}

/// Snapshot of the metadata fields compared for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub name: OsString,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    /// None when the entry is a directory in a virtualized comparison:
    /// virtual layers synthesize a constant directory link count.
    pub nlink: Option<u64>,
    /// Precision-reduced modification time. None when the entry is a symlink
    /// and the platform cannot address symlink times.
    pub mtime_ns: Option<i64>,
    pub xattrs: BTreeMap<OsString, Vec<u8>>,
}

impl EntryRecord {
    /// Capture a record for the entry at `path` using symlink-aware stat.
    pub fn capture(
        path: &Path,
        name: &OsStr,
        virtualized: bool,
        caps: &Capabilities,
        stats: &Stats,
    ) -> io::Result<EntryRecord> {
        let st = fs::symlink_metadata(path)?;
        let is_symlink = st.file_type().is_symlink();

        let nlink = if virtualized && st.is_dir() {
            None
        } else {
            Some(st.nlink())
        };

        let mtime_ns = if is_symlink && !caps.symlink_mtime {
            None
        } else {
            let raw = st.mtime() * 1_000_000_000 + st.mtime_nsec();
            let step = if virtualized {
                VIRTUALIZED_MTIME_STEP
            } else {
                caps.mtime.step()
            };
            Some(reduce_to_step(raw, step))
        };

        let xattrs = match read_xattrs(path)? {
            Xattrs::Map(map) => map,
            Xattrs::Unsupported => {
                stats.inc_xattr_downgraded();
                BTreeMap::new()
            }
        };

        Ok(EntryRecord {
            name: name.to_os_string(),
            mode: st.mode(),
            uid: st.uid(),
            gid: st.gid(),
            rdev: st.rdev(),
            nlink,
            mtime_ns,
            xattrs,
        })
    }

    /// Names of the fields that differ between the two records.
    pub fn diff_fields(&self, other: &EntryRecord) -> FieldSet {
        let mut fields = Vec::new();
        if self.name != other.name {
            fields.push("name");
        }
        if self.mode != other.mode {
            fields.push("mode");
        }
        if self.uid != other.uid {
            fields.push("uid");
        }
        if self.gid != other.gid {
            fields.push("gid");
        }
        if self.rdev != other.rdev {
            fields.push("rdev");
        }
        if self.nlink != other.nlink {
            fields.push("nlink");
        }
        if self.mtime_ns != other.mtime_ns {
            fields.push("mtime");
        }
        if self.xattrs != other.xattrs {
            fields.push("xattrs");
        }
        FieldSet::new(fields)
    }
}

impl fmt::Display for EntryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={:o} uid={} gid={} rdev={}",
            self.mode, self.uid, self.gid, self.rdev
        )?;
        match self.nlink {
            Some(n) => write!(f, " nlink={}", n)?,
            None => write!(f, " nlink=-")?,
        }
        match self.mtime_ns {
            Some(ns) => write!(f, " mtime_ns={}", ns)?,
            None => write!(f, " mtime_ns=-")?,
        }
        write!(f, " xattrs=[")?;
        for (i, name) in self.xattrs.keys().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name.to_string_lossy())?;
        }
        write!(f, "]")
    }
}
