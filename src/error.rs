use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::meta::EntryRecord;
use crate::stats::DiffReasons;

/// First mismatch found while verifying two trees. Paths are relative to the
/// compared roots, except for `Io` which names the path the read failed on.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{}: present only in left tree", .path.display())]
    LeftOnly { path: PathBuf },

    #[error("{}: present only in right tree", .path.display())]
    RightOnly { path: PathBuf },

    #[error("{}: content differs [{reasons}]", .path.display())]
    Different { path: PathBuf, reasons: DiffReasons },

    /// Same name on both sides but the pair cannot be compared: incompatible
    /// entry types, or the content could not be read.
    #[error("{}: not comparable ({detail})", .path.display())]
    Funny { path: PathBuf, detail: String },

    #[error(
        "{}: metadata differs [{fields}]\n  left:  {left}\n  right: {right}",
        .path.display()
    )]
    Metadata {
        path: PathBuf,
        fields: FieldSet,
        left: EntryRecord,
        right: EntryRecord,
    },

    /// Fatal read error on a core stat or readdir call.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VerifyError {
    /// True for a genuine tree mismatch, false for an I/O failure that
    /// prevented comparison.
    pub fn is_mismatch(&self) -> bool {
        !matches!(self, VerifyError::Io { .. })
    }
}

/// Names of the metadata fields that differed between two records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet(Vec<&'static str>);

impl FieldSet {
    pub fn new(fields: Vec<&'static str>) -> Self {
        FieldSet(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| *f == field)
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// A filesystem was not observed mounted on `path` within the deadline.
#[derive(Debug, Error)]
#[error("{}: not mounted after {:?}", .path.display(), .timeout)]
pub struct MountTimeout {
    pub path: PathBuf,
    pub timeout: Duration,
}
