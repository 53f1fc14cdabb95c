//! Modification-time precision policy.
//!
//! The mtime get/set precision varies between filesystems and kernel APIs, so
//! two independently captured timestamps for the same file may disagree in
//! their low-order digits. The policy describes how many of those digits must
//! be discarded before comparison. It is probed once at process start and
//! passed into every comparison; the comparison logic never reads it from
//! ambient global state.

use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;

use filetime::FileTime;

/// How much of a nanosecond timestamp survives a set/get round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecisionPolicy {
    Nanosecond,
    Microsecond,
    Second,
}

impl PrecisionPolicy {
    /// Rounding step in nanoseconds.
    pub fn step(self) -> i64 {
        match self {
            PrecisionPolicy::Nanosecond => 1,
            PrecisionPolicy::Microsecond => 1_000,
            PrecisionPolicy::Second => 1_000_000_000,
        }
    }

    /// Round a nanosecond timestamp to this policy's step.
    pub fn reduce(self, ns: i64) -> i64 {
        reduce_to_step(ns, self.step())
    }
}

/// Mtime rounding step used when one side is served through a virtualizing
/// filesystem layer. Such layers do not expose nanosecond precision; the last
/// four decimal digits are discarded.
pub const VIRTUALIZED_MTIME_STEP: i64 = 10_000;

/// Round `ns` to the nearest multiple of `step`. Idempotent: a value already
/// on the step grid maps to itself.
pub fn reduce_to_step(ns: i64, step: i64) -> i64 {
    if step <= 1 {
        return ns;
    }
    (ns + step / 2).div_euclid(step) * step
}

/// Platform timestamp capabilities, probed once per process.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Mtime precision that survives a set/get round trip.
    pub mtime: PrecisionPolicy,
    /// Whether symlink mtimes can be addressed without following the link.
    /// When false, symlink timestamps are a known blind spot and are excluded
    /// from comparison.
    pub symlink_mtime: bool,
}

const PROBE_NANOS: u32 = 123_456_789;

impl Capabilities {
    /// Full-precision capabilities, for injecting into tests.
    pub fn exact() -> Self {
        Capabilities {
            mtime: PrecisionPolicy::Nanosecond,
            symlink_mtime: true,
        }
    }

    /// Probe the platform by round-tripping a known nanosecond mtime through
    /// a scratch file, and by attempting to set a scratch symlink's times.
    pub fn probe() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;

        let file = dir.path().join("mtime-probe");
        fs::write(&file, b"")?;
        let want = FileTime::from_unix_time(1_000_000_000, PROBE_NANOS);
        filetime::set_file_mtime(&file, want)?;
        let got = fs::symlink_metadata(&file)?.mtime_nsec();

        let mtime = if got == i64::from(PROBE_NANOS) {
            PrecisionPolicy::Nanosecond
        } else if got / 1_000 == i64::from(PROBE_NANOS) / 1_000 {
            PrecisionPolicy::Microsecond
        } else {
            PrecisionPolicy::Second
        };

        let link = dir.path().join("symlink-probe");
        std::os::unix::fs::symlink("mtime-probe", &link)?;
        let symlink_mtime = filetime::set_symlink_file_times(&link, want, want).is_ok();

        Ok(Capabilities {
            mtime,
            symlink_mtime,
        })
    }
}
