//! Verify that two directory trees are semantically identical: same names,
//! same structure, and matching filesystem metadata, tolerant of platform
//! timestamp precision loss and of approximations introduced by virtualizing
//! filesystem layers.
//!
//! The comparison is all-or-nothing: [`verify`] walks both trees in lockstep
//! and aborts at the first structural or metadata mismatch. There is no diff
//! reporting and no merge capability; this is a pass/fail oracle for
//! backup/restore correctness checks.

pub mod compare;
pub mod error;
pub mod meta;
pub mod mount;
pub mod precision;
pub mod stats;
pub mod suite;

pub use compare::{verify, TreeComparison, Verbosity, VerifyOptions};
pub use error::{MountTimeout, VerifyError};
pub use mount::{is_mount_point, wait_for_mount, DEFAULT_MOUNT_TIMEOUT};
pub use precision::{Capabilities, PrecisionPolicy};
