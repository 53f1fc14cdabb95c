//! Wait for a filesystem to appear on a mount point.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::MountTimeout;

pub const DEFAULT_MOUNT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// True if `path` is the root of a currently mounted filesystem.
///
/// Symlinks and unstattable paths are never mount points. Otherwise the entry
/// is a mount point when its device differs from its parent's, or when its
/// inode equals the parent's (the filesystem root).
pub fn is_mount_point(path: &Path) -> bool {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(_) => return false,
    };
    if meta.file_type().is_symlink() {
        return false;
    }
    let parent = match fs::symlink_metadata(path.join("..")) {
        Ok(m) => m,
        Err(_) => return false,
    };
    meta.dev() != parent.dev() || meta.ino() == parent.ino()
}

/// Block until a filesystem is mounted on `path`, polling every 100ms.
/// Fails once the deadline elapses. No backoff, no cancellation.
pub fn wait_for_mount(path: &Path, timeout: Duration) -> Result<(), MountTimeout> {
    let deadline = Instant::now() + timeout;
    loop {
        if is_mount_point(path) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(MountTimeout {
                path: path.to_path_buf(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}
