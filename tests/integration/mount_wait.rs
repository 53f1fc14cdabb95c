use std::time::{Duration, Instant};

use predicates::prelude::*;
use serial_test::serial;

use super::harness::{setup, File};
use super::cmd;

#[test]
#[serial]
fn wait_mount_times_out() {
    // A plain temp directory never becomes a mount point.
    let t = setup(&[], &[]);
    let start = Instant::now();
    cmd()
        .args([&t.a_str(), &t.b_str(), "--wait-mount", "1"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("TIMEOUT:").and(predicate::str::contains("not mounted")));
    let elapsed = start.elapsed();

    assert!(
        elapsed >= Duration::from_secs(1),
        "timed out too early: {:?}",
        elapsed
    );
    assert!(
        elapsed < Duration::from_secs(4),
        "timed out too late: {:?}",
        elapsed
    );
}

#[test]
fn wait_mount_not_required_for_plain_compare() {
    let t = setup(&[File("f.txt", "f\n")], &[File("f.txt", "f\n")]);
    cmd().args([&t.a_str(), &t.b_str()]).assert().success();
}
