use std::fs;
use std::os::unix::fs::PermissionsExt;

use predicates::prelude::*;

use super::harness::{frozen_time, setup, Dir, File, Sym};
use super::{cmd, some_line_has, stdout_of};

#[test]
fn mode_differs() {
    let t = setup(&[File("doc.txt", "x\n")], &[File("doc.txt", "x\n")]);
    fs::set_permissions(t.a.join("doc.txt"), fs::Permissions::from_mode(0o644)).unwrap();
    fs::set_permissions(t.b.join("doc.txt"), fs::Permissions::from_mode(0o600)).unwrap();

    let assert = cmd().args([&t.a_str(), &t.b_str()]).assert().code(1);
    let output = stdout_of(&assert);

    assert!(
        some_line_has(&output, "METADATA [mode]:", "doc.txt"),
        "Expected METADATA [mode] for doc.txt, got:\n{}",
        output
    );
    // Both records are printed for diagnosis
    assert!(output.contains("left:"), "got:\n{}", output);
    assert!(output.contains("right:"), "got:\n{}", output);
}

#[test]
fn mtime_differs_by_whole_seconds() {
    let t = setup(&[File("doc.txt", "x\n")], &[File("doc.txt", "x\n")]);
    let later = filetime::FileTime::from_unix_time(frozen_time().unix_seconds() + 2, 0);
    filetime::set_file_times(t.b.join("doc.txt"), later, later).unwrap();

    let assert = cmd().args([&t.a_str(), &t.b_str()]).assert().code(1);
    let output = stdout_of(&assert);

    assert!(
        some_line_has(&output, "METADATA", "mtime"),
        "Expected METADATA naming mtime, got:\n{}",
        output
    );
    assert!(some_line_has(&output, "METADATA", "doc.txt"));
}

#[test]
fn symlink_target_differs() {
    let t = setup(
        &[File("x", "x\n"), File("y", "x\n"), Sym("link", "x")],
        &[File("x", "x\n"), File("y", "x\n"), Sym("link", "y")],
    );
    cmd()
        .args([&t.a_str(), &t.b_str()])
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("DIFFERENT-FILE [TARGET]:")
                .and(predicate::str::contains("link")),
        );
}

#[test]
fn virtualized_accepts_identical_trees() {
    let t = setup(
        &[Dir("sub"), Dir("sub/deep"), File("sub/f.txt", "f\n")],
        &[Dir("sub"), Dir("sub/deep"), File("sub/f.txt", "f\n")],
    );
    cmd()
        .args([&t.a_str(), &t.b_str(), "--virtualized"])
        .assert()
        .success()
        .stdout(predicate::str::contains("METADATA").not());
}

#[test]
fn xattr_value_differs() {
    let t = setup(&[File("doc.txt", "x\n")], &[File("doc.txt", "x\n")]);

    // Not every filesystem supports user xattrs; skip when setting fails.
    if xattr::set(t.a.join("doc.txt"), "user.treesame.test", b"one").is_err() {
        eprintln!("skipping: filesystem does not support user xattrs");
        return;
    }
    xattr::set(t.b.join("doc.txt"), "user.treesame.test", b"two").unwrap();

    let assert = cmd().args([&t.a_str(), &t.b_str()]).assert().code(1);
    let output = stdout_of(&assert);

    assert!(
        some_line_has(&output, "METADATA [xattrs]:", "doc.txt"),
        "Expected METADATA [xattrs] for doc.txt, got:\n{}",
        output
    );
}

#[test]
fn xattr_present_on_one_side_only() {
    let t = setup(&[File("doc.txt", "x\n")], &[File("doc.txt", "x\n")]);

    if xattr::set(t.a.join("doc.txt"), "user.treesame.test", b"one").is_err() {
        eprintln!("skipping: filesystem does not support user xattrs");
        return;
    }

    let assert = cmd().args([&t.a_str(), &t.b_str()]).assert().code(1);
    let output = stdout_of(&assert);

    assert!(
        some_line_has(&output, "METADATA [xattrs]:", "doc.txt"),
        "Expected METADATA [xattrs] for doc.txt, got:\n{}",
        output
    );
}
