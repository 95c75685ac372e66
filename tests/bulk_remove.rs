use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::fs::symlink;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write_editor_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

const BUMP_MTIME: &str = r#"touch -d "@$(( $(date +%s) + 2 ))" "$1""#;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("clifm-bulk"))
}

#[test]
fn s4_remove_subset() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("x")).unwrap();
    fs::write(dir.path().join("y"), b"Y").unwrap();
    symlink(dir.path().join("x"), dir.path().join("z")).unwrap();

    let editor = dir.path().join("fake-editor.sh");
    // Delete the line for `y` (suffix-less), keep `x/` and `z@` (symlink to
    // a directory still reports as a symlink suffix, never a dir suffix).
    write_editor_script(
        &editor,
        &format!(
            "f=\"$1\"\n\
             grep '^#' \"$f\" > \"$f.new\"\n\
             grep -v '^#' \"$f\" | grep -v '^$' | grep -v '^y$' >> \"$f.new\"\n\
             mv \"$f.new\" \"$f\"\n\
             {BUMP_MTIME}"
        ),
    );

    bin()
        .current_dir(dir.path())
        .env("EDITOR", editor.to_str().unwrap())
        .env("CLIFM_TMPDIR", dir.path())
        .arg("--remove")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) removed"));

    assert!(dir.path().join("x").exists());
    assert!(!dir.path().join("y").exists());
    assert!(dir.path().join("z").exists());
}

#[test]
fn s5_remove_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("y"), b"Y").unwrap();
    fs::create_dir(dir.path().join("x")).unwrap();

    bin()
        .current_dir(dir.path())
        .env("EDITOR", "true")
        .arg("--remove")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do"));

    assert!(dir.path().join("x").exists());
    assert!(dir.path().join("y").exists());
}

#[test]
fn remove_explicit_target_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("victims");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep"), b"K").unwrap();
    fs::write(target.join("drop"), b"D").unwrap();

    let editor = dir.path().join("fake-editor.sh");
    write_editor_script(
        &editor,
        &format!(
            "f=\"$1\"\n\
             grep '^#' \"$f\" > \"$f.new\"\n\
             grep -v '^#' \"$f\" | grep -v '^$' | grep -v '^drop$' >> \"$f.new\"\n\
             mv \"$f.new\" \"$f\"\n\
             {BUMP_MTIME}"
        ),
    );

    bin()
        .current_dir(dir.path())
        .env("EDITOR", editor.to_str().unwrap())
        .env("CLIFM_TMPDIR", dir.path())
        .arg("--remove")
        .arg(target.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) removed"));

    assert!(target.join("keep").exists());
    assert!(!target.join("drop").exists());
}
