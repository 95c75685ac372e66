use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Writes an executable shell script at `path` acting as `$EDITOR`.
fn write_editor_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

/// Pushes the document's mtime two seconds into the future so the Differ's
/// 1-second-resolution "unchanged" check can't spuriously fire inside a
/// fast test run.
const BUMP_MTIME: &str = r#"touch -d "@$(( $(date +%s) + 2 ))" "$1""#;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("clifm-bulk"))
}

#[test]
fn s1_rename_no_op() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"A").unwrap();
    fs::write(dir.path().join("b"), b"B").unwrap();

    bin()
        .current_dir(dir.path())
        .env("EDITOR", "true")
        .args(["a", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to do"));

    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
    assert_eq!(fs::read(dir.path().join("a")).unwrap(), b"A");
    assert_eq!(fs::read(dir.path().join("b")).unwrap(), b"B");
}

#[test]
fn s2_rename_swap() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"A-content").unwrap();
    fs::write(dir.path().join("b"), b"B-content").unwrap();

    let editor = dir.path().join("fake-editor.sh");
    write_editor_script(
        &editor,
        &format!(
            "f=\"$1\"\n\
             grep '^#' \"$f\" > \"$f.new\"\n\
             grep -v '^#' \"$f\" | grep -v '^$' | sort -r >> \"$f.new\"\n\
             mv \"$f.new\" \"$f\"\n\
             {BUMP_MTIME}"
        ),
    );

    bin()
        .current_dir(dir.path())
        .env("EDITOR", editor.to_str().unwrap())
        .env("CLIFM_TMPDIR", dir.path())
        .args(["a", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 file(s) renamed"));

    assert_eq!(fs::read(dir.path().join("b")).unwrap(), b"A-content");
    assert_eq!(fs::read(dir.path().join("a")).unwrap(), b"B-content");
}

#[test]
fn s3_line_mismatch() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"A").unwrap();
    fs::write(dir.path().join("b"), b"B").unwrap();

    let editor = dir.path().join("fake-editor.sh");
    write_editor_script(
        &editor,
        &format!(
            "f=\"$1\"\n\
             grep '^#' \"$f\" > \"$f.new\"\n\
             echo a >> \"$f.new\"\n\
             mv \"$f.new\" \"$f\"\n\
             {BUMP_MTIME}"
        ),
    );

    bin()
        .current_dir(dir.path())
        .env("EDITOR", editor.to_str().unwrap())
        .env("CLIFM_TMPDIR", dir.path())
        .args(["a", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line mismatch"));

    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}

#[test]
fn help_flag_prints_usage_without_touching_files() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}
