//! Usage-error paths of the `ksymirror` binary. All of these fail before any
//! network access, so they run offline.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn ksymirror_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ksymirror"))
}

fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("format-db.json");
    fs::write(&path, r#"{"zip": "archive", "dos_datetime": "common"}"#).expect("write catalog");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(ksymirror_bin())
        .args(args)
        // Unroutable on purpose: these cases must fail before any request.
        .args(["--base-url", "http://127.0.0.1:9/"])
        .output()
        .expect("run ksymirror")
}

#[test]
fn unknown_format_is_rejected_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = write_catalog(dir.path());
    let out = dir.path().join("out");

    let output = run(&[
        "nope",
        out.to_str().unwrap(),
        "--catalog",
        catalog.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown KSY specification passed: nope"),
        "stderr: {stderr}"
    );
    assert!(!out.exists());
}

#[test]
fn mismatched_category_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = write_catalog(dir.path());

    let output = run(&[
        "image/zip",
        dir.path().to_str().unwrap(),
        "--catalog",
        catalog.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown KSY category: image"), "stderr: {stderr}");
}

#[test]
fn missing_catalog_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = run(&[
        "zip",
        dir.path().to_str().unwrap(),
        "--catalog",
        dir.path().join("absent.json").to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Catalog error"));
}

#[test]
fn bundled_catalog_is_used_outside_the_repo() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out");

    let output = Command::new(ksymirror_bin())
        .current_dir(dir.path())
        .args(["nope", out.to_str().unwrap()])
        .args(["--base-url", "http://127.0.0.1:9/"])
        .output()
        .expect("run ksymirror");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown KSY specification passed: nope"),
        "stderr: {stderr}"
    );
    assert!(!stderr.contains("Catalog error"), "stderr: {stderr}");
    assert!(!out.exists());
}

#[test]
fn query_is_required() {
    let output = Command::new(ksymirror_bin())
        .output()
        .expect("run ksymirror");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}
