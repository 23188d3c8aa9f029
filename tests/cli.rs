use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn prints_version() {
    Command::cargo_bin("eblog")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn prints_help() {
    Command::cargo_bin("eblog")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--evil"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn missing_posts_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("eblog")
        .unwrap()
        .arg(dir.path().join("nowhere"))
        .arg("--config")
        .arg(dir.path().join("absent.yaml"))
        .arg("--log")
        .arg(dir.path().join("eblog.log"))
        .env("EBLOG_LOG__LEVEL", "off")
        .assert()
        .failure()
        .stderr(predicate::str::contains("load posts"));
}
