mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

use common::Workspace;

#[test]
fn version_flag_prints_version() {
    cargo_bin_cmd!("tresor")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_config_file_fails() {
    let dir = assert_fs::TempDir::new().unwrap();

    cargo_bin_cmd!("tresor")
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .args(["ls"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn local_backend_without_root_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = dir.child("tresor.toml");
    config
        .write_str(
            "[tresor]\nbucket = \"vault\"\nkeyring = \"ring.asc\"\nidentity = \"Alice\"\n\n\
             [storage]\nbackend = \"local\"\n",
        )
        .unwrap();

    cargo_bin_cmd!("tresor")
        .arg("--config")
        .arg(config.path())
        .arg("ls")
        .assert()
        .failure()
        .stderr(predicate::str::contains("root"));
}

#[test]
fn unknown_identity_fails() {
    let ws = Workspace::with_key(None, "");
    let path = ws.file("x.txt", "x");
    std::fs::write(
        &ws.config,
        std::fs::read_to_string(&ws.config)
            .unwrap()
            .replace("identity = \"Alice\"", "identity = \"Carol\""),
    )
    .unwrap();

    ws.tresor()
        .args(["put", "k", "-f"])
        .arg(path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No identity matching 'Carol'"));
}

#[test]
fn identity_match_is_case_sensitive() {
    let ws = Workspace::new();
    let path = ws.file("x.txt", "x");
    std::fs::write(
        &ws.config,
        std::fs::read_to_string(&ws.config)
            .unwrap()
            .replace("identity = \"Alice\"", "identity = \"alice <\""),
    )
    .unwrap();

    ws.tresor()
        .args(["put", "k", "-f"])
        .arg(path)
        .assert()
        .failure();
}

#[test]
fn file_mode_without_file_fails() {
    let ws = Workspace::new();

    ws.tresor()
        .args(["put", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn unreadable_keyring_fails() {
    let ws = Workspace::new();
    ws.dir.child("ring.asc").write_str("not a key").unwrap();
    let path = ws.file("x.txt", "x");

    ws.tresor()
        .args(["put", "k", "-f"])
        .arg(path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load key"));
}

#[test]
fn input_mode_from_config() {
    let ws = Workspace::with_key(None, "input = \"stdin\"");

    ws.tresor()
        .args(["put", "k"])
        .write_stdin("from stdin")
        .assert()
        .success();

    ws.tresor().args(["get", "k"]).assert().success().stdout("from stdin");
}
