#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use sequoia_openpgp::cert::prelude::*;
use sequoia_openpgp::crypto::Password;
use sequoia_openpgp::serialize::SerializeInto;

/// A scratch home for one test: key ring, config and a local bucket.
pub struct Workspace {
    pub dir: TempDir,
    pub config: PathBuf,
}

impl Workspace {
    /// Unlocked key for "Alice <alice@example.com>", local backend, retain policy.
    pub fn new() -> Self {
        Self::with_key(None, "")
    }

    /// Same, with the key locked behind `passphrase`.
    pub fn locked(passphrase: &str) -> Self {
        Self::with_key(Some(passphrase), "")
    }

    /// Extra TOML lines are appended to the `[tresor]` section.
    pub fn with_key(passphrase: Option<&str>, extra: &str) -> Self {
        let dir = TempDir::new().unwrap();

        let mut builder = CertBuilder::general_purpose(Some("Alice <alice@example.com>"));
        if let Some(passphrase) = passphrase {
            builder = builder.set_password(Some(Password::from(passphrase)));
        }
        let (cert, _) = builder.generate().unwrap();
        let armored = cert.as_tsk().armored().to_vec().unwrap();
        dir.child("ring.asc").write_binary(&armored).unwrap();

        let config = dir.child("tresor.toml");
        config
            .write_str(&format!(
                "[tresor]\n\
                 bucket = \"vault\"\n\
                 keyring = \"{ring}\"\n\
                 identity = \"Alice\"\n\
                 {extra}\n\
                 \n\
                 [storage]\n\
                 backend = \"local\"\n\
                 root = \"{root}\"\n",
                ring = toml_path(dir.path().join("ring.asc")),
                root = toml_path(dir.path().join("store")),
            ))
            .unwrap();

        Self {
            config: config.path().to_path_buf(),
            dir,
        }
    }

    /// `tresor --config <workspace config>` with a clean passphrase environment.
    pub fn tresor(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("tresor");
        cmd.current_dir(self.dir.path())
            .env_remove("TRESOR_PASSPHRASE")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    /// Write a plaintext file into the workspace and return its path.
    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let child = self.dir.child(name);
        child.write_str(contents).unwrap();
        child.path().to_path_buf()
    }

    pub fn put(&self, key: &str, contents: &str) {
        let path = self.file("payload.txt", contents);
        self.tresor()
            .args(["put", key, "-f"])
            .arg(path)
            .assert()
            .success();
    }

    /// Point the config's key ring at `ring` instead of the workspace's own.
    pub fn use_keyring(&self, ring: &Path) {
        let config = std::fs::read_to_string(&self.config).unwrap();
        let own = toml_path(self.dir.path().join("ring.asc"));
        std::fs::write(&self.config, config.replace(&own, &toml_path(ring.to_path_buf()))).unwrap();
    }

    /// Generations of `key` as `ls --versions` prints them, newest first.
    pub fn generations(&self, key: &str) -> Vec<String> {
        let output = self
            .tresor()
            .args(["ls", key, "--versions"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout)
            .unwrap()
            .lines()
            .filter_map(|line| {
                let columns: Vec<&str> = line.split_whitespace().collect();
                // date, time, size, generation, name
                (columns.get(4) == Some(&key)).then(|| columns[3].to_string())
            })
            .collect()
    }
}

/// Forward slashes keep Windows paths valid inside TOML basic strings.
fn toml_path(path: PathBuf) -> String {
    path.display().to_string().replace('\\', "/")
}
