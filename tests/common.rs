#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::PathBuf;
use tempfile::TempDir;

/// An isolated home directory with its own local and remote databases.
pub struct Env {
    pub home: TempDir,
    pub db: String,
    pub remote: String,
}

impl Env {
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("tempdir");
        let db = home.path().join("local.sqlite").to_string_lossy().to_string();
        let remote = home.path().join("remote.sqlite").to_string_lossy().to_string();
        Self { home, db, remote }
    }

    /// `tito` with HOME and both database paths pointed at this env.
    pub fn tito(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("tito");
        cmd.env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .args(["--db", &self.db, "--remote", &self.remote]);
        cmd
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.home.path().join(name)
    }
}

/// Initialize the databases and add two September shifts.
pub fn init_with_data() -> Env {
    let env = Env::new();
    env.tito().args(["--test", "init"]).assert().success();

    for date in ["2025-09-01", "2025-09-15"] {
        env.tito()
            .args(["add", date, "--in", "09:00", "--out", "17:00", "--break", "30"])
            .assert()
            .success();
    }
    env
}

/// First shift id printed by `list --period all`.
pub fn first_shift_id(env: &Env) -> String {
    let out = env
        .tito()
        .args(["list", "--period", "all"])
        .output()
        .expect("run list");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    stdout
        .split_whitespace()
        .find(|w| w.starts_with("shift-"))
        .expect("a shift id in the listing")
        .to_string()
}
