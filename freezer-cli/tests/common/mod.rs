//! Shared fixtures for CLI tests: every context runs against its own
//! temporary home directory.

#![allow(dead_code)]

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestContext {
    pub home: TempDir,
}

impl TestContext {
    /// A `freezer` command bound to this context's home and owner.
    pub fn new_cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("freezer"));
        cmd.env("FREEZER_HOME", self.home.path())
            .env("FREEZER_OWNER", "tester")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run `args` and return trimmed stdout, failing the test on error.
    pub fn run(&self, args: &[&str]) -> String {
        let output = self.new_cmd().args(args).output().expect("spawn freezer");
        assert!(
            output.status.success(),
            "freezer {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout)
            .expect("utf-8 stdout")
            .trim()
            .to_string()
    }

    /// Run `args` with `--format json` appended and parse stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let mut args = args.to_vec();
        args.extend(["--format", "json"]);
        serde_json::from_str(&self.run(&args)).expect("valid JSON output")
    }

    pub fn create_box(&self, name: &str) -> String {
        self.run(&["box", "create", name])
    }

    pub fn add_sample(&self, target: &str, position: u32, number: &str, name: &str) -> String {
        self.run(&[
            "sample",
            "add",
            target,
            &position.to_string(),
            "--number",
            number,
            "--name",
            name,
        ])
    }
}

pub fn freezer() -> TestContext {
    TestContext {
        home: TempDir::new().expect("create temp home"),
    }
}
