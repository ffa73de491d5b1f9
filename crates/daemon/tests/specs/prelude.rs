//! Shared helpers for daemon specs

use assert_cmd::Command;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Plate table shared by most specs
pub const TABLE: &str = r#"
[authorization]
kind = "table"

[[authorization.plates]]
plate = "ABC1234"
status = "authorized"
vehicle = { model = "Sedan", colour = "blue" }

[[authorization.plates]]
plate = "DEF5678"
status = "authorized"

[[authorization.plates]]
plate = "OLD0001"
status = "inactive"

[actuator]
kind = "none"
"#;

/// A temporary directory holding one daemon config
pub struct Setup {
    dir: TempDir,
    config: PathBuf,
}

impl Setup {
    /// Config made of the plate table plus `extra`
    pub fn table(extra: &str) -> Self {
        Self::raw(&format!("{}\n{}", extra, TABLE))
    }

    /// Config file with exactly `content`
    pub fn raw(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("gated.toml");
        std::fs::write(&config, content).unwrap();
        Self { dir, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }

    pub fn gated(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gated"));
        cmd.arg("--config")
            .arg(&self.config)
            .env("RUST_LOG", "info")
            .timeout(Duration::from_secs(30));
        cmd
    }

    /// Run to completion with `stdin` and return the decision records
    pub fn run(&self, stdin: &str) -> Vec<Value> {
        let output = self.gated().write_stdin(stdin).assert().success();
        records(&output.get_output().stdout)
    }
}

/// Parse NDJSON decision output
pub fn records(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// `plate decision gate_action` summaries, sorted, ignoring correlation ids
pub fn summaries(records: &[Value]) -> Vec<String> {
    let mut lines: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "{} {} {}",
                r["plate"].as_str().unwrap(),
                r["decision"].as_str().unwrap(),
                r["gate_action"].as_str().unwrap()
            )
        })
        .collect();
    lines.sort();
    lines
}

pub fn detection(plate: &str, confidence: f64) -> String {
    format!(
        "{{\"plate\": \"{}\", \"confidence\": {}}}\n",
        plate, confidence
    )
}
