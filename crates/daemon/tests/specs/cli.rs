//! Command-line and configuration error specs

use crate::prelude::*;
use assert_cmd::Command;

#[test]
fn config_flag_is_required() {
    Command::new(env!("CARGO_BIN_EXE_gated"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn missing_config_file_fails() {
    let setup = Setup::raw("");
    let output = Command::new(env!("CARGO_BIN_EXE_gated"))
        .arg("--config")
        .arg(setup.path("nope.toml"))
        .assert()
        .failure()
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn actuator_section_is_required() {
    let setup = Setup::raw("[orchestrator]\ncooldown = \"5s\"\n");
    let output = setup.gated().assert().failure().get_output().clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("actuator"), "stderr: {}", stderr);
}

#[test]
fn invalid_threshold_is_rejected() {
    let setup = Setup::table("[orchestrator]\nconfidence_threshold = 1.5\n");
    let output = setup.gated().assert().failure().get_output().clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("confidence_threshold"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn unknown_keys_are_rejected() {
    let setup = Setup::table("[orchestrator]\nconfidence = 0.5\n");
    setup.gated().assert().failure();
}
