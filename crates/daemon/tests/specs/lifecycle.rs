//! Daemon lifecycle specs
//!
//! Logging, the single-instance lock, and actuator output.

use crate::prelude::*;
use std::process::Stdio;
use std::time::{Duration, Instant};

fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    false
}

#[test]
fn logs_go_to_configured_file() {
    let setup = Setup::table("");
    let log_path = setup.path("logs/gated.log");
    let config = std::fs::read_to_string(setup.config_path()).unwrap();
    std::fs::write(
        setup.config_path(),
        format!("[daemon]\nlog_path = {:?}\n{}", log_path, config),
    )
    .unwrap();

    let output = setup
        .gated()
        .write_stdin(detection("ABC1234", 0.95))
        .assert()
        .success()
        .get_output()
        .clone();

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("Daemon started"), "log: {}", log);
    assert!(log.contains("detection processed"), "log: {}", log);
    assert!(output.stderr.is_empty());
    assert_eq!(records(&output.stdout).len(), 1);
}

#[test]
fn logs_go_to_stderr_by_default() {
    let setup = Setup::table("");
    let output = setup.gated().write_stdin("").assert().success().get_output().clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Daemon stopped"), "stderr: {}", stderr);
}

#[test]
fn second_instance_is_refused_while_lock_held() {
    let setup = Setup::table("");
    let lock_path = setup.path("gated.lock");
    let config = std::fs::read_to_string(setup.config_path()).unwrap();
    std::fs::write(
        setup.config_path(),
        format!("[daemon]\nlock_path = {:?}\n{}", lock_path, config),
    )
    .unwrap();

    // First instance keeps running while its stdin stays open
    let mut first = std::process::Command::new(env!("CARGO_BIN_EXE_gated"))
        .arg("--config")
        .arg(setup.config_path())
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    assert!(wait_for(|| std::fs::read_to_string(&lock_path)
        .map(|pid| pid.trim() == first.id().to_string())
        .unwrap_or(false)));

    let output = setup.gated().write_stdin("").assert().failure().get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already running"), "stderr: {}", stderr);

    // Closing stdin shuts the first instance down and removes the lock
    drop(first.stdin.take());
    assert!(first.wait().unwrap().success());
    assert!(!lock_path.exists());
}

#[test]
fn serial_actuator_receives_open_and_close() {
    let setup = Setup::raw("");
    let device = setup.path("ttyGATE");
    std::fs::write(&device, "").unwrap();
    std::fs::write(
        setup.config_path(),
        format!(
            r#"
[authorization]
kind = "table"

[[authorization.plates]]
plate = "ABC1234"
status = "authorized"

[actuator]
kind = "serial"
device = {:?}
open_command = "ABRIR"
close_command = "FECHAR"
settle = "50ms"
"#,
            device
        ),
    )
    .unwrap();

    let records = setup.run(&detection("ABC1234", 0.95));

    assert_eq!(summaries(&records), vec!["ABC1234 AUTHORIZED OPEN"]);
    // Shutdown always closes the gate
    assert_eq!(std::fs::read_to_string(&device).unwrap(), "ABRIR\nFECHAR\n");
}
