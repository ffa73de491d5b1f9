//! Decision output specs
//!
//! Feed detections on stdin and check the NDJSON records on stdout.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn empty_input_exits_cleanly_without_records() {
    let setup = Setup::table("");
    assert!(setup.run("").is_empty());
}

#[test]
fn authorized_plate_opens_gate() {
    let setup = Setup::table("");
    let records = setup.run(&detection("ABC1234", 0.95));

    assert_eq!(summaries(&records), vec!["ABC1234 AUTHORIZED OPEN"]);
    let record = &records[0];
    assert_eq!(record["status"], "AUTHORIZED");
    assert_eq!(record["confidence"], 0.95);
    assert!(record["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[test]
fn mixed_stream_is_filtered_and_decided() {
    let setup = Setup::table("");
    let input = [
        detection("ABC1234", 0.95),
        // Same plate again, normalized, inside the cooldown window
        detection("abc1234", 0.97),
        detection("XYZ9876", 0.30),
        detection("NOPE000", 0.90),
        detection("OLD0001", 0.90),
        "this is not json\n".to_string(),
        detection("BAD", 0.90),
        "\n".to_string(),
    ]
    .concat();

    let records = setup.run(&input);

    assert_eq!(
        summaries(&records),
        vec![
            "ABC1234 AUTHORIZED OPEN",
            "ABC1234 SKIPPED_COOLDOWN NONE",
            "NOPE000 DENIED NONE",
            "OLD0001 DENIED NONE",
            "XYZ9876 SKIPPED_LOW_CONFIDENCE NONE",
        ]
    );

    let skipped: Vec<_> = records
        .iter()
        .filter(|r| r["decision"].as_str().unwrap().starts_with("SKIPPED"))
        .collect();
    assert!(skipped.iter().all(|r| r.get("id").is_none()));
    assert!(skipped.iter().all(|r| r.get("status").is_none()));

    let not_found = records.iter().find(|r| r["plate"] == "NOPE000").unwrap();
    assert_eq!(not_found["status"], "NOT_FOUND");
}

#[test]
fn second_authorized_plate_extends_window() {
    let setup = Setup::table("");
    let input = [detection("ABC1234", 0.95), detection("DEF5678", 0.95)].concat();

    let records = setup.run(&input);

    let mut actions: Vec<&str> = records
        .iter()
        .map(|r| r["gate_action"].as_str().unwrap())
        .collect();
    actions.sort();
    assert_eq!(actions, vec!["EXTEND", "OPEN"]);
}

#[test]
fn threshold_comes_from_config() {
    let setup = Setup::table("[orchestrator]\nconfidence_threshold = 0.2\n");
    let records = setup.run(&detection("ABC1234", 0.3));

    assert_eq!(summaries(&records), vec!["ABC1234 AUTHORIZED OPEN"]);
}

#[test]
fn unreachable_authorization_service_denies() {
    let setup = Setup::raw(
        r#"
[orchestrator]
lookup_timeout = "2s"
shutdown_grace = "5s"

[authorization]
kind = "http"
url = "http://127.0.0.1:1/validate"

[actuator]
kind = "none"
"#,
    );

    let records = setup.run(&detection("ABC1234", 0.95));

    assert_eq!(summaries(&records), vec!["ABC1234 LOOKUP_ERROR NONE"]);
    assert_eq!(records[0]["status"], "LOOKUP_ERROR");
}
