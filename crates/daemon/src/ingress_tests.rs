// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_and_normalizes_a_detection() {
    let event = parse_line(r#"{"plate": " abc1234 ", "confidence": 0.93}"#)
        .unwrap()
        .unwrap();

    assert_eq!(event.plate.as_str(), "ABC1234");
    assert_eq!(event.confidence, 0.93);
}

#[test]
fn blank_line_is_ignored() {
    assert!(parse_line("   ").unwrap().is_none());
}

#[test]
fn rejects_bad_json() {
    assert!(matches!(parse_line("{plate"), Err(IngressError::Json(_))));
}

#[test]
fn rejects_invalid_plate() {
    let err = parse_line(r#"{"plate": "AB-12", "confidence": 0.9}"#).unwrap_err();
    assert!(matches!(err, IngressError::Detection(DetectionError::Plate(_))));
}

#[test]
fn rejects_out_of_range_confidence() {
    let err = parse_line(r#"{"plate": "ABC1234", "confidence": 1.5}"#).unwrap_err();
    assert!(matches!(
        err,
        IngressError::Detection(DetectionError::Confidence(_))
    ));
}

#[tokio::test]
async fn reader_forwards_valid_lines_and_closes_channel() {
    let input: &'static [u8] = b"{\"plate\": \"ABC1234\", \"confidence\": 0.9}\n\
        not json\n\
        \n\
        {\"plate\": \"DEF5678\", \"confidence\": 0.8, \"observed_at\": \"2026-03-01T12:00:00Z\"}\n";
    let (tx, mut rx) = mpsc::channel(8);

    let stats = spawn_reader(input, tx).await.unwrap();

    assert_eq!(
        stats,
        IngressStats {
            forwarded: 2,
            malformed: 1,
            dropped: 0
        }
    );
    assert_eq!(rx.recv().await.unwrap().plate.as_str(), "ABC1234");
    let second = rx.recv().await.unwrap();
    assert_eq!(second.plate.as_str(), "DEF5678");
    assert_eq!(second.observed_at.to_rfc3339(), "2026-03-01T12:00:00+00:00");
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn reader_drops_when_intake_is_full() {
    let input: &'static [u8] = b"{\"plate\": \"ABC1234\", \"confidence\": 0.9}\n\
        {\"plate\": \"DEF5678\", \"confidence\": 0.9}\n\
        {\"plate\": \"GHI9012\", \"confidence\": 0.9}\n";
    let (tx, mut rx) = mpsc::channel(1);

    let stats = spawn_reader(input, tx).await.unwrap();

    assert_eq!(stats.forwarded, 1);
    assert_eq!(stats.dropped, 2);
    assert_eq!(rx.recv().await.unwrap().plate.as_str(), "ABC1234");
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn reader_stops_when_intake_closes() {
    let input: &'static [u8] = b"{\"plate\": \"ABC1234\", \"confidence\": 0.9}\n\
        {\"plate\": \"DEF5678\", \"confidence\": 0.9}\n";
    let (tx, rx) = mpsc::channel(8);
    drop(rx);

    let stats = spawn_reader(input, tx).await.unwrap();

    assert_eq!(stats.forwarded, 0);
}
