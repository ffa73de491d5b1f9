// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

/// Serve exactly one HTTP response, returning the raw request body
fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }

        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();

        String::from_utf8(request_body).unwrap()
    });

    (format!("http://{}", addr), handle)
}

fn plate() -> Plate {
    Plate::parse("ABC1234").unwrap()
}

#[tokio::test]
async fn authorized_response_is_parsed() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"authorized": true, "status": "AUTHORIZED", "vehicle": {"model": "Sedan"}}"#,
    );
    let client =
        HttpAuthorizationClient::new(format!("{}/validate", base), Duration::from_secs(5));

    let result = client.validate(&plate()).await.unwrap();

    assert!(result.authorized);
    assert_eq!(result.status, AuthorizationStatus::Authorized);
    assert_eq!(result.vehicle_info.unwrap()["model"], "Sedan");

    let request: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
    assert_eq!(request["plate"], "ABC1234");
}

#[tokio::test]
async fn not_found_response_is_denied() {
    let (base, _server) = serve_once("200 OK", r#"{"authorized": false, "status": "NOT_FOUND"}"#);
    let client = HttpAuthorizationClient::new(base, Duration::from_secs(5));

    let result = client.validate(&plate()).await.unwrap();

    assert!(!result.authorized);
    assert_eq!(result.status, AuthorizationStatus::NotFound);
    assert!(result.vehicle_info.is_none());
}

#[tokio::test]
async fn contradictory_response_fails_closed() {
    let (base, _server) =
        serve_once("200 OK", r#"{"authorized": true, "status": "NOT_AUTHORIZED"}"#);
    let client = HttpAuthorizationClient::new(base, Duration::from_secs(5));

    let result = client.validate(&plate()).await.unwrap();
    assert!(!result.authorized);
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let (base, _server) = serve_once("500 Internal Server Error", r#"{"detail": "db down"}"#);
    let client = HttpAuthorizationClient::new(base, Duration::from_secs(5));

    let err = client.validate(&plate()).await.unwrap_err();
    assert_eq!(err, AuthError::Status(500));
}

#[tokio::test]
async fn garbage_body_maps_to_bad_response() {
    let (base, _server) = serve_once("200 OK", "not json");
    let client = HttpAuthorizationClient::new(base, Duration::from_secs(5));

    let err = client.validate(&plate()).await.unwrap_err();
    assert!(matches!(err, AuthError::BadResponse(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_service_maps_to_connection_error() {
    // Bind then drop to get a port with nothing listening
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = HttpAuthorizationClient::new(format!("http://{}", addr), Duration::from_secs(2));

    let err = client.validate(&plate()).await.unwrap_err();
    assert!(matches!(err, AuthError::Connection(_)), "got {:?}", err);
}

#[tokio::test]
async fn silent_service_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and hold the connection without answering
    let _server = std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        std::thread::sleep(Duration::from_secs(2));
        drop(stream);
    });
    let client =
        HttpAuthorizationClient::new(format!("http://{}", addr), Duration::from_millis(200));

    let err = client.validate(&plate()).await.unwrap_err();
    assert_eq!(err, AuthError::Timeout(Duration::from_millis(200)));
}

#[tokio::test]
async fn health_without_url_succeeds() {
    let client = HttpAuthorizationClient::new("http://127.0.0.1:1", Duration::from_secs(1));
    assert!(client.health().await.is_ok());
}

#[tokio::test]
async fn health_checks_configured_url() {
    let (base, _server) = serve_once("503 Service Unavailable", "{}");
    let client = HttpAuthorizationClient::new("http://127.0.0.1:1", Duration::from_secs(2))
        .with_health_url(format!("{}/health", base));

    assert_eq!(client.health().await.unwrap_err(), AuthError::Status(503));
}
