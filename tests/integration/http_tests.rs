//! Host HTTP transport against a local one-shot server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::mock_hw::entities_body;

use doormode::adapters::http::UreqTransport;
use doormode::app::ports::HttpTransport;
use doormode::classifier::ClassificationClient;
use doormode::config::ClassificationConfig;
use doormode::error::ClassificationError;

/// Serve one canned response; the handle yields the raw request.
fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap();
            }
            request.push_str(&line);
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut payload = vec![0u8; content_length];
        reader.read_exact(&mut payload).unwrap();
        request.push_str(&String::from_utf8_lossy(&payload));

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();
        request
    });
    (format!("http://{addr}/v1/images:annotate"), handle)
}

#[test]
fn ok_response_body_is_returned() {
    let (url, server) = serve_once("200 OK", r#"{"responses":[]}"#.into());
    let transport = UreqTransport::new(Duration::from_secs(5));

    let resp = transport.post_json(&url, br#"{"requests":[]}"#).unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, br#"{"responses":[]}"#);

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /v1/images:annotate"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(request.ends_with(r#"{"requests":[]}"#));
}

#[test]
fn error_status_is_not_a_transport_failure() {
    let (url, server) = serve_once("403 Forbidden", r#"{"error":{"code":403}}"#.into());
    let transport = UreqTransport::new(Duration::from_secs(5));

    let resp = transport.post_json(&url, b"{}").unwrap();
    assert_eq!(resp.status, 403);
    assert!(!resp.body.is_empty());
    server.join().unwrap();
}

#[test]
fn refused_connection_is_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let transport = UreqTransport::new(Duration::from_secs(2));

    let err = transport
        .post_json(&format!("http://127.0.0.1:{port}/"), b"{}")
        .unwrap_err();
    assert!(matches!(err, ClassificationError::Transport(_)));
}

#[test]
fn client_sends_key_and_web_detection_request() {
    let (url, server) = serve_once("200 OK", entities_body(&[("Door", 0.4), ("Anger", 0.71)]));
    let cfg = ClassificationConfig {
        endpoint: url,
        api_key: "secret".into(),
        ..ClassificationConfig::default()
    };
    let client = ClassificationClient::new(UreqTransport::new(Duration::from_secs(5)), &cfg);

    let verdicts = client.classify("https://example.com/a.jpg").unwrap();
    assert_eq!(verdicts.len(), 2);
    assert_eq!(verdicts[1].label, "Anger");

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /v1/images:annotate?key=secret"));
    assert!(request.contains("WEB_DETECTION"));
    assert!(request.contains("https://example.com/a.jpg"));
}
