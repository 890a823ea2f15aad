//! HttpProbe against a one-shot local HTTP server.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use speedup_admin::application::toggle_feature::VerificationProbe;
use speedup_admin::infrastructure::network::probe::HttpProbe;

/// Serves exactly one request with `status_line` and `headers`, and hands the
/// received request head back through the returned channel.
fn serve_once(
    status_line: &'static str,
    headers: &'static [&'static str],
) -> (String, mpsc::Receiver<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}/", listener.local_addr().expect("addr"));
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut head = Vec::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            head.push(line);
        }

        let mut response = format!("{status_line}\r\n");
        for header in headers {
            response.push_str(header);
            response.push_str("\r\n");
        }
        response.push_str("Content-Length: 0\r\nConnection: close\r\n\r\n");
        let mut stream = stream;
        let _ = stream.write_all(response.as_bytes());
        let _ = tx.send(head);
    });

    (url, rx)
}

fn probe(url: String) -> HttpProbe {
    HttpProbe::new(url, Duration::from_secs(5))
}

#[test]
fn test_gzip_response_is_working_and_request_asks_for_gzip() {
    // Arrange
    let (url, head) = serve_once("HTTP/1.1 200 OK", &["Content-Encoding: gzip"]);

    // Act
    let working = probe(url).compression_active();

    // Assert
    assert!(working);
    let head = head.recv_timeout(Duration::from_secs(5)).expect("request head");
    assert!(head[0].starts_with("GET / "));
    assert!(head
        .iter()
        .any(|h| h.to_ascii_lowercase() == "accept-encoding: gzip"));
}

#[test]
fn test_uppercase_encoding_counts() {
    let (url, _head) = serve_once("HTTP/1.1 200 OK", &["Content-Encoding: GZIP"]);
    assert!(probe(url).compression_active());
}

#[test]
fn test_uncompressed_response_is_not_working() {
    let (url, _head) = serve_once("HTTP/1.1 200 OK", &["Content-Type: text/html"]);
    assert!(!probe(url).compression_active());
}

#[test]
fn test_error_status_is_still_inspected() {
    let (url, _head) = serve_once("HTTP/1.1 404 Not Found", &["Content-Encoding: gzip"]);
    assert!(probe(url).compression_active());
}
