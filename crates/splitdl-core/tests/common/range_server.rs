//! Minimal HTTP/1.1 server with HEAD and Range GET support for integration tests.
//!
//! Serves one static body at every path. Range ends past the last byte are
//! clamped, as real servers do. [`start_ignoring_ranges`] starts a server
//! that advertises ranges on HEAD but answers every GET with the full body.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Starts a server in a background thread serving `body` and returns
/// `http://127.0.0.1:<port>/<name>`. The server runs until the process exits.
pub fn start(body: Vec<u8>, name: &str) -> String {
    serve(body, name, true)
}

/// Like [`start`], but GET ignores `Range` and replies `200 OK` with all of `body`.
pub fn start_ignoring_ranges(body: Vec<u8>, name: &str) -> String {
    serve(body, name, false)
}

fn serve(body: Vec<u8>, name: &str, honor_ranges: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, &body, honor_ranges));
        }
    });
    format!("http://127.0.0.1:{}/{}", port, name)
}

fn handle(mut stream: TcpStream, body: &[u8], honor_ranges: bool) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let (method, range) = parse_request(request);
    let range = range.filter(|_| honor_ranges);
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let (status, slice) = match range {
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl {
                ("416 Range Not Satisfiable", &body[0..0])
            } else {
                ("206 Partial Content", &body[start as usize..=end_incl as usize])
            }
        }
        None => ("200 OK", body),
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n",
        status,
        slice.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

/// Returns (method, optional (start, end_inclusive) for `Range: bytes=X-Y`).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("");
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        if let Some(bounds) = value.trim().strip_prefix("bytes=") {
            if let Some((a, b)) = bounds.split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                range = Some((start, end));
            }
        }
    }
    (method, range)
}
