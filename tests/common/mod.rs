//! Minimal HTTP/1.1 server serving one canned response, for exercising the
//! reel backend client without a network.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub reason: &'static str,
    pub content_type: &'static str,
    /// Extra headers, e.g. Content-Disposition.
    pub extra_headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Content-Length to advertise when it should differ from the body
    /// actually sent (simulates a connection cut mid-transfer).
    pub advertised_length: Option<usize>,
}

impl CannedResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "application/json",
            extra_headers: Vec::new(),
            body: body.as_bytes().to_vec(),
            advertised_length: None,
        }
    }

    pub fn video(body: &[u8]) -> Self {
        Self {
            status: 200,
            reason: "OK",
            content_type: "video/mp4",
            extra_headers: Vec::new(),
            body: body.to_vec(),
            advertised_length: None,
        }
    }

    pub fn with_status(mut self, status: u16, reason: &'static str) -> Self {
        self.status = status;
        self.reason = reason;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_advertised_length(mut self, length: usize) -> Self {
        self.advertised_length = Some(length);
        self
    }
}

/// What the server saw in a request, so tests can assert the wire contract.
#[derive(Debug)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Starts a server in a background thread answering every request with
/// `response`. Returns the base URL and a channel of received requests.
/// The server runs until the process exits.
pub fn start(response: CannedResponse) -> (String, mpsc::Receiver<ReceivedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let response = Arc::new(response);
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let response = Arc::clone(&response);
            let tx = tx.clone();
            thread::spawn(move || handle(stream, &response, &tx));
        }
    });

    (format!("http://127.0.0.1:{port}"), rx)
}

fn handle(
    mut stream: std::net::TcpStream,
    response: &CannedResponse,
    tx: &mpsc::Sender<ReceivedRequest>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));

    let mut raw = Vec::new();
    let mut buf = [0u8; 8192];

    // Read headers, then the Content-Length body.
    let header_end = loop {
        match stream.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
            Err(_) => return,
        }
        if let Some(pos) = find_header_end(&raw) {
            break pos;
        }
        if raw.len() > 64 * 1024 {
            return;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    let body_start = header_end + 4;
    while raw.len() < body_start + content_length {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
            Err(_) => return,
        }
    }

    let mut request_line = head.lines().next().unwrap_or("").split_whitespace();
    let method = request_line.next().unwrap_or("").to_string();
    let path = request_line.next().unwrap_or("").to_string();
    let body =
        String::from_utf8_lossy(&raw[body_start..(body_start + content_length).min(raw.len())])
            .into_owned();

    let _ = tx.send(ReceivedRequest { method, path, body });

    let mut head_out = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.reason,
        response.content_type,
        response.advertised_length.unwrap_or(response.body.len())
    );
    for (name, value) in &response.extra_headers {
        head_out.push_str(&format!("{name}: {value}\r\n"));
    }
    head_out.push_str("\r\n");

    let _ = stream.write_all(head_out.as_bytes());
    let _ = stream.write_all(&response.body);
    let _ = stream.flush();
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}
