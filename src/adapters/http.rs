//! HTTP/1.0 transport adapter.
//!
//! One request per connection, one connection at a time:
//!
//! ```text
//!   accept ──▶ read_request ──▶ parse_request ──▶ router ──▶ encode_response ──▶ close
//! ```
//!
//! Wire format of every response:
//!
//! ```text
//! HTTP/1.0 <code> <reason>\r\n
//! Content-Type: application/json\r\n
//! Access-Control-Allow-Origin: *\r\n
//! Content-Length: <n>\r\n
//! \r\n
//! <json body>
//! ```
//!
//! Any failure while a client is connected goes through
//! [`safety::run_guarded`](crate::safety::run_guarded), so motors are
//! stopped before the error reaches the serve loop.
//!
//! `std::net` is available on both ESP-IDF (lwIP) and the host, so the
//! server is the same code on both targets.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PwmPort};
use crate::app::registry::MotorRegistry;
use crate::app::router::{self, Method, Response, StatusCode};
use crate::config::SystemConfig;
use crate::error::TransportError;
use crate::safety;

const HEADER_END: &[u8] = b"\r\n\r\n";
const READ_CHUNK: usize = 512;

// ───────────────────────────────────────────────────────────────
// Parsing
// ───────────────────────────────────────────────────────────────

/// A request reduced to what the router consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    /// JSON object body; empty when absent, malformed or not an object.
    pub body: Map<String, Value>,
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(HEADER_END.len()).position(|w| w == HEADER_END)
}

/// `Content-Length` from the header block, if present and numeric.
fn content_length(headers: &str) -> Option<usize> {
    headers.split("\r\n").skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Parse raw request bytes.
///
/// Only the request line must be well formed.  For POST/PUT the bytes
/// after the blank line are decoded as JSON; anything that is not a JSON
/// object becomes an empty body rather than an error.
pub fn parse_request(raw: &[u8]) -> Result<HttpRequest, TransportError> {
    let head_len = find_header_end(raw).unwrap_or(raw.len());
    let head = core::str::from_utf8(&raw[..head_len])
        .map_err(|_| TransportError::MalformedRequest)?;

    let request_line = head.split("\r\n").next().unwrap_or_default();
    let mut parts = request_line.splitn(3, ' ');
    let (Some(method), Some(path), Some(_version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(TransportError::MalformedRequest);
    };
    if method.is_empty() || path.is_empty() {
        return Err(TransportError::MalformedRequest);
    }

    let method = Method::parse(method);
    let mut body = Map::new();
    if method.carries_body() && head_len < raw.len() {
        let payload = &raw[head_len + HEADER_END.len()..];
        match serde_json::from_slice::<Value>(payload) {
            Ok(Value::Object(map)) => body = map,
            Ok(_) => debug!("http: non-object JSON body ignored"),
            Err(e) => debug!("http: unparseable body ignored ({})", e),
        }
    }

    Ok(HttpRequest {
        method,
        path: path.to_owned(),
        body,
    })
}

/// Read one request: headers, then `Content-Length` bytes of body if given.
pub fn read_request<R: Read>(stream: &mut R, max_bytes: usize) -> Result<Vec<u8>, TransportError> {
    let mut raw = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("http: read failed ({})", e);
                return Err(TransportError::ReadFailed);
            }
        };
        if n == 0 {
            if raw.is_empty() {
                return Err(TransportError::ConnectionClosed);
            }
            return Ok(raw);
        }
        if raw.len() + n > max_bytes {
            return Err(TransportError::RequestTooLarge);
        }
        raw.extend_from_slice(&chunk[..n]);

        if let Some(head_len) = find_header_end(&raw) {
            let head = String::from_utf8_lossy(&raw[..head_len]);
            let expected = head_len + HEADER_END.len() + content_length(&head).unwrap_or(0);
            if expected > max_bytes {
                return Err(TransportError::RequestTooLarge);
            }
            if raw.len() >= expected {
                return Ok(raw);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Encoding
// ───────────────────────────────────────────────────────────────

pub fn encode_response(response: &Response) -> Result<Vec<u8>, TransportError> {
    let body = response
        .to_json()
        .map_err(|_| TransportError::EncodeFailed)?;
    let head = format!(
        "HTTP/1.0 {} {}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Content-Length: {}\r\n\
         \r\n",
        response.status.code(),
        response.status.reason(),
        body.len(),
    );
    let mut out = Vec::with_capacity(head.len() + body.len());
    out.extend_from_slice(head.as_bytes());
    out.extend_from_slice(body.as_bytes());
    Ok(out)
}

// ───────────────────────────────────────────────────────────────
// Serving
// ───────────────────────────────────────────────────────────────

/// Summary of one answered request.
#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub method: Method,
    pub path: heapless::String<64>,
    pub status: StatusCode,
}

impl From<Served> for AppEvent {
    fn from(s: Served) -> Self {
        AppEvent::RequestHandled {
            method: s.method,
            path: s.path,
            status: s.status,
        }
    }
}

/// Longest prefix of `s` that fits in `N` bytes without splitting a char.
fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = heapless::String::new();
    let _ = out.push_str(&s[..end]);
    out
}

/// Read, route and answer one request on an already-accepted stream.
pub fn serve_connection<S, P>(
    stream: &mut S,
    registry: &mut MotorRegistry<P>,
    max_bytes: usize,
) -> Result<Served, TransportError>
where
    S: Read + Write,
    P: PwmPort,
{
    let raw = read_request(stream, max_bytes)?;
    let request = parse_request(&raw)?;
    info!("{} {}", request.method, request.path);

    let response = router::handle_request(registry, request.method, &request.path, &request.body);
    let bytes = encode_response(&response)?;
    stream
        .write_all(&bytes)
        .and_then(|()| stream.flush())
        .map_err(|_| TransportError::WriteFailed)?;

    Ok(Served {
        method: request.method,
        path: truncated(&request.path),
        status: response.status,
    })
}

/// Non-blocking listener plus per-connection blocking I/O.
pub struct HttpServer {
    listener: TcpListener,
    max_request_bytes: usize,
    client_timeout: Duration,
}

impl HttpServer {
    pub fn bind(config: &SystemConfig) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(("0.0.0.0", config.http_port))
            .map_err(|_| TransportError::BindFailed)?;
        listener
            .set_nonblocking(true)
            .map_err(|_| TransportError::BindFailed)?;
        info!("http: listening on 0.0.0.0:{}", config.http_port);
        Ok(Self {
            listener,
            max_request_bytes: config.max_request_bytes,
            client_timeout: Duration::from_millis(u64::from(config.client_timeout_ms)),
        })
    }

    pub fn local_port(&self) -> Option<u16> {
        self.listener.local_addr().ok().map(|a| a.port())
    }

    /// Accept a pending client, if any.
    pub fn accept(&self) -> Result<Option<TcpStream>, TransportError> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                info!("http: client connected from {}", peer);
                Ok(Some(stream))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => {
                warn!("http: accept failed ({})", e);
                Err(TransportError::AcceptFailed)
            }
        }
    }

    /// Serve one accepted client to completion and close it.
    ///
    /// On failure every motor is stopped before the error is returned.
    pub fn serve<P: PwmPort>(
        &self,
        mut stream: TcpStream,
        registry: &mut MotorRegistry<P>,
        sink: &mut impl EventSink,
    ) -> Result<StatusCode, TransportError> {
        let max_bytes = self.max_request_bytes;
        let timeout = Some(self.client_timeout);
        let served = safety::run_guarded(registry, sink, "transport failure", |reg| {
            stream
                .set_nonblocking(false)
                .and_then(|()| stream.set_read_timeout(timeout))
                .and_then(|()| stream.set_write_timeout(timeout))
                .map_err(|_| TransportError::ReadFailed)?;
            serve_connection(&mut stream, reg, max_bytes)
        });
        let _ = stream.shutdown(Shutdown::Both);

        let served = served?;
        let status = served.status;
        sink.emit(&served.into());
        Ok(status)
    }
}
