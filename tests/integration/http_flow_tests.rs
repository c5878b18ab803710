//! End-to-end HTTP flows: raw bytes in, raw bytes out.
//!
//! The first group drives `serve_connection` over an in-memory stream; the
//! second binds a real loopback socket and goes through `HttpServer`.

use std::io::{Cursor, Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use motorserver::adapters::http::{HttpServer, serve_connection};
use motorserver::app::events::AppEvent;
use motorserver::app::registry::MotorRegistry;
use motorserver::app::router::StatusCode;
use motorserver::config::SystemConfig;
use motorserver::error::TransportError;
use motorserver::safety;
use serde_json::{Value, json};

use crate::mock_hw::{MockPwm, RecordingSink, default_registry};

// ── In-memory stream ──────────────────────────────────────────

struct MemStream {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
    fail_writes: bool,
}

impl MemStream {
    fn new(request: &str) -> Self {
        Self {
            input: Cursor::new(request.as_bytes().to_vec()),
            output: Vec::new(),
            fail_writes: false,
        }
    }

    fn response(&self) -> (String, Value) {
        let text = String::from_utf8(self.output.clone()).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        (head.to_owned(), serde_json::from_str(body).unwrap())
    }
}

impl Read for MemStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MemStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.fail_writes {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer gone"));
        }
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn put_speed(motor: &str, body: &str) -> String {
    format!(
        "PUT /api/motors/{} HTTP/1.1\r\nHost: esp32\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        motor,
        body.len(),
        body
    )
}

#[test]
fn put_then_get_over_the_wire() {
    let mut reg = default_registry();

    let mut s = MemStream::new(&put_speed("linearMotor", r#"{"speed": 25}"#));
    let served = serve_connection(&mut s, &mut reg, 2048).unwrap();
    assert_eq!(served.status, StatusCode::Ok);
    let (head, body) = s.response();
    assert!(head.starts_with("HTTP/1.0 200 OK"));
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    assert_eq!(body["speed"], json!(25.0));

    let mut s = MemStream::new("GET /api/motors HTTP/1.1\r\n\r\n");
    serve_connection(&mut s, &mut reg, 2048).unwrap();
    let (_, body) = s.response();
    assert_eq!(body["motors"]["linearMotor"], json!(25.0));
    assert_eq!(body["motors"]["vibeMotor"], json!(0.0));
}

#[test]
fn malformed_body_reads_as_missing_speed() {
    let mut reg = default_registry();
    let mut s = MemStream::new(&put_speed("vibeMotor", "{speed: 5"));
    let served = serve_connection(&mut s, &mut reg, 2048).unwrap();
    assert_eq!(served.status, StatusCode::BadRequest);
    let (head, body) = s.response();
    assert!(head.starts_with("HTTP/1.0 400 Bad Request"));
    assert_eq!(body, json!({"error": "Missing speed parameter"}));
}

#[test]
fn transport_failure_stops_motors() {
    let mut reg = default_registry();
    reg.set_speed("linearMotor", 70.0).unwrap();
    reg.set_speed("vibeMotor", 40.0).unwrap();
    let mut sink = RecordingSink::default();

    let mut s = MemStream::new(&put_speed("vibeMotor", r#"{"speed": 90}"#));
    s.fail_writes = true;
    let out = safety::run_guarded(&mut reg, &mut sink, "transport failure", |r| {
        serve_connection(&mut s, r, 2048)
    });

    assert_eq!(out.unwrap_err(), TransportError::WriteFailed);
    assert!(!reg.any_running());
    assert_eq!(sink.emergency_stops(), 1);
}

#[test]
fn garbage_request_line_is_transport_error() {
    let mut reg = default_registry();
    let mut s = MemStream::new("\r\n\r\n");
    assert_eq!(
        serve_connection(&mut s, &mut reg, 2048).unwrap_err(),
        TransportError::MalformedRequest
    );
    assert!(s.output.is_empty());
}

// ── Loopback socket ───────────────────────────────────────────

fn loopback_server() -> (HttpServer, u16) {
    let config = SystemConfig {
        http_port: 0,
        client_timeout_ms: 500,
        ..SystemConfig::default()
    };
    let server = HttpServer::bind(&config).unwrap();
    let port = server.local_port().unwrap();
    (server, port)
}

fn accept_within(server: &HttpServer, limit: Duration) -> TcpStream {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(stream) = server.accept().unwrap() {
            return stream;
        }
        assert!(Instant::now() < deadline, "no client connected");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn idle_listener_does_not_block() {
    let (server, _) = loopback_server();
    assert!(server.accept().unwrap().is_none());
}

#[test]
fn loopback_request_is_served_and_logged() {
    let (server, port) = loopback_server();
    let mut reg: MotorRegistry<MockPwm> = default_registry();
    let mut sink = RecordingSink::default();

    let client = thread::spawn(move || {
        let mut c = TcpStream::connect(("127.0.0.1", port)).unwrap();
        c.write_all(put_speed("vibeMotor", r#"{"speed": 50}"#).as_bytes()).unwrap();
        let mut reply = String::new();
        c.read_to_string(&mut reply).unwrap();
        reply
    });

    let stream = accept_within(&server, Duration::from_secs(2));
    let status = server.serve(stream, &mut reg, &mut sink).unwrap();
    let reply = client.join().unwrap();

    assert_eq!(status, StatusCode::Ok);
    assert!(reply.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(reply.ends_with(r#"{"status":"success","motor":"vibeMotor","speed":50.0}"#));
    assert_eq!(reg.get("vibeMotor").unwrap().speed(), 50.0);
    assert!(matches!(
        sink.events.last(),
        Some(AppEvent::RequestHandled { status: StatusCode::Ok, .. })
    ));
}

#[test]
fn silent_client_triggers_emergency_stop() {
    let (server, port) = loopback_server();
    let mut reg = default_registry();
    reg.set_speed("linearMotor", 60.0).unwrap();
    let mut sink = RecordingSink::default();

    let client = thread::spawn(move || {
        let c = TcpStream::connect(("127.0.0.1", port)).unwrap();
        drop(c);
    });

    let stream = accept_within(&server, Duration::from_secs(2));
    client.join().unwrap();
    let err = server.serve(stream, &mut reg, &mut sink).unwrap_err();

    assert_eq!(err, TransportError::ConnectionClosed);
    assert!(!reg.any_running());
    assert_eq!(sink.emergency_stops(), 1);
}
