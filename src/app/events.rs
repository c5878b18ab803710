//! Outbound application events.
//!
//! Emitted through the [`EventSink`](super::ports::EventSink) port by the
//! transport adapter and the safety fallback.  Adapters on the other side
//! decide what to do with them (serial log today).

use super::router::{Method, StatusCode};

/// Structured events emitted by the firmware.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Registry built; every motor is stopped.
    Started { motors: usize },

    /// The HTTP server is accepting connections.
    Listening { port: u16 },

    /// One request was routed and answered.
    RequestHandled {
        method: Method,
        path: heapless::String<64>,
        status: StatusCode,
    },

    /// All motors were stopped by the safety fallback.
    EmergencyStop { reason: &'static str },
}
