//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART / USB-CDC in production, stderr on host).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::router::StatusCode;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match event {
            AppEvent::Started { motors } => {
                info!("START | {} motor(s), all stopped", motors);
            }
            AppEvent::Listening { port } => {
                info!("HTTP  | listening on port {}", port);
            }
            AppEvent::RequestHandled { method, path, status } => match status {
                StatusCode::Ok => info!("HTTP  | {} {} -> {}", method, path, status.code()),
                _ => warn!("HTTP  | {} {} -> {}", method, path, status.code()),
            },
            AppEvent::EmergencyStop { reason } => {
                error!("SAFE  | emergency stop: {}", reason);
            }
        }
    }
}
