//! Mock hardware for integration tests.
//!
//! Records every PWM call so tests can assert on the full command history
//! without touching real LEDC registers.

use motorserver::app::events::AppEvent;
use motorserver::app::ports::{EventSink, PwmPort};
use motorserver::app::registry::MotorRegistry;
use motorserver::config::SystemConfig;

// ── PWM call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmCall {
    Frequency(u32),
    Duty(u32),
}

// ── MockPwm ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockPwm {
    pub calls: Vec<PwmCall>,
}

#[allow(dead_code)]
impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_duty(&self) -> Option<u32> {
        self.calls.iter().rev().find_map(|c| match c {
            PwmCall::Duty(d) => Some(*d),
            PwmCall::Frequency(_) => None,
        })
    }

    pub fn duty_writes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PwmCall::Duty(_)))
            .count()
    }
}

impl PwmPort for MockPwm {
    fn set_frequency(&mut self, hz: u32) {
        self.calls.push(PwmCall::Frequency(hz));
    }

    fn set_duty_raw(&mut self, duty: u32) {
        self.calls.push(PwmCall::Duty(duty));
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn emergency_stops(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::EmergencyStop { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// The board's two motors on mock PWM channels.
pub fn default_registry() -> MotorRegistry<MockPwm> {
    match MotorRegistry::from_config(&SystemConfig::default(), |_| MockPwm::new()) {
        Ok(r) => r,
        Err(e) => panic!("default config must build: {}", e),
    }
}
