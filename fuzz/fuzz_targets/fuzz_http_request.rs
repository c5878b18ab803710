//! Fuzz target: HTTP request parsing and dispatch
//!
//! Feeds arbitrary bytes through `parse_request` and, when a request line
//! parses, routes it against a two-motor registry.  Asserts that no input
//! panics, that the status is one of 200/400/404, and that every motor's
//! duty stays at 0 or inside its calibrated range.
//!
//! cargo fuzz run fuzz_http_request

#![no_main]

use libfuzzer_sys::fuzz_target;
use motorserver::adapters::http::{encode_response, parse_request};
use motorserver::app::ports::PwmPort;
use motorserver::app::registry::MotorRegistry;
use motorserver::app::router::handle_request;

struct Sink(u32);

impl PwmPort for Sink {
    fn set_frequency(&mut self, _hz: u32) {}
    fn set_duty_raw(&mut self, duty: u32) {
        self.0 = duty;
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(request) = parse_request(data) else {
        return;
    };

    let mut registry = MotorRegistry::new();
    let _ = registry.add("linearMotor", Sink(0), 100, 200, 800);
    let _ = registry.add("vibeMotor", Sink(0), 2_500, 250, 445);

    let response = handle_request(&mut registry, request.method, &request.path, &request.body);
    assert!(matches!(response.status.code(), 200 | 400 | 404));
    assert!(encode_response(&response).is_ok());

    for m in registry.iter() {
        let duty = m.pwm().0;
        let range = m.range();
        assert!(duty == 0 || (range.min()..=range.max()).contains(&duty));
    }
});
