//! Router behaviour against a registry of mock motors.

use motorserver::app::registry::MotorRegistry;
use motorserver::app::router::{Method, handle_request};
use serde_json::{Map, Value, json};

use crate::mock_hw::{MockPwm, PwmCall, default_registry};

fn call(reg: &mut MotorRegistry<MockPwm>, method: Method, path: &str, body: Value) -> (u16, Value) {
    let body = match body {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    let resp = handle_request(reg, method, path, &body);
    let json: Value = serde_json::from_str(&resp.to_json().unwrap()).unwrap();
    (resp.status.code(), json)
}

fn speeds(reg: &mut MotorRegistry<MockPwm>) -> Value {
    let (code, body) = call(reg, Method::Get, "/api/motors", Value::Null);
    assert_eq!(code, 200);
    assert_eq!(body["status"], "running");
    body["motors"].clone()
}

#[test]
fn fresh_registry_reports_all_stopped() {
    let mut reg = default_registry();
    assert_eq!(speeds(&mut reg), json!({"linearMotor": 0.0, "vibeMotor": 0.0}));
    for m in reg.iter() {
        assert_eq!(m.pwm().last_duty(), Some(0));
    }
}

#[test]
fn set_speed_then_list() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": 50}));
    assert_eq!(code, 200);
    assert_eq!(body, json!({"status": "success", "motor": "linearMotor", "speed": 50.0}));
    assert_eq!(speeds(&mut reg)["linearMotor"], json!(50.0));
    assert_eq!(reg.get("linearMotor").unwrap().pwm().last_duty(), Some(500));
}

#[test]
fn post_also_sets_speed() {
    let mut reg = default_registry();
    let (code, _) = call(&mut reg, Method::Post, "/api/motors/vibeMotor", json!({"speed": "75"}));
    assert_eq!(code, 200);
    assert_eq!(speeds(&mut reg)["vibeMotor"], json!(75.0));
}

#[test]
fn over_range_echoes_input_but_stores_clamped() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/vibeMotor", json!({"speed": 150}));
    assert_eq!(code, 200);
    assert_eq!(body["speed"], json!(150.0));
    assert_eq!(speeds(&mut reg)["vibeMotor"], json!(100.0));
    assert_eq!(reg.get("vibeMotor").unwrap().pwm().last_duty(), Some(445));
}

#[test]
fn negative_speed_stops() {
    let mut reg = default_registry();
    call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": 40}));
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": -10}));
    assert_eq!(code, 200);
    assert_eq!(body["speed"], json!(-10.0));
    assert_eq!(speeds(&mut reg)["linearMotor"], json!(0.0));
    assert_eq!(reg.get("linearMotor").unwrap().pwm().last_duty(), Some(0));
}

#[test]
fn unknown_motor_is_404() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Post, "/api/motors/unknownName", json!({"speed": 10}));
    assert_eq!(code, 404);
    assert_eq!(body, json!({"error": "Motor not found"}));
}

#[test]
fn unknown_motor_wins_over_bad_body() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/ghost", json!({}));
    assert_eq!(code, 404);
    assert_eq!(body["error"], "Motor not found");
}

#[test]
fn missing_speed_is_400() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({}));
    assert_eq!(code, 400);
    assert_eq!(body, json!({"error": "Missing speed parameter"}));
}

#[test]
fn absent_body_is_missing_speed() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/linearMotor", Value::Null);
    assert_eq!(code, 400);
    assert_eq!(body["error"], "Missing speed parameter");
}

#[test]
fn non_numeric_speed_is_400() {
    let mut reg = default_registry();
    let (code, body) = call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": "abc"}));
    assert_eq!(code, 400);
    assert_eq!(body, json!({"error": "Invalid speed value"}));
}

#[test]
fn rejected_requests_never_touch_hardware() {
    let mut reg = default_registry();
    call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": 30}));
    let before: Vec<Vec<PwmCall>> = reg.iter().map(|m| m.pwm().calls.clone()).collect();

    call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": "abc"}));
    call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({}));
    call(&mut reg, Method::Put, "/api/motors/nobody", json!({"speed": 1}));
    call(&mut reg, Method::Get, "/api/nothing", Value::Null);
    call(&mut reg, Method::Other, "/api/motors/stop", Value::Null);

    let after: Vec<Vec<PwmCall>> = reg.iter().map(|m| m.pwm().calls.clone()).collect();
    assert_eq!(before, after);
    assert_eq!(speeds(&mut reg)["linearMotor"], json!(30.0));
}

#[test]
fn unknown_route_is_404() {
    let mut reg = default_registry();
    for (method, path) in [
        (Method::Get, "/"),
        (Method::Get, "/api/motors/linearMotor"),
        (Method::Post, "/api/motors"),
        (Method::Other, "/api/motors"),
    ] {
        let (code, body) = call(&mut reg, method, path, Value::Null);
        assert_eq!(code, 404, "{} {}", method, path);
        assert_eq!(body, json!({"error": "Not found"}));
    }
}

#[test]
fn stop_all_resets_every_motor() {
    let mut reg = default_registry();
    call(&mut reg, Method::Put, "/api/motors/linearMotor", json!({"speed": 80}));
    call(&mut reg, Method::Put, "/api/motors/vibeMotor", json!({"speed": 20}));

    let (code, body) = call(&mut reg, Method::Post, "/api/motors/stop", Value::Null);
    assert_eq!(code, 200);
    assert_eq!(body, json!({"status": "All motors stopped"}));
    assert_eq!(speeds(&mut reg), json!({"linearMotor": 0.0, "vibeMotor": 0.0}));
}

#[test]
fn repeated_stop_is_idempotent() {
    let mut reg = default_registry();
    call(&mut reg, Method::Put, "/api/motors/vibeMotor", json!({"speed": 60}));
    for _ in 0..3 {
        let (code, _) = call(&mut reg, Method::Post, "/api/motors/stop", Value::Null);
        assert_eq!(code, 200);
        assert_eq!(speeds(&mut reg), json!({"linearMotor": 0.0, "vibeMotor": 0.0}));
    }
}

#[test]
fn each_command_writes_exactly_one_duty() {
    let mut reg = default_registry();
    let before = reg.get("vibeMotor").unwrap().pwm().duty_writes();
    call(&mut reg, Method::Put, "/api/motors/vibeMotor", json!({"speed": 33}));
    let motor = reg.get("vibeMotor").unwrap();
    assert_eq!(motor.pwm().duty_writes(), before + 1);
    assert_eq!(motor.pwm().last_duty(), Some(314));
}
