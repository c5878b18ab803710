//! Property tests for the duty mapping and the router.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use motorserver::app::motor::{DutyRange, Motor};
use motorserver::app::ports::PwmPort;
use motorserver::app::registry::MotorRegistry;
use motorserver::app::router::{Method, handle_request};
use motorserver::config::MotorName;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

#[derive(Default)]
struct Probe {
    duty: Option<u32>,
    writes: usize,
}

impl PwmPort for Probe {
    fn set_frequency(&mut self, _hz: u32) {}

    fn set_duty_raw(&mut self, duty: u32) {
        self.duty = Some(duty);
        self.writes += 1;
    }
}

fn motor(min: u32, max: u32) -> Motor<Probe> {
    let range = DutyRange::new(min, max).unwrap();
    Motor::new(MotorName::try_from("m").unwrap(), Probe::default(), 1_000, range)
}

fn range() -> impl Strategy<Value = (u32, u32)> {
    (0u32..=1023).prop_flat_map(|min| (Just(min), min..=1023))
}

// ── Motor duty mapping ────────────────────────────────────────

proptest! {
    #[test]
    fn non_positive_speed_is_zero_duty((min, max) in range(), s in -1.0e6f64..=0.0) {
        let mut m = motor(min, max);
        m.set_speed(50.0);
        m.set_speed(s);
        prop_assert_eq!(m.pwm().duty, Some(0));
        prop_assert_eq!(m.speed(), 0.0);
    }

    #[test]
    fn in_range_speed_maps_linearly((min, max) in range(), s in 0.001f64..=100.0) {
        let mut m = motor(min, max);
        m.set_speed(s);
        let expected = (f64::from(min) + s / 100.0 * f64::from(max - min)).round() as u32;
        let duty = m.pwm().duty.unwrap();
        prop_assert_eq!(duty, expected);
        prop_assert!(min <= duty && duty <= max);
        prop_assert_eq!(m.speed(), s);
    }

    #[test]
    fn over_range_equals_full_speed((min, max) in range(), s in 100.0f64..1.0e9) {
        let mut over = motor(min, max);
        let mut full = motor(min, max);
        over.set_speed(s);
        full.set_speed(100.0);
        prop_assert_eq!(over.pwm().duty, full.pwm().duty);
        prop_assert_eq!(over.speed(), 100.0);
    }

    #[test]
    fn every_command_is_one_write((min, max) in range(), speeds in proptest::collection::vec(any::<f64>(), 1..20)) {
        let mut m = motor(min, max);
        let base = m.pwm().writes;
        for s in &speeds {
            m.set_speed(*s);
            let duty = m.pwm().duty.unwrap();
            prop_assert!(duty == 0 || (min..=max).contains(&duty));
        }
        prop_assert_eq!(m.pwm().writes, base + speeds.len());
    }
}

// ── Router invariants ─────────────────────────────────────────

fn registry() -> MotorRegistry<Probe> {
    let mut r = MotorRegistry::new();
    r.add("linearMotor", Probe::default(), 100, 200, 800).unwrap();
    r.add("vibeMotor", Probe::default(), 2_500, 250, 445).unwrap();
    r
}

fn snapshot(r: &MotorRegistry<Probe>) -> Vec<(String, f64, Option<u32>, usize)> {
    r.iter()
        .map(|m| (m.name().to_owned(), m.speed(), m.pwm().duty, m.pwm().writes))
        .collect()
}

fn method() -> impl Strategy<Value = Method> {
    prop_oneof![Just(Method::Get), Just(Method::Post), Just(Method::Put), Just(Method::Other)]
}

fn path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/api/motors".to_owned()),
        Just("/api/motors/stop".to_owned()),
        Just("/api/motors/linearMotor".to_owned()),
        "/api/motors/[a-zA-Z]{0,12}",
        "/[a-z/]{0,20}",
    ]
}

fn body() -> impl Strategy<Value = Map<String, Value>> {
    let speed = prop_oneof![
        any::<i32>().prop_map(Value::from),
        any::<f64>().prop_map(|f| json!(f)),
        "[a-z0-9.\\-]{0,6}".prop_map(Value::from),
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
    ];
    prop_oneof![
        Just(Map::new()),
        speed.prop_map(|s| {
            let mut m = Map::new();
            m.insert("speed".to_owned(), s);
            m
        }),
    ]
}

proptest! {
    #[test]
    fn rejections_never_mutate(m in method(), p in path(), b in body()) {
        let mut r = registry();
        r.set_speed("vibeMotor", 42.0).unwrap();
        let before = snapshot(&r);
        let resp = handle_request(&mut r, m, &p, &b);
        if resp.status.code() != 200 {
            prop_assert_eq!(snapshot(&r), before);
        }
    }

    #[test]
    fn status_code_is_from_fixed_set(m in method(), p in path(), b in body()) {
        let mut r = registry();
        let resp = handle_request(&mut r, m, &p, &b);
        prop_assert!([200u16, 400, 404].contains(&resp.status.code()));
        prop_assert!(resp.to_json().is_ok());
    }

    #[test]
    fn put_speed_maps_with_full_precision(
        s in prop_oneof![1e-300f64..1e-3, 1e-3f64..=100.0],
        numeric_string in any::<bool>(),
    ) {
        let mut r = registry();
        let mut b = Map::new();
        let value = if numeric_string { Value::from(s.to_string()) } else { json!(s) };
        b.insert("speed".to_owned(), value);
        let resp = handle_request(&mut r, Method::Put, "/api/motors/linearMotor", &b);
        prop_assert_eq!(resp.status.code(), 200);

        let expected = (200.0 + s / 100.0 * 600.0).round() as u32;
        let m = r.get("linearMotor").unwrap();
        prop_assert_eq!(m.pwm().duty, Some(expected));
        prop_assert!(m.speed() > 0.0);
    }

    #[test]
    fn stop_then_list_is_all_zero(cmds in proptest::collection::vec((0usize..2, -50.0f64..200.0), 0..10)) {
        let mut r = registry();
        let names = ["linearMotor", "vibeMotor"];
        for (i, s) in cmds {
            let mut b = Map::new();
            b.insert("speed".to_owned(), json!(s));
            let path = format!("/api/motors/{}", names[i]);
            handle_request(&mut r, Method::Put, &path, &b);
        }
        handle_request(&mut r, Method::Post, "/api/motors/stop", &Map::new());
        let list = handle_request(&mut r, Method::Get, "/api/motors", &Map::new());
        let v: Value = serde_json::from_str(&list.to_json().unwrap()).unwrap();
        prop_assert_eq!(&v["motors"], &json!({"linearMotor": 0.0, "vibeMotor": 0.0}));
    }
}
