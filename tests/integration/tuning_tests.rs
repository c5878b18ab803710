//! Frequency sweep against mock PWM channels.

use core::ops::ControlFlow;

use motorserver::app::tuning::{SweepOutcome, SweepPlan, run_sweep};
use motorserver::error::{Error, NotFound};

use crate::mock_hw::{PwmCall, default_registry};

fn short_plan() -> SweepPlan {
    SweepPlan {
        frequencies: [1_000, 2_000].into_iter().collect(),
        duty_ceiling: 30,
        duty_step: 10,
        step_ms: 5,
        hold_ms: 50,
    }
}

#[test]
fn sweep_visits_every_frequency_and_ends_stopped() {
    let mut reg = default_registry();
    reg.set_speed("linearMotor", 60.0).unwrap();
    let before = reg.get("vibeMotor").unwrap().pwm().calls.len();
    let mut pauses = Vec::new();

    let outcome = run_sweep(&mut reg, "vibeMotor", &short_plan(), |ms| {
        pauses.push(ms);
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(outcome, SweepOutcome::Completed);

    use PwmCall::{Duty, Frequency};
    let vibe = reg.get("vibeMotor").unwrap();
    assert_eq!(
        vibe.pwm().calls[before..],
        [
            Duty(0),
            Frequency(1_000),
            Duty(0),
            Duty(10),
            Duty(20),
            Duty(29),
            Duty(19),
            Duty(9),
            Frequency(2_000),
            Duty(0),
            Duty(10),
            Duty(20),
            Duty(29),
            Duty(19),
            Duty(9),
            Duty(0),
            Frequency(2_500),
        ]
    );
    assert_eq!(vibe.frequency_hz(), 2_500);
    assert_eq!(vibe.speed(), 0.0);
    assert_eq!(pauses, [5, 5, 5, 50, 5, 5, 5, 50].repeat(2));

    let linear = reg.get("linearMotor").unwrap();
    assert_eq!(linear.pwm().last_duty(), Some(0));
    assert!(!reg.any_running());
}

#[test]
fn interrupted_sweep_forces_duty_zero() {
    let mut reg = default_registry();
    let before = reg.get("vibeMotor").unwrap().pwm().calls.len();
    let mut count = 0;

    let outcome = run_sweep(&mut reg, "vibeMotor", &short_plan(), |_| {
        count += 1;
        if count == 5 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .unwrap();
    assert_eq!(outcome, SweepOutcome::Interrupted { frequency_hz: 1_000 });

    use PwmCall::{Duty, Frequency};
    let vibe = reg.get("vibeMotor").unwrap();
    assert_eq!(
        vibe.pwm().calls[before..],
        [
            Duty(0),
            Frequency(1_000),
            Duty(0),
            Duty(10),
            Duty(20),
            Duty(29),
            Duty(0),
            Frequency(2_500),
        ]
    );
    assert!(!reg.any_running());
}

#[test]
fn unknown_motor_is_not_swept() {
    let mut reg = default_registry();
    reg.set_speed("vibeMotor", 30.0).unwrap();
    let before: Vec<Vec<PwmCall>> = reg.iter().map(|m| m.pwm().calls.clone()).collect();

    let err = run_sweep(&mut reg, "ghost", &short_plan(), |_| ControlFlow::Continue(())).unwrap_err();
    assert_eq!(err, Error::NotFound(NotFound::Motor));

    let after: Vec<Vec<PwmCall>> = reg.iter().map(|m| m.pwm().calls.clone()).collect();
    assert_eq!(before, after);
}
