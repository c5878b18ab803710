//! PWM-driven DC motor (L298 enable line).
//!
//! Maps an abstract speed percentage onto a calibrated raw duty range.
//!
//! ## Safety contract
//!
//! Speed 0 always writes duty 0, never `duty_min`: a calibrated range with
//! `duty_min > 0` would otherwise leave the motor energised at "stop".
//! Construction forces the stopped state before the motor is handed out.

use log::{debug, info};

use super::ports::{ConfigError, PwmPort};
use crate::config::MotorName;

// ───────────────────────────────────────────────────────────────
// Duty range
// ───────────────────────────────────────────────────────────────

/// Calibrated raw duty bounds, `min <= max` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyRange {
    min: u32,
    max: u32,
}

impl DutyRange {
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidDutyRange {
                duty_min: min,
                duty_max: max,
            });
        }
        Ok(Self { min, max })
    }

    pub fn min(self) -> u32 {
        self.min
    }

    pub fn max(self) -> u32 {
        self.max
    }

    /// Raw duty for `speed`, which must already be clamped to `(0, 100]`.
    ///
    /// Linear between `min` and `max`, rounded to nearest.
    pub fn duty_for(self, speed: f64) -> u32 {
        let span = f64::from(self.max - self.min);
        let duty = f64::from(self.min) + speed / 100.0 * span;
        (duty.round() as u32).clamp(self.min, self.max)
    }

    /// Inverse of [`duty_for`](Self::duty_for), clamped to `[0, 100]`.
    /// Duties at or below `min` read as 0.
    pub fn speed_for(self, duty: u32) -> f64 {
        if duty <= self.min {
            return 0.0;
        }
        if self.min == self.max {
            return 100.0;
        }
        let span = f64::from(self.max - self.min);
        (f64::from(duty - self.min) / span * 100.0).min(100.0)
    }
}

/// Clamp a requested speed to `[0, 100]`.  NaN maps to 0 (stop).
pub fn clamp_speed(percentage: f64) -> f64 {
    if percentage.is_nan() {
        return 0.0;
    }
    percentage.clamp(0.0, 100.0)
}

// ───────────────────────────────────────────────────────────────
// Motor
// ───────────────────────────────────────────────────────────────

pub struct Motor<P: PwmPort> {
    name: MotorName,
    pwm: P,
    frequency_hz: u32,
    range: DutyRange,
    /// Last commanded speed after clamping (0–100).
    speed: f64,
    /// Last raw duty written to `pwm`.
    duty: u32,
}

impl<P: PwmPort> Motor<P> {
    /// Take ownership of `pwm`, program its frequency and force duty 0.
    pub fn new(name: MotorName, mut pwm: P, frequency_hz: u32, range: DutyRange) -> Self {
        pwm.set_frequency(frequency_hz);
        pwm.set_duty_raw(0);
        Self {
            name,
            pwm,
            frequency_hz,
            range,
            speed: 0.0,
            duty: 0,
        }
    }

    /// Command a speed percentage.  Out-of-range input is clamped, never
    /// rejected; exactly one duty value is written.
    pub fn set_speed(&mut self, percentage: f64) {
        let speed = clamp_speed(percentage);
        let duty = if speed == 0.0 {
            0
        } else {
            self.range.duty_for(speed)
        };
        info!(
            "motor '{}': speed {} -> {}% (duty {})",
            self.name, percentage, speed, duty
        );
        self.pwm.set_duty_raw(duty);
        self.speed = speed;
        self.duty = duty;
    }

    /// Write a raw duty, bypassing the speed mapping.
    ///
    /// Frequency tuning uses this to explore duties outside the calibrated
    /// range.  The stored speed becomes the equivalent percentage.
    pub fn set_duty_raw(&mut self, duty: u32) {
        debug!("motor '{}': raw duty {}", self.name, duty);
        self.pwm.set_duty_raw(duty);
        self.speed = self.range.speed_for(duty);
        self.duty = duty;
    }

    pub fn stop(&mut self) {
        self.pwm.set_duty_raw(0);
        self.speed = 0.0;
        self.duty = 0;
    }

    /// Reprogram the PWM frequency; speed and duty are unchanged.
    pub fn set_frequency(&mut self, hz: u32) {
        self.pwm.set_frequency(hz);
        self.frequency_hz = hz;
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn duty(&self) -> u32 {
        self.duty
    }

    pub fn is_running(&self) -> bool {
        self.duty != 0
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn range(&self) -> DutyRange {
        self.range
    }

    /// The owned PWM port (used by tests to inspect mock channels).
    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
