//! Named collection of motors.
//!
//! The registry is built once at boot and lives for the process lifetime.
//! Every motor is driven to the stopped state as it is added, so nothing
//! reachable through the registry can be running before the first request.

use log::{info, warn};

use super::motor::{DutyRange, Motor};
use super::ports::{ConfigError, PwmPort};
use crate::config::{MotorConfig, MotorName, SystemConfig, MAX_MOTORS};
use crate::error::NotFound;

pub struct MotorRegistry<P: PwmPort> {
    motors: heapless::Vec<Motor<P>, MAX_MOTORS>,
}

impl<P: PwmPort> Default for MotorRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PwmPort> MotorRegistry<P> {
    pub fn new() -> Self {
        Self {
            motors: heapless::Vec::new(),
        }
    }

    /// Build a registry from a validated configuration.
    ///
    /// `make_pwm` supplies the PWM port for each configured motor.  All
    /// motors are stopped on return.
    pub fn from_config(
        config: &SystemConfig,
        mut make_pwm: impl FnMut(&MotorConfig) -> P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut registry = Self::new();
        for m in &config.motors {
            registry.add(&m.name, make_pwm(m), m.frequency_hz, m.duty_min, m.duty_max)?;
        }
        registry.stop_all();
        info!("registry: {} motor(s) ready, all stopped", registry.len());
        Ok(registry)
    }

    /// Construct a motor on `pwm`, register it under `name` and stop it.
    pub fn add(
        &mut self,
        name: &str,
        pwm: P,
        frequency_hz: u32,
        duty_min: u32,
        duty_max: u32,
    ) -> Result<&mut Motor<P>, ConfigError> {
        let range = DutyRange::new(duty_min, duty_max)?;
        if self.get(name).is_some() {
            return Err(ConfigError::DuplicateMotor);
        }
        let key = MotorName::try_from(name).map_err(|()| ConfigError::NameTooLong)?;

        let mut motor = Motor::new(key, pwm, frequency_hz, range);
        motor.stop();
        self.motors
            .push(motor)
            .map_err(|_| ConfigError::TooManyMotors)?;
        info!(
            "registry: added '{}' ({} Hz, duty {}..={})",
            name, frequency_hz, duty_min, duty_max
        );

        let last = self.motors.len() - 1;
        Ok(&mut self.motors[last])
    }

    pub fn get(&self, name: &str) -> Option<&Motor<P>> {
        self.motors.iter().find(|m| m.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Motor<P>> {
        self.motors.iter_mut().find(|m| m.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Forward a speed command.  Unknown names change nothing.
    pub fn set_speed(&mut self, name: &str, percentage: f64) -> Result<(), NotFound> {
        let Some(motor) = self.get_mut(name) else {
            warn!("registry: set_speed for unknown motor '{}'", name);
            return Err(NotFound::Motor);
        };
        motor.set_speed(percentage);
        Ok(())
    }

    /// Stop every motor.  Idempotent; safe on error-recovery paths.
    pub fn stop_all(&mut self) {
        for motor in &mut self.motors {
            motor.stop();
        }
        info!("registry: all motors stopped");
    }

    /// `(name, last commanded speed)` for every motor.
    pub fn snapshot(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.motors.iter().map(|m| (m.name(), m.speed()))
    }

    pub fn any_running(&self) -> bool {
        self.motors.iter().any(Motor::is_running)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Motor<P>> + '_ {
        self.motors.iter()
    }

    pub fn len(&self) -> usize {
        self.motors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }
}
