//! Frequency sweep for choosing a motor's PWM frequency and duty range.
//!
//! One motor is stepped through a list of frequencies.  At each one its raw
//! duty ramps up from 0, holds, ramps back down and holds again, while every
//! other motor stays stopped.  However the sweep ends, the swept motor is
//! left at duty 0 on its configured frequency.

use core::ops::ControlFlow;

use log::{info, warn};

use super::motor::Motor;
use super::ports::PwmPort;
use super::registry::MotorRegistry;
use crate::error::{NotFound, Result};

pub const MAX_SWEEP_FREQUENCIES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    pub frequencies: heapless::Vec<u32, MAX_SWEEP_FREQUENCIES>,
    /// Exclusive upper bound of the ramp.
    pub duty_ceiling: u32,
    pub duty_step: u32,
    /// Pause after each duty step.
    pub step_ms: u32,
    /// Pause after each ramp.
    pub hold_ms: u32,
}

impl Default for SweepPlan {
    /// The vibration motor's tuning band.
    fn default() -> Self {
        Self {
            frequencies: [1_750, 2_000, 2_250, 2_500].into_iter().collect(),
            duty_ceiling: 250,
            duty_step: 10,
            step_ms: 100,
            hold_ms: 1_000,
        }
    }
}

impl SweepPlan {
    /// `0, step, 2*step, ..` below the ceiling.
    pub fn ramp_up(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.duty_ceiling).step_by(self.step())
    }

    /// `ceiling - 1` downwards by `step`, never below 0.
    pub fn ramp_down(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.duty_ceiling).rev().step_by(self.step())
    }

    fn step(&self) -> usize {
        self.duty_step.max(1) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    Completed,
    Interrupted { frequency_hz: u32 },
}

/// Sweep `motor` through `plan`.
///
/// `pause(ms)` runs between steps and may block; returning
/// [`ControlFlow::Break`] ends the sweep early.  Every motor is stopped
/// before the sweep starts.
pub fn run_sweep<P: PwmPort>(
    registry: &mut MotorRegistry<P>,
    motor: &str,
    plan: &SweepPlan,
    mut pause: impl FnMut(u32) -> ControlFlow<()>,
) -> Result<SweepOutcome> {
    if !registry.contains(motor) {
        return Err(NotFound::Motor.into());
    }
    registry.stop_all();
    let Some(m) = registry.get_mut(motor) else {
        return Err(NotFound::Motor.into());
    };

    let configured_hz = m.frequency_hz();
    let outcome = match sweep(m, plan, &mut pause) {
        Ok(()) => SweepOutcome::Completed,
        Err(frequency_hz) => SweepOutcome::Interrupted { frequency_hz },
    };

    m.stop();
    m.set_frequency(configured_hz);
    match outcome {
        SweepOutcome::Completed => info!("tune '{}': sweep complete", motor),
        SweepOutcome::Interrupted { frequency_hz } => {
            warn!("tune '{}': interrupted at {} Hz, stopped", motor, frequency_hz)
        }
    }
    Ok(outcome)
}

/// `Err(hz)` when `pause` breaks while sweeping `hz`.
fn sweep<P: PwmPort>(
    m: &mut Motor<P>,
    plan: &SweepPlan,
    pause: &mut impl FnMut(u32) -> ControlFlow<()>,
) -> core::result::Result<(), u32> {
    for &hz in &plan.frequencies {
        m.set_frequency(hz);
        info!("tune '{}': testing {} Hz", m.name(), hz);

        for duty in plan.ramp_up() {
            m.set_duty_raw(duty);
            wait(pause, plan.step_ms, hz)?;
        }
        wait(pause, plan.hold_ms, hz)?;

        for duty in plan.ramp_down() {
            m.set_duty_raw(duty);
            wait(pause, plan.step_ms, hz)?;
        }
        wait(pause, plan.hold_ms, hz)?;
    }
    Ok(())
}

fn wait(
    pause: &mut impl FnMut(u32) -> ControlFlow<()>,
    ms: u32,
    hz: u32,
) -> core::result::Result<(), u32> {
    match pause(ms) {
        ControlFlow::Continue(()) => Ok(()),
        ControlFlow::Break(()) => Err(hz),
    }
}
