//! Hardware adapter: LEDC channels behind [`PwmPort`].
//!
//! One [`LedcPwm`] per motor.  This is the only place motor duty reaches
//! real registers; on non-espidf targets the hw_init calls are no-op stubs
//! and the last written values are kept for inspection.

use crate::app::ports::PwmPort;
use crate::config::MotorConfig;
use crate::drivers::hw_init;
use crate::pins;

/// One LEDC channel bound to its timer.
pub struct LedcPwm {
    channel: u32,
    timer: u32,
    duty: u32,
    frequency_hz: u32,
}

impl LedcPwm {
    /// Wrap a channel already configured by
    /// [`hw_init::init_motor_channel`].
    pub fn from_config(motor: &MotorConfig) -> Self {
        Self {
            channel: motor.ledc_channel,
            timer: motor.ledc_timer,
            duty: 0,
            frequency_hz: motor.frequency_hz,
        }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }

    pub fn duty(&self) -> u32 {
        self.duty
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }
}

impl PwmPort for LedcPwm {
    fn set_frequency(&mut self, hz: u32) {
        hw_init::ledc_set_freq(self.timer, hz);
        self.frequency_hz = hz;
    }

    fn set_duty_raw(&mut self, duty: u32) {
        let duty = duty.min(pins::PWM_DUTY_MAX);
        hw_init::ledc_set_duty(self.channel, duty);
        self.duty = duty;
    }
}
