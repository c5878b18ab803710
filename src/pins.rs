//! GPIO / peripheral assignments for the ESP32 DevKit V1 motor board.
//!
//! Single source of truth for pin numbers and LEDC resources.  The default
//! [`SystemConfig`](crate::config::SystemConfig) is built from these
//! constants; a stored config may override the motor entries.

// ---------------------------------------------------------------------------
// Linear motor (L298 channel A enable)
// ---------------------------------------------------------------------------

pub const LINEAR_MOTOR_GPIO: i32 = 25;
pub const LINEAR_MOTOR_LEDC_CHANNEL: u32 = 0;
pub const LINEAR_MOTOR_LEDC_TIMER: u32 = 0;
/// Low frequency gives the linear actuator usable torque at low duty.
pub const LINEAR_MOTOR_PWM_FREQ_HZ: u32 = 100;
pub const LINEAR_MOTOR_DUTY_MIN: u32 = 200;
pub const LINEAR_MOTOR_DUTY_MAX: u32 = 800;

// ---------------------------------------------------------------------------
// Vibration motor (L298 channel B enable)
// ---------------------------------------------------------------------------

pub const VIBE_MOTOR_GPIO: i32 = 26;
pub const VIBE_MOTOR_LEDC_CHANNEL: u32 = 1;
pub const VIBE_MOTOR_LEDC_TIMER: u32 = 1;
pub const VIBE_MOTOR_PWM_FREQ_HZ: u32 = 2_500;
pub const VIBE_MOTOR_DUTY_MIN: u32 = 250;
pub const VIBE_MOTOR_DUTY_MAX: u32 = 445;

// ---------------------------------------------------------------------------
// Status LED (on-board blue LED)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  10-bit gives 0 – 1023 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 10;
/// Largest raw duty value at [`PWM_RESOLUTION_BITS`].
pub const PWM_DUTY_MAX: u32 = (1 << PWM_RESOLUTION_BITS) - 1;
/// Number of LEDC low-speed channels available.
pub const LEDC_CHANNEL_COUNT: u32 = 8;
/// Number of LEDC low-speed timers available.
pub const LEDC_TIMER_COUNT: u32 = 4;
