//! System configuration parameters
//!
//! Motor calibration, server and timing parameters.  Defaults come from
//! [`crate::pins`]; a validated copy may be stored in NVS and is loaded at
//! boot through [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Upper bound on registered motors (power of two for the registry map).
pub const MAX_MOTORS: usize = 4;
/// Capacity of a motor name in bytes.
pub const MOTOR_NAME_LEN: usize = 16;

pub type MotorName = heapless::String<MOTOR_NAME_LEN>;

/// One motor's wiring and calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub name: MotorName,
    /// Enable-pin GPIO driven by the LEDC channel.
    pub gpio: i32,
    pub ledc_channel: u32,
    pub ledc_timer: u32,
    pub frequency_hz: u32,
    /// Lower end of the linear map: the duty approached as speed falls
    /// toward 0 (the motor's stall threshold).  Speed 0 itself writes 0.
    pub duty_min: u32,
    /// Raw duty written at 100 % speed.
    pub duty_max: u32,
}

impl MotorConfig {
    pub fn new(
        name: &str,
        gpio: i32,
        ledc_channel: u32,
        ledc_timer: u32,
        frequency_hz: u32,
        duty_min: u32,
        duty_max: u32,
    ) -> Result<Self, ConfigError> {
        let mut n = MotorName::new();
        n.push_str(name).map_err(|()| ConfigError::NameTooLong)?;
        Ok(Self {
            name: n,
            gpio,
            ledc_channel,
            ledc_timer,
            frequency_hz,
            duty_min,
            duty_max,
        })
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Motors ---
    pub motors: heapless::Vec<MotorConfig, MAX_MOTORS>,

    // --- HTTP server ---
    /// TCP port the API listens on
    pub http_port: u16,
    /// Largest accepted request (headers + body) in bytes
    pub max_request_bytes: usize,
    /// Socket read timeout for an accepted client (milliseconds)
    pub client_timeout_ms: u32,

    // --- Timing ---
    /// Idle delay between accept polls (milliseconds)
    pub poll_interval_ms: u32,
    /// How long to wait for the AP association (seconds)
    pub wifi_connect_timeout_secs: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Indicators ---
    pub status_led_gpio: i32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut motors = heapless::Vec::new();
        let linear = MotorConfig {
            name: MotorName::try_from("linearMotor").unwrap_or_default(),
            gpio: pins::LINEAR_MOTOR_GPIO,
            ledc_channel: pins::LINEAR_MOTOR_LEDC_CHANNEL,
            ledc_timer: pins::LINEAR_MOTOR_LEDC_TIMER,
            frequency_hz: pins::LINEAR_MOTOR_PWM_FREQ_HZ,
            duty_min: pins::LINEAR_MOTOR_DUTY_MIN,
            duty_max: pins::LINEAR_MOTOR_DUTY_MAX,
        };
        let vibe = MotorConfig {
            name: MotorName::try_from("vibeMotor").unwrap_or_default(),
            gpio: pins::VIBE_MOTOR_GPIO,
            ledc_channel: pins::VIBE_MOTOR_LEDC_CHANNEL,
            ledc_timer: pins::VIBE_MOTOR_LEDC_TIMER,
            frequency_hz: pins::VIBE_MOTOR_PWM_FREQ_HZ,
            duty_min: pins::VIBE_MOTOR_DUTY_MIN,
            duty_max: pins::VIBE_MOTOR_DUTY_MAX,
        };
        // Capacity is MAX_MOTORS; two pushes cannot overflow.
        let _ = motors.push(linear);
        let _ = motors.push(vibe);

        Self {
            motors,

            // HTTP server
            http_port: 80,
            max_request_bytes: 2048,
            client_timeout_ms: 2_000,

            // Timing
            poll_interval_ms: 10,
            wifi_connect_timeout_secs: 10,
            watchdog_timeout_ms: 15_000,

            status_led_gpio: pins::STATUS_LED_GPIO,
        }
    }
}

impl SystemConfig {
    /// Reject configurations that could drive hardware unsafely.
    ///
    /// Called before a stored config is trusted and before one is saved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motors.is_empty() {
            return Err(ConfigError::ValidationFailed("no motors configured"));
        }
        for (i, m) in self.motors.iter().enumerate() {
            if m.name.is_empty() {
                return Err(ConfigError::ValidationFailed("motor name empty"));
            }
            if m.duty_min > m.duty_max {
                return Err(ConfigError::InvalidDutyRange {
                    duty_min: m.duty_min,
                    duty_max: m.duty_max,
                });
            }
            if m.duty_max > pins::PWM_DUTY_MAX {
                return Err(ConfigError::ValidationFailed(
                    "duty_max exceeds PWM resolution",
                ));
            }
            if m.frequency_hz == 0 {
                return Err(ConfigError::ValidationFailed("frequency_hz must be > 0"));
            }
            if m.ledc_channel >= pins::LEDC_CHANNEL_COUNT {
                return Err(ConfigError::ValidationFailed("ledc_channel out of range"));
            }
            if m.ledc_timer >= pins::LEDC_TIMER_COUNT {
                return Err(ConfigError::ValidationFailed("ledc_timer out of range"));
            }

            for other in &self.motors[i + 1..] {
                if other.name == m.name {
                    return Err(ConfigError::DuplicateMotor);
                }
                if other.gpio == m.gpio {
                    return Err(ConfigError::ValidationFailed("GPIO shared by two motors"));
                }
                if other.ledc_channel == m.ledc_channel {
                    return Err(ConfigError::ValidationFailed(
                        "LEDC channel shared by two motors",
                    ));
                }
                if other.ledc_timer == m.ledc_timer && other.frequency_hz != m.frequency_hz {
                    return Err(ConfigError::ValidationFailed(
                        "LEDC timer shared by motors with different frequencies",
                    ));
                }
            }
        }
        if self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port must be > 0"));
        }
        if self.max_request_bytes < 64 {
            return Err(ConfigError::ValidationFailed("max_request_bytes too small"));
        }
        if self.watchdog_timeout_ms <= self.client_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog must outlast a client read timeout",
            ));
        }
        if u64::from(self.watchdog_timeout_ms) <= u64::from(self.wifi_connect_timeout_secs) * 1000 {
            return Err(ConfigError::ValidationFailed(
                "watchdog must outlast a WiFi connect attempt",
            ));
        }
        Ok(())
    }

    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors.iter().find(|m| m.name == name)
    }
}

// ---------------------------------------------------------------------------
// Wi-Fi credentials
// ---------------------------------------------------------------------------

/// Station credentials, stored as `key=value` lines:
///
/// ```text
/// ssid=HomeNetwork
/// password=hunter22
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl WifiCredentials {
    /// Parse `key=value` text.  Keys and values are trimmed; unknown keys
    /// and lines without `=` are ignored.  Values may themselves contain `=`.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut ssid = None;
        let mut password = None;
        for line in text.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            match key.trim() {
                "ssid" => ssid = Some(value.trim()),
                "password" => password = Some(value.trim()),
                _ => {}
            }
        }
        match (ssid, password) {
            (Some(s), Some(p)) => Self::new(s, p),
            _ => Err(ConfigError::ValidationFailed(
                "wifi config missing ssid or password",
            )),
        }
    }

    pub fn new(ssid: &str, password: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            ssid: heapless::String::try_from(ssid)
                .map_err(|()| ConfigError::ValidationFailed("ssid longer than 32 bytes"))?,
            password: heapless::String::try_from(password)
                .map_err(|()| ConfigError::ValidationFailed("password longer than 64 bytes"))?,
        })
    }

    /// Credentials baked in at build time via `WIFI_SSID` / `WIFI_PASSWORD`.
    pub fn from_build_env() -> Option<Self> {
        let ssid = option_env!("WIFI_SSID")?;
        let password = option_env!("WIFI_PASSWORD").unwrap_or("");
        Self::new(ssid, password).ok()
    }
}
