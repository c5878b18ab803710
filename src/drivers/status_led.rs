//! Single-colour status LED on one GPIO.
//!
//! | Pattern            | Meaning                                   |
//! |--------------------|-------------------------------------------|
//! | 3 × 200 ms blinks  | Boot complete, Wi-Fi about to connect     |
//! | steady on          | Serving, idle                             |
//! | off                | Client connected                          |
//! | 3 × 100 ms, 1 s gap| Wi-Fi failed (repeats forever)            |
//!
//! On ESP-IDF the pin is driven through hw_init; on host only the level is
//! tracked, and delays are skipped so tests run instantly.

use crate::drivers::hw_init::{self, HwInitError};

const STARTUP_BLINKS: u32 = 3;
const STARTUP_PERIOD_MS: u32 = 200;
const FAILURE_FLASHES: u32 = 3;
const FAILURE_PERIOD_MS: u32 = 100;
const FAILURE_PAUSE_MS: u32 = 1_000;

#[cfg(target_os = "espidf")]
fn delay_ms(ms: u32) {
    esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
fn delay_ms(_ms: u32) {}

pub struct StatusLed {
    pin: i32,
    on: bool,
    toggles: u32,
}

impl StatusLed {
    pub fn new(pin: i32) -> Result<Self, HwInitError> {
        hw_init::init_output(pin)?;
        Ok(Self {
            pin,
            on: false,
            toggles: 0,
        })
    }

    pub fn set(&mut self, on: bool) {
        if on != self.on {
            self.toggles = self.toggles.wrapping_add(1);
        }
        hw_init::gpio_write(self.pin, on);
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Level changes since construction.
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    /// `times` on/off cycles with `period_ms` for each half.  Ends off.
    pub fn blink(&mut self, times: u32, period_ms: u32) {
        for _ in 0..times {
            self.set(true);
            delay_ms(period_ms);
            self.set(false);
            delay_ms(period_ms);
        }
    }

    pub fn startup(&mut self) {
        self.blink(STARTUP_BLINKS, STARTUP_PERIOD_MS);
    }

    /// One round of the Wi-Fi failure pattern.
    pub fn wifi_failure_cycle(&mut self) {
        self.blink(FAILURE_FLASHES, FAILURE_PERIOD_MS);
        delay_ms(FAILURE_PAUSE_MS);
    }
}
