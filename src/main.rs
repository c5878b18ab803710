//! Motor server firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  LedcPwm      LogEventSink   NvsAdapter    WifiAdapter     │
//! │  (PwmPort)    (EventSink)    (ConfigPort)  (Connectivity)  │
//! │  HttpServer (transport, HTTP/1.0 + JSON)                   │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ───────────────      │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  MotorRegistry · Router · Safety (pure logic)        │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::ops::ControlFlow;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use motorserver::adapters::hardware::LedcPwm;
use motorserver::adapters::http::HttpServer;
use motorserver::adapters::log_sink::LogEventSink;
use motorserver::adapters::nvs::NvsAdapter;
use motorserver::adapters::wifi::{ConnectivityPort, WifiAdapter};
use motorserver::app::events::AppEvent;
use motorserver::app::ports::{ConfigPort, EventSink};
use motorserver::app::registry::MotorRegistry;
use motorserver::app::tuning::{self, SweepPlan};
use motorserver::config::{SystemConfig, WifiCredentials};
use motorserver::drivers::hw_init;
use motorserver::drivers::status_led::StatusLed;
use motorserver::drivers::watchdog::Watchdog;
use motorserver::safety;

/// Blink the Wi-Fi failure pattern forever.  Motors are already stopped.
fn halt_with_wifi_failure(led: &mut StatusLed, watchdog: &mut Watchdog) -> ! {
    error!("WiFi unavailable, halting (motors stopped)");
    loop {
        led.wifi_failure_cycle();
        watchdog.feed();
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MotorServer v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            None
        }
    };
    let config = match nvs.as_ref().map(|n| n.load()) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
        None => SystemConfig::default(),
    };

    // ── 3. Status LED + watchdog ──────────────────────────────
    let mut led = StatusLed::new(config.status_led_gpio)?;
    let mut watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 4. Motors: LEDC channels, then registry (all stopped) ─
    for motor in &config.motors {
        hw_init::init_motor_channel(motor)?;
    }
    let mut registry = MotorRegistry::from_config(&config, LedcPwm::from_config)?;
    let mut sink = LogEventSink::new();
    sink.emit(&AppEvent::Started {
        motors: registry.len(),
    });

    led.startup();

    // ── 5. Optional frequency sweep (MOTOR_TUNE=<motor name>) ─
    if let Some(name) = option_env!("MOTOR_TUNE") {
        let outcome = tuning::run_sweep(&mut registry, name, &SweepPlan::default(), |ms| {
            watchdog.feed();
            FreeRtos::delay_ms(ms);
            ControlFlow::Continue(())
        })?;
        info!("Tuning finished: {:?}", outcome);
    }

    // ── 6. WiFi ───────────────────────────────────────────────
    let creds = match nvs.as_mut() {
        Some(n) => n.wifi_credentials_or(WifiCredentials::from_build_env()),
        None => WifiCredentials::from_build_env(),
    };
    let Some(creds) = creds else {
        error!("No WiFi credentials in NVS or build environment");
        halt_with_wifi_failure(&mut led, &mut watchdog);
    };

    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?,
        sysloop,
    )?;
    let timeout = Duration::from_secs(u64::from(config.wifi_connect_timeout_secs));
    let mut wifi = WifiAdapter::new(driver, timeout).with_credentials(&creds)?;
    if let Err(e) = wifi.connect() {
        error!("WiFi connect failed: {}", e);
        registry.stop_all();
        halt_with_wifi_failure(&mut led, &mut watchdog);
    }
    if let Some(ip) = wifi.ip_address() {
        info!("Motor API at http://{}:{}/api/motors", ip, config.http_port);
    }

    // ── 7. HTTP server ────────────────────────────────────────
    let server = HttpServer::bind(&config)?;
    sink.emit(&AppEvent::Listening {
        port: server.local_port().unwrap_or(config.http_port),
    });

    // ── 8. Serve loop ─────────────────────────────────────────
    loop {
        watchdog.feed();
        led.set(true);

        if wifi.poll() {
            safety::emergency_stop(&mut registry, &mut sink, "wifi connection lost");
        }

        match server.accept() {
            Ok(Some(stream)) => {
                led.set(false);
                if let Err(e) = server.serve(stream, &mut registry, &mut sink) {
                    warn!("Request failed: {}", e);
                }
            }
            Ok(None) => FreeRtos::delay_ms(config.poll_interval_ms),
            Err(e) => {
                safety::emergency_stop(&mut registry, &mut sink, "accept failed");
                warn!("Accept failed: {}", e);
                FreeRtos::delay_ms(config.poll_interval_ms);
            }
        }
    }
}
