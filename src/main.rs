//! SortBin Firmware — Main Entry Point
//!
//! Hexagonal architecture with an event-driven control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter      LogEventSink    NvsAdapter               │
//! │  (Sensor+Actuator+    (EventSink)     (Config+Storage)         │
//! │   Feedback)                                                    │
//! │  WifiAdapter          CameraAdapter   HttpClientAdapter        │
//! │  (Connectivity)       (Camera)        (Http)                   │
//! │  MonotonicClock                                                │
//! │  (Clock)                                                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · guardian · classifier · routing · sorter        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use sortbin::adapters::camera::CameraAdapter;
use sortbin::adapters::hardware::HardwareAdapter;
use sortbin::adapters::http::HttpClientAdapter;
use sortbin::adapters::log_sink::LogEventSink;
use sortbin::adapters::nvs::{self, NvsAdapter};
use sortbin::adapters::time::MonotonicClock;
use sortbin::adapters::wifi::{ConnectivityPort, WifiAdapter};
use sortbin::app::commands::AppCommand;
use sortbin::app::ports::{ClockPort, ConfigPort, StoragePort};
use sortbin::app::service::AppService;
use sortbin::config::SystemConfig;
use sortbin::drivers;
use sortbin::events::{self, Event};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SortBin v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new()?;
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    drivers::hw_timer::start_timers(config.control_tick_interval_ms, config.telemetry_interval_secs);

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::new(&config);
    let mut log_sink = LogEventSink::new();
    let clock = MonotonicClock::new();
    let mut http = HttpClientAdapter::new();

    let mut camera = CameraAdapter::new();
    if let Err(e) = camera.init() {
        // Every cycle will abort with a capture error until a power cycle
        // brings the sensor up; detection itself keeps running.
        warn!("Camera init failed ({:?}), cycles will abort at capture", e);
    }

    // ── 5. WiFi: credentials from NVS, then first connect ─────
    let mut wifi = WifiAdapter::new();
    match load_credentials(&nvs) {
        Some((ssid, psk)) => {
            if let Err(e) = wifi.set_credentials(&ssid, &psk) {
                warn!("Stored WiFi credentials invalid: {}", e);
            } else if let Err(e) = wifi.connect() {
                warn!("Initial WiFi connect failed: {} (poll loop retries)", e);
            }
        }
        None => warn!("No WiFi credentials in NVS — cycles will abort until provisioned"),
    }

    // ── 6. Construct app service ──────────────────────────────
    let mut app = AppService::new(config.clone());
    app.start(&mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    #[cfg(not(target_os = "espidf"))]
    let ticks_per_telemetry =
        u64::from(config.telemetry_interval_secs) * 1_000 / u64::from(config.control_tick_interval_ms);
    #[cfg(not(target_os = "espidf"))]
    let mut telemetry_counter: u64 = 0;

    loop {
        // Simulate the hardware timers via sleep on non-espidf targets.
        #[cfg(not(target_os = "espidf"))]
        {
            clock.delay_ms(config.control_tick_interval_ms);
            events::push_event(Event::ControlTick);
            telemetry_counter += 1;
            if telemetry_counter >= ticks_per_telemetry {
                events::push_event(Event::TelemetryTick);
                telemetry_counter = 0;
            }
        }

        // On the device the timers fill the queue; yield between polls so
        // the IDLE task keeps running.
        #[cfg(target_os = "espidf")]
        clock.delay_ms(10);

        events::drain_events(|event| match event {
            Event::ControlTick => {
                app.tick(&mut hw, &mut wifi, &mut camera, &mut http, &clock, &mut log_sink);
            }

            Event::TelemetryTick => {
                app.emit_telemetry(wifi.rssi(), &mut log_sink);
            }

            Event::TriggerSort => {
                app.handle_command(
                    AppCommand::TriggerSort,
                    &mut hw,
                    &mut wifi,
                    &mut camera,
                    &mut http,
                    &clock,
                    &mut log_sink,
                );
            }
        });

        // WiFi reconnection poll (exponential backoff).
        wifi.poll();

        // Config auto-save (debounced after last change).
        app.auto_save_if_needed(&nvs);

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}

/// Read provisioned WiFi credentials from the auth namespace.
fn load_credentials(storage: &impl StoragePort) -> Option<(String, String)> {
    let mut ssid_buf = [0u8; 32];
    let mut psk_buf = [0u8; 64];

    let ssid_len = storage.read(nvs::CRED_NAMESPACE, "ssid", &mut ssid_buf).ok()?;
    let ssid = core::str::from_utf8(&ssid_buf[..ssid_len]).ok()?.to_owned();

    // Open networks store no PSK.
    let psk = match storage.read(nvs::CRED_NAMESPACE, "psk", &mut psk_buf) {
        Ok(n) => core::str::from_utf8(&psk_buf[..n]).ok()?.to_owned(),
        Err(_) => String::new(),
    };

    Some((ssid, psk))
}
