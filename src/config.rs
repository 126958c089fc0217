//! System configuration parameters
//!
//! All tunable parameters for the SortBin appliance.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::category::Category;
use crate::routing::BinIndex;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Detection ---
    /// Minimum gap between two accepted detections (milliseconds).
    pub debounce_interval_ms: u32,
    /// IR sensor polarity: `true` = object present reads LOW.
    pub sensor_active_low: bool,

    // --- Connectivity ---
    /// Total time to wait for the link to come back up (milliseconds).
    pub connect_timeout_ms: u32,
    /// Poll interval while waiting for the link (milliseconds).
    pub connect_poll_interval_ms: u32,

    // --- Classifier ---
    /// Classification endpoint (POST, raw JPEG body).
    pub classify_url: heapless::String<128>,

    // --- Carousel ---
    /// Delay between stepper pulses (microseconds) — sets rotation speed.
    pub step_period_us: u32,
    /// Mechanical settle delay after rotation stops (milliseconds).
    pub settle_delay_ms: u32,
    /// Bin the carousel is physically aligned to at power-on.
    pub home_bin: BinIndex,

    // --- Gate ---
    /// Servo duty for the open position (LEDC counts, 14-bit @ 50 Hz).
    pub gate_open_duty: u16,
    /// Servo duty for the closed position.
    pub gate_closed_duty: u16,
    /// How long the gate stays open for the object to fall (milliseconds).
    pub gate_dwell_ms: u32,

    // --- Timing ---
    /// Sensor-poll / control loop interval (milliseconds).
    pub control_tick_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut classify_url = heapless::String::new();
        // Infallible: the literal is well under the 128-byte capacity.
        let _ = classify_url.push_str("https://sortbin-classifier.local:10000/classify");

        Self {
            // Detection
            debounce_interval_ms: 200,
            sensor_active_low: true,

            // Connectivity
            connect_timeout_ms: 5_000,
            connect_poll_interval_ms: 200,

            // Classifier
            classify_url,

            // Carousel: 1.25 ms/step ≈ 800 steps/s with an A4988 full-step.
            step_period_us: 1_250,
            settle_delay_ms: 100,
            home_bin: 0,

            // Gate: 14-bit duty @ 50 Hz → 1 count ≈ 1.22 µs of pulse width.
            gate_open_duty: 1_638,   // ~2.0 ms pulse
            gate_closed_duty: 819,   // ~1.0 ms pulse
            gate_dwell_ms: 900,

            // Timing
            control_tick_interval_ms: 50, // 20 Hz sensor polling
            telemetry_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Rejects rather than clamps: a bad value
    /// must never park the gate servo against its stop or zero out the
    /// debounce window.  Applied both when a config update arrives and
    /// again at the persistence boundary.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10..=5_000).contains(&self.debounce_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "debounce_interval_ms must be 10–5000",
            ));
        }
        // Capped below the task watchdog window; see drivers/watchdog.rs.
        if !(500..=15_000).contains(&self.connect_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "connect_timeout_ms must be 500–15000",
            ));
        }
        if self.connect_poll_interval_ms < 50
            || self.connect_poll_interval_ms > self.connect_timeout_ms
        {
            return Err(ConfigError::ValidationFailed(
                "connect_poll_interval_ms must be 50–connect_timeout_ms",
            ));
        }
        if !self.classify_url.starts_with("http") {
            return Err(ConfigError::ValidationFailed(
                "classify_url must be an http(s) URL",
            ));
        }
        if !(200..=20_000).contains(&self.step_period_us) {
            return Err(ConfigError::ValidationFailed(
                "step_period_us must be 200–20000",
            ));
        }
        if self.settle_delay_ms > 5_000 {
            return Err(ConfigError::ValidationFailed(
                "settle_delay_ms must be ≤ 5000",
            ));
        }
        if self.home_bin >= Category::COUNT {
            return Err(ConfigError::ValidationFailed(
                "home_bin must be a valid bin index",
            ));
        }
        // 400–2100 counts ≈ 0.5–2.5 ms pulse at 14-bit/50 Hz: the physical
        // range of the SG90. Anything outside stalls the servo against a stop.
        if !(400..=2_100).contains(&self.gate_open_duty) {
            return Err(ConfigError::ValidationFailed(
                "gate_open_duty must be 400–2100",
            ));
        }
        if !(400..=2_100).contains(&self.gate_closed_duty) {
            return Err(ConfigError::ValidationFailed(
                "gate_closed_duty must be 400–2100",
            ));
        }
        if self.gate_open_duty == self.gate_closed_duty {
            return Err(ConfigError::ValidationFailed(
                "gate open and closed positions must differ",
            ));
        }
        if !(100..=10_000).contains(&self.gate_dwell_ms) {
            return Err(ConfigError::ValidationFailed(
                "gate_dwell_ms must be 100–10000",
            ));
        }
        if !(10..=1_000).contains(&self.control_tick_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_tick_interval_ms must be 10–1000",
            ));
        }
        if !(5..=3_600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 5–3600",
            ));
        }
        Ok(())
    }
}
