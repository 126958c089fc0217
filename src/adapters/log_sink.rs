//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future MQTT or fleet-dashboard adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | bin={} | cycles={}/{} aborted | last_err={} | rssi={}",
                    t.state,
                    t.current_bin,
                    t.cycles_completed,
                    t.cycles_aborted,
                    t.last_error.map_or("none".into(), |e| e.to_string()),
                    t.wifi_rssi.map_or("n/a".into(), |r| format!("{}dBm", r)),
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::ObjectDetected => {
                info!("DETECT | object accepted");
            }
            AppEvent::CycleCompleted { category, bin, delta } => {
                info!(
                    "CYCLE | {} -> bin {} (delta {:+})",
                    category.label(),
                    bin,
                    delta
                );
            }
            AppEvent::CycleAborted(err) => {
                warn!("CYCLE | aborted: {}", err);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
