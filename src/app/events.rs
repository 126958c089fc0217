//! Domain events emitted by the application service.
//!
//! Events flow out through the [`EventSink`](super::ports::EventSink) port;
//! today they land in the structured log, later they can fan out to MQTT or
//! a fleet dashboard without touching the domain.

use crate::category::Category;
use crate::error::CycleError;
use crate::fsm::StateId;
use crate::routing::BinIndex;

/// Snapshot of system health, emitted on the telemetry tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryData {
    /// Current FSM state.
    pub state: StateId,
    /// Bin currently aligned under the trapdoor.
    pub current_bin: BinIndex,
    /// Completed sort cycles since boot.
    pub cycles_completed: u32,
    /// Aborted sort cycles since boot.
    pub cycles_aborted: u32,
    /// The most recent abort reason, if the last cycle failed.
    pub last_error: Option<CycleError>,
    /// WiFi RSSI in dBm, if associated.
    pub wifi_rssi: Option<i8>,
}

/// Events produced by the domain core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Firmware finished initialisation and entered the given state.
    Started(StateId),
    /// The detection FSM changed state.
    StateChanged { from: StateId, to: StateId },
    /// A detection passed the debounce gate; a cycle is starting.
    ObjectDetected,
    /// A full sort cycle ran to completion.
    CycleCompleted {
        category: Category,
        bin: BinIndex,
        /// Signed rotation that was performed (bin positions).
        delta: i16,
    },
    /// A cycle was abandoned; the carousel did not move.
    CycleAborted(CycleError),
    /// Periodic health snapshot.
    Telemetry(TelemetryData),
}
