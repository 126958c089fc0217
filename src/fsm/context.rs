//! Shared mutable context threaded through every FSM handler.
//!
//! `SortContext` is the single struct that state handlers read from and
//! write to: the latest sensor sample, monotonic time, the debounce record,
//! the carousel position, and configuration.  The carousel position is the
//! only long-lived mutable state in the whole firmware; it is written in
//! exactly one place (the sort sequence, after a completed move).

use crate::config::SystemConfig;
use crate::routing::BinIndex;

/// The shared context passed to every state handler function.
pub struct SortContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic time of the current tick (milliseconds since boot).
    /// Updated by the service before each FSM tick.
    pub now_ms: u64,
    /// When the previous detection was accepted; `None` before the first.
    /// Written by the service when a cycle completes.
    pub last_accepted_ms: Option<u64>,

    // -- Sensor data --
    /// Latest IR sensor sample (true = object present).
    pub object_present: bool,

    // -- Carousel --
    /// The bin currently aligned under the trapdoor.  Initialised to the
    /// configured home bin; assumed physically true at startup (no encoder
    /// confirms it — a documented reliability gap).
    pub current_bin: BinIndex,

    // -- Configuration --
    /// System configuration (tunable parameters).
    pub config: SystemConfig,
}

impl SortContext {
    /// Create a new context with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            ticks_in_state: 0,
            now_ms: 0,
            last_accepted_ms: None,
            object_present: false,
            current_bin: config.home_bin,
            config,
        }
    }

    /// Whether enough time has passed since the previous accepted detection
    /// for a new one to be honoured.  Always true before the first.
    pub fn debounce_elapsed(&self) -> bool {
        match self.last_accepted_ms {
            None => true,
            Some(t) => self.now_ms.saturating_sub(t) > u64::from(self.config.debounce_interval_ms),
        }
    }
}
