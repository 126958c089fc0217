//! Application service — orchestrates the detection FSM and the sort cycle.
//!
//! `AppService` owns the FSM and its context and nothing else.  Hardware,
//! network, time and persistence all arrive as port implementations on each
//! call, so the whole service runs under host tests with mocks.
//!
//! One tick = one sensor sample + one FSM step.  When the FSM lands in
//! Processing the service runs the entire blocking cycle inline
//! (guardian → classifier → sorter) and forces the machine back to Idle —
//! the loop is single-threaded and a cycle is never preempted.

use crate::adapters::wifi::ConnectivityPort;
use crate::app::classifier;
use crate::app::commands::AppCommand;
use crate::app::events::{AppEvent, TelemetryData};
use crate::app::guardian;
use crate::app::ports::{
    ActuatorPort, CameraPort, ClockPort, ConfigError, ConfigPort, EventSink, FeedbackPattern,
    FeedbackPort, HttpPort, SensorPort,
};
use crate::app::sorter;
use crate::category::Category;
use crate::config::SystemConfig;
use crate::error::CycleError;
use crate::fsm::context::SortContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::routing::{self, BinIndex};
use log::{info, warn};

/// A dirty config sits in RAM this long before the auto-save flushes it,
/// coalescing bursts of updates into one flash write.
const CONFIG_SAVE_DEBOUNCE_MS: u64 = 5_000;

/// The application service.
pub struct AppService {
    fsm: Fsm,
    ctx: SortContext,

    // Cycle counters for telemetry.
    cycles_completed: u32,
    cycles_aborted: u32,
    last_error: Option<CycleError>,

    // Config persistence bookkeeping.
    config_dirty: bool,
    dirty_since_ms: u64,
    save_requested: bool,
}

impl AppService {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: SortContext::new(config),
            cycles_completed: 0,
            cycles_aborted: 0,
            last_error: None,
            config_dirty: false,
            dirty_since_ms: 0,
            save_requested: false,
        }
    }

    /// Run the initial state's `on_enter` and announce startup.
    /// Call once before the first `tick()`.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
    }

    /// One control tick: sample the sensor, step the FSM, and run a full
    /// sort cycle inline if a detection was just accepted.
    ///
    /// Blocks for the duration of the cycle when one runs — worst case the
    /// connect timeout plus the transport timeout plus the mechanics.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort + FeedbackPort),
        conn: &mut impl ConnectivityPort,
        camera: &mut impl CameraPort,
        http: &mut impl HttpPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = clock.now_ms();
        self.ctx.object_present = hw.object_present();

        let before = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        let after = self.fsm.current_state();

        if after != before {
            sink.emit(&AppEvent::StateChanged { from: before, to: after });
        }

        if after == StateId::Processing {
            hw.play(FeedbackPattern::ObjectDetected);
            sink.emit(&AppEvent::ObjectDetected);

            self.run_cycle(hw, conn, camera, http, clock, sink);

            // The debounce window opens when the cycle ends, not when the
            // detection was accepted.
            self.ctx.last_accepted_ms = Some(clock.now_ms());
            self.fsm.force_transition(StateId::Idle, &mut self.ctx);
            sink.emit(&AppEvent::StateChanged {
                from: StateId::Processing,
                to: StateId::Idle,
            });
        }
    }

    /// Dispatch an imperative command.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_command(
        &mut self,
        command: AppCommand,
        hw: &mut (impl SensorPort + ActuatorPort + FeedbackPort),
        conn: &mut impl ConnectivityPort,
        camera: &mut impl CameraPort,
        http: &mut impl HttpPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        match command {
            AppCommand::TriggerSort => self.trigger_sort(hw, conn, camera, http, clock, sink),
            AppCommand::UpdateConfig(config) => {
                if let Err(e) = self.update_config(config) {
                    warn!("config update rejected: {}", e);
                }
            }
            AppCommand::SaveConfig => self.request_config_save(),
        }
    }

    /// Run one sort cycle as if the sensor had fired.  Ignored unless Idle.
    pub fn trigger_sort(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort + FeedbackPort),
        conn: &mut impl ConnectivityPort,
        camera: &mut impl CameraPort,
        http: &mut impl HttpPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        if self.fsm.current_state() != StateId::Idle {
            warn!("manual trigger ignored: machine is not Idle");
            return;
        }
        info!("manual sort trigger");

        self.ctx.now_ms = clock.now_ms();
        self.fsm.force_transition(StateId::Processing, &mut self.ctx);
        sink.emit(&AppEvent::StateChanged {
            from: StateId::Idle,
            to: StateId::Processing,
        });
        hw.play(FeedbackPattern::ObjectDetected);
        sink.emit(&AppEvent::ObjectDetected);

        self.run_cycle(hw, conn, camera, http, clock, sink);

        self.ctx.last_accepted_ms = Some(clock.now_ms());
        self.fsm.force_transition(StateId::Idle, &mut self.ctx);
        sink.emit(&AppEvent::StateChanged {
            from: StateId::Processing,
            to: StateId::Idle,
        });
    }

    /// Replace the running configuration; persisted later by the debounced
    /// auto-save.  An out-of-range config is rejected whole — the running
    /// config and the dirty flag are left untouched.
    pub fn update_config(&mut self, config: SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.ctx.config = config;
        self.config_dirty = true;
        self.dirty_since_ms = self.ctx.now_ms;
        info!("configuration updated (pending save)");
        Ok(())
    }

    /// Flush a dirty configuration on the next `auto_save_if_needed` call,
    /// skipping the debounce.
    pub fn request_config_save(&mut self) {
        if self.config_dirty {
            self.save_requested = true;
        }
    }

    /// Persist a dirty config once it has been stable for the debounce
    /// interval (or immediately when a save was requested).
    pub fn auto_save_if_needed(&mut self, store: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        let stable = self.ctx.now_ms.saturating_sub(self.dirty_since_ms) >= CONFIG_SAVE_DEBOUNCE_MS;
        if !(stable || self.save_requested) {
            return;
        }
        match store.save(&self.ctx.config) {
            Ok(()) => {
                self.config_dirty = false;
                self.save_requested = false;
                info!("configuration persisted");
            }
            Err(e @ ConfigError::ValidationFailed(_)) => {
                // A retry cannot succeed; drop the pending save instead of
                // re-attempting it on every loop iteration.
                warn!("config save rejected: {} — discarding pending save", e);
                self.config_dirty = false;
                self.save_requested = false;
            }
            Err(e) => warn!("config save failed: {}", e),
        }
    }

    /// Snapshot current health for the telemetry event.
    pub fn build_telemetry(&self, wifi_rssi: Option<i8>) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            current_bin: self.ctx.current_bin,
            cycles_completed: self.cycles_completed,
            cycles_aborted: self.cycles_aborted,
            last_error: self.last_error,
            wifi_rssi,
        }
    }

    /// Emit the periodic telemetry event.
    pub fn emit_telemetry(&self, wifi_rssi: Option<i8>, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Telemetry(self.build_telemetry(wifi_rssi)));
    }

    // -- Accessors --

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn current_bin(&self) -> BinIndex {
        self.ctx.current_bin
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// One full cycle: connectivity check, classify, physical sort.
    /// Any failure aborts with the carousel position untouched.
    fn run_cycle(
        &mut self,
        hw: &mut (impl ActuatorPort + FeedbackPort),
        conn: &mut impl ConnectivityPort,
        camera: &mut impl CameraPort,
        http: &mut impl HttpPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        if !guardian::ensure_connected(conn, hw, clock, &self.ctx.config) {
            self.abort_cycle(CycleError::ConnectivityTimeout, sink);
            return;
        }

        match classifier::classify(camera, http, self.ctx.config.classify_url.as_str()) {
            Ok(category) => {
                let target = routing::route_to(category);
                let delta = routing::plan_move(self.ctx.current_bin, target, Category::COUNT);
                sorter::run_sort_sequence(
                    hw,
                    clock,
                    &self.ctx.config,
                    delta,
                    target,
                    &mut self.ctx.current_bin,
                );

                self.cycles_completed += 1;
                self.last_error = None;
                info!(
                    "cycle complete: {} -> bin {} ({} total)",
                    category.label(),
                    target,
                    self.cycles_completed
                );
                sink.emit(&AppEvent::CycleCompleted { category, bin: target, delta });
            }
            Err(err) => self.abort_cycle(err, sink),
        }
    }

    fn abort_cycle(&mut self, err: CycleError, sink: &mut impl EventSink) {
        warn!("cycle aborted: {}", err);
        self.cycles_aborted += 1;
        self.last_error = Some(err);
        sink.emit(&AppEvent::CycleAborted(err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::ConfigError;
    use core::cell::Cell;

    struct CountingStore {
        saves: Cell<u32>,
    }

    impl ConfigPort for CountingStore {
        fn load(&self) -> Result<SystemConfig, ConfigError> {
            Ok(SystemConfig::default())
        }

        fn save(&self, _config: &SystemConfig) -> Result<(), ConfigError> {
            self.saves.set(self.saves.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn fresh_service_telemetry_is_zeroed() {
        let service = AppService::new(SystemConfig::default());
        let t = service.build_telemetry(Some(-60));
        assert_eq!(t.state, StateId::Idle);
        assert_eq!(t.current_bin, 0);
        assert_eq!(t.cycles_completed, 0);
        assert_eq!(t.cycles_aborted, 0);
        assert_eq!(t.last_error, None);
        assert_eq!(t.wifi_rssi, Some(-60));
    }

    #[test]
    fn current_bin_follows_home_config() {
        let mut config = SystemConfig::default();
        config.home_bin = 3;
        let service = AppService::new(config);
        assert_eq!(service.current_bin(), 3);
    }

    #[test]
    fn config_update_marks_dirty_and_debounces_saves() {
        let mut service = AppService::new(SystemConfig::default());
        let store = CountingStore { saves: Cell::new(0) };

        let mut config = SystemConfig::default();
        config.debounce_interval_ms = 250;
        service.update_config(config).unwrap();
        assert!(service.is_config_dirty());

        // Within the debounce window, with no explicit request: no write.
        service.auto_save_if_needed(&store);
        assert_eq!(store.saves.get(), 0);
        assert!(service.is_config_dirty());

        // An explicit request flushes immediately.
        service.request_config_save();
        service.auto_save_if_needed(&store);
        assert_eq!(store.saves.get(), 1);
        assert!(!service.is_config_dirty());

        // Nothing dirty, nothing written.
        service.auto_save_if_needed(&store);
        assert_eq!(store.saves.get(), 1);
    }

    #[test]
    fn invalid_update_is_rejected_and_never_retried() {
        let mut service = AppService::new(SystemConfig::default());
        let store = CountingStore { saves: Cell::new(0) };

        let mut bad = SystemConfig::default();
        bad.home_bin = 8;
        bad.debounce_interval_ms = 0;
        assert!(matches!(
            service.update_config(bad),
            Err(ConfigError::ValidationFailed(_))
        ));

        // The running config is untouched and nothing is pending, so the
        // auto-save never attempts a doomed write.
        assert_eq!(service.config().home_bin, SystemConfig::default().home_bin);
        assert_eq!(
            service.config().debounce_interval_ms,
            SystemConfig::default().debounce_interval_ms
        );
        assert!(!service.is_config_dirty());
        for _ in 0..10 {
            service.auto_save_if_needed(&store);
        }
        assert_eq!(store.saves.get(), 0);
    }

    #[test]
    fn rejected_save_discards_the_pending_config() {
        struct RejectingStore;

        impl ConfigPort for RejectingStore {
            fn load(&self) -> Result<SystemConfig, ConfigError> {
                Ok(SystemConfig::default())
            }

            fn save(&self, _config: &SystemConfig) -> Result<(), ConfigError> {
                Err(ConfigError::ValidationFailed("rejected"))
            }
        }

        let mut service = AppService::new(SystemConfig::default());
        let mut config = SystemConfig::default();
        config.gate_dwell_ms = 1_500;
        service.update_config(config).unwrap();
        service.request_config_save();

        service.auto_save_if_needed(&RejectingStore);
        assert!(!service.is_config_dirty(), "a doomed save must not linger");
        service.auto_save_if_needed(&RejectingStore);
    }

    #[test]
    fn save_request_without_dirty_config_is_inert() {
        let mut service = AppService::new(SystemConfig::default());
        let store = CountingStore { saves: Cell::new(0) };
        service.request_config_save();
        service.auto_save_if_needed(&store);
        assert_eq!(store.saves.get(), 0);
    }
}
