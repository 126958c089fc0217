//! End-to-end sort cycle tests.
//!
//! Drives the full application service (FSM + guardian + classifier +
//! sorter) through the port traits with mock adapters: a scripted sensor,
//! a recording actuator set, a canned classifier service and a fake clock
//! that advances instead of sleeping.

#![cfg(not(target_os = "espidf"))]

use std::cell::Cell;

use sortbin::adapters::wifi::{ConnectivityError, ConnectivityPort};
use sortbin::app::events::AppEvent;
use sortbin::app::ports::{
    ActuatorPort, CameraPort, CaptureError, ClockPort, EventSink, FeedbackPattern, FeedbackPort,
    HttpPort, HttpResponse, SensorPort, TransportError,
};
use sortbin::app::service::AppService;
use sortbin::category::Category;
use sortbin::config::SystemConfig;
use sortbin::error::CycleError;
use sortbin::fsm::StateId;

// ── Mock adapters ─────────────────────────────────────────────

#[derive(Default)]
struct MockHw {
    present: bool,
    rotations: Vec<i16>,
    gate_ops: Vec<bool>,
    feedback: Vec<FeedbackPattern>,
}

impl SensorPort for MockHw {
    fn object_present(&mut self) -> bool {
        self.present
    }
}

impl ActuatorPort for MockHw {
    fn rotate_steps(&mut self, delta: i16) {
        self.rotations.push(delta);
    }

    fn set_gate(&mut self, open: bool) {
        self.gate_ops.push(open);
    }

    fn all_off(&mut self) {}
}

impl FeedbackPort for MockHw {
    fn play(&mut self, pattern: FeedbackPattern) {
        self.feedback.push(pattern);
    }
}

struct MockLink {
    up: bool,
    /// Whether a connect() attempt brings the link up.
    comes_up: bool,
}

impl MockLink {
    fn up() -> Self {
        Self { up: true, comes_up: true }
    }

    fn down_forever() -> Self {
        Self { up: false, comes_up: false }
    }
}

impl ConnectivityPort for MockLink {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.comes_up {
            self.up = true;
        }
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), ConnectivityError> {
        self.up = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.up
    }

    fn poll(&mut self) {}

    fn set_credentials(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
        Ok(())
    }

    fn rssi(&self) -> Option<i8> {
        self.up.then_some(-50)
    }
}

struct MockCamera {
    result: Result<Vec<u8>, CaptureError>,
    captures: u32,
}

impl MockCamera {
    fn working() -> Self {
        Self { result: Ok(vec![0xFF, 0xD8, 0xFF, 0xD9]), captures: 0 }
    }
}

impl CameraPort for MockCamera {
    fn capture_jpeg(&mut self) -> Result<Vec<u8>, CaptureError> {
        self.captures += 1;
        self.result.clone()
    }
}

struct MockHttp {
    result: Result<(u16, Vec<u8>), TransportError>,
    requests: u32,
}

impl MockHttp {
    fn label(label: &str) -> Self {
        let body = format!(r#"{{"label": "{}"}}"#, label).into_bytes();
        Self { result: Ok((200, body)), requests: 0 }
    }

    fn raw(status: u16, body: &[u8]) -> Self {
        Self { result: Ok((status, body.to_vec())), requests: 0 }
    }
}

impl HttpPort for MockHttp {
    fn post(
        &mut self,
        _url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        assert_eq!(content_type, "image/jpeg");
        assert!(!body.is_empty());
        self.requests += 1;
        let (status, body) = self.result.clone()?;
        Ok(HttpResponse { status, body })
    }
}

struct FakeClock {
    now: Cell<u64>,
}

impl FakeClock {
    fn new() -> Self {
        Self { now: Cell::new(60_000) }
    }

    fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Helpers ───────────────────────────────────────────────────

struct World {
    app: AppService,
    hw: MockHw,
    link: MockLink,
    camera: MockCamera,
    http: MockHttp,
    clock: FakeClock,
    sink: RecordingSink,
}

impl World {
    fn new(config: SystemConfig, link: MockLink, http: MockHttp) -> Self {
        let mut world = Self {
            app: AppService::new(config),
            hw: MockHw::default(),
            link,
            camera: MockCamera::working(),
            http,
            clock: FakeClock::new(),
            sink: RecordingSink::default(),
        };
        world.app.start(&mut world.sink);
        world
    }

    fn tick(&mut self) {
        self.app.tick(
            &mut self.hw,
            &mut self.link,
            &mut self.camera,
            &mut self.http,
            &self.clock,
            &mut self.sink,
        );
    }

    /// Present an object and tick until the cycle has run (two ticks:
    /// Idle → Debouncing, then accept + cycle).
    fn detect_and_sort(&mut self) {
        self.hw.present = true;
        self.tick();
        self.tick();
        self.hw.present = false;
    }

    fn completed(&self) -> Option<(Category, u8, i16)> {
        self.sink.events.iter().find_map(|e| match e {
            AppEvent::CycleCompleted { category, bin, delta } => Some((*category, *bin, *delta)),
            _ => None,
        })
    }

    fn aborted(&self) -> Option<CycleError> {
        self.sink.events.iter().find_map(|e| match e {
            AppEvent::CycleAborted(err) => Some(*err),
            _ => None,
        })
    }
}

fn world_with_label(label: &str) -> World {
    World::new(SystemConfig::default(), MockLink::up(), MockHttp::label(label))
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn metal_from_home_takes_the_short_way_backwards() {
    let mut w = world_with_label("metal");
    w.detect_and_sort();

    // Bin 3 from bin 0: raw +3 wraps to -2.
    assert_eq!(w.hw.rotations, vec![-2]);
    assert_eq!(w.hw.gate_ops, vec![true, false]);
    assert_eq!(w.app.current_bin(), 3);
    assert_eq!(w.completed(), Some((Category::Metal, 3, -2)));
    assert_eq!(w.app.state(), StateId::Idle);
    assert_eq!(
        w.hw.feedback,
        vec![
            FeedbackPattern::ObjectDetected,
            FeedbackPattern::SortStarted,
            FeedbackPattern::SortComplete,
        ]
    );
}

#[test]
fn paper_from_last_bin_wraps_forwards() {
    let mut config = SystemConfig::default();
    config.home_bin = 4;
    let mut w = World::new(config, MockLink::up(), MockHttp::label("paper"));
    w.detect_and_sort();

    // Bin 1 from bin 4: raw -3 wraps to +2.
    assert_eq!(w.hw.rotations, vec![2]);
    assert_eq!(w.app.current_bin(), 1);
    assert_eq!(w.completed(), Some((Category::Paper, 1, 2)));
}

#[test]
fn matching_bin_skips_rotation_but_still_drops() {
    let mut config = SystemConfig::default();
    config.home_bin = 3;
    let mut w = World::new(config, MockLink::up(), MockHttp::label("metal"));
    w.detect_and_sort();

    assert!(w.hw.rotations.is_empty());
    assert_eq!(w.hw.gate_ops, vec![true, false]);
    assert_eq!(w.app.current_bin(), 3);
    assert_eq!(w.completed(), Some((Category::Metal, 3, 0)));
}

#[test]
fn numeric_label_routes_like_its_name() {
    let mut w = World::new(
        SystemConfig::default(),
        MockLink::up(),
        MockHttp::raw(200, br#"{"label": 4}"#),
    );
    w.detect_and_sort();
    assert_eq!(w.completed(), Some((Category::Glass, 4, -1)));
    assert_eq!(w.app.current_bin(), 4);
}

// ── Failure paths ─────────────────────────────────────────────

#[test]
fn dead_link_aborts_before_the_camera_is_touched() {
    let mut w = World::new(
        SystemConfig::default(),
        MockLink::down_forever(),
        MockHttp::label("metal"),
    );
    w.detect_and_sort();

    assert_eq!(w.camera.captures, 0);
    assert_eq!(w.http.requests, 0);
    assert!(w.hw.rotations.is_empty());
    assert!(w.hw.gate_ops.is_empty());
    assert_eq!(w.aborted(), Some(CycleError::ConnectivityTimeout));
    assert_eq!(w.app.current_bin(), 0);
    // Exactly one failure tone after the detection chirp.
    assert_eq!(
        w.hw.feedback,
        vec![FeedbackPattern::ObjectDetected, FeedbackPattern::ConnectFailed]
    );
    // The machine recovers to Idle and keeps running.
    assert_eq!(w.app.state(), StateId::Idle);
}

#[test]
fn downed_link_that_recovers_still_sorts() {
    let mut w = World::new(
        SystemConfig::default(),
        MockLink { up: false, comes_up: true },
        MockHttp::label("glass"),
    );
    w.detect_and_sort();

    assert_eq!(w.completed(), Some((Category::Glass, 4, -1)));
    assert!(w.hw.feedback.contains(&FeedbackPattern::Connected));
}

#[test]
fn capture_failure_aborts_without_a_request() {
    let mut w = world_with_label("metal");
    w.camera.result = Err(CaptureError::FrameFailed);
    w.detect_and_sort();

    assert_eq!(w.http.requests, 0);
    assert_eq!(w.aborted(), Some(CycleError::Capture));
    assert_eq!(w.app.current_bin(), 0);
}

#[test]
fn transport_failure_leaves_the_carousel_alone() {
    let mut w = World::new(
        SystemConfig::default(),
        MockLink::up(),
        MockHttp { result: Err(TransportError::Connect), requests: 0 },
    );
    w.detect_and_sort();

    assert_eq!(w.aborted(), Some(CycleError::Network));
    assert!(w.hw.rotations.is_empty());
    assert!(w.hw.gate_ops.is_empty());
    assert_eq!(w.app.current_bin(), 0);
}

#[test]
fn server_error_status_is_a_network_abort() {
    let mut w = World::new(
        SystemConfig::default(),
        MockLink::up(),
        MockHttp::raw(500, b"internal"),
    );
    w.detect_and_sort();
    assert_eq!(w.aborted(), Some(CycleError::Network));
}

#[test]
fn garbage_response_is_a_parse_abort() {
    let mut w = World::new(
        SystemConfig::default(),
        MockLink::up(),
        MockHttp::raw(200, b"<html>gateway timeout</html>"),
    );
    w.detect_and_sort();
    assert_eq!(w.aborted(), Some(CycleError::Parse));
    assert_eq!(w.app.current_bin(), 0);
}

#[test]
fn unknown_label_is_rejected_not_guessed() {
    let mut w = world_with_label("styrofoam");
    w.detect_and_sort();

    assert_eq!(w.aborted(), Some(CycleError::UnknownLabel));
    assert!(w.hw.rotations.is_empty());
    assert_eq!(w.app.current_bin(), 0);
}

#[test]
fn abort_counters_show_up_in_telemetry() {
    let mut w = world_with_label("styrofoam");
    w.detect_and_sort();

    let t = w.app.build_telemetry(None);
    assert_eq!(t.cycles_completed, 0);
    assert_eq!(t.cycles_aborted, 1);
    assert_eq!(t.last_error, Some(CycleError::UnknownLabel));
}

// ── Debounce across cycles ────────────────────────────────────

#[test]
fn lingering_object_does_not_retrigger_within_the_window() {
    let mut w = world_with_label("metal");
    w.detect_and_sort();
    assert_eq!(w.http.requests, 1);

    // Object still in the field right after the cycle: suppressed.
    w.hw.present = true;
    w.tick();
    w.tick();
    assert_eq!(w.http.requests, 1);
    assert_eq!(w.app.state(), StateId::Idle);

    // Once the window passes, the same presence is a fresh detection.
    w.clock.advance(u64::from(w.app.config().debounce_interval_ms) + 1);
    w.tick();
    w.tick();
    assert_eq!(w.http.requests, 2);
}

#[test]
fn second_object_after_the_window_sorts_from_the_new_position() {
    let mut w = world_with_label("metal");
    w.detect_and_sort();
    assert_eq!(w.app.current_bin(), 3);

    w.clock.advance(1_000);
    w.http = MockHttp::label("paper");
    w.detect_and_sort();

    // Bin 1 from bin 3: -2, not the from-home delta.
    assert_eq!(w.app.current_bin(), 1);
    let deltas: Vec<i16> = w
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CycleCompleted { delta, .. } => Some(*delta),
            _ => None,
        })
        .collect();
    assert_eq!(deltas, vec![-2, -2]);
}

// ── Manual trigger ────────────────────────────────────────────

#[test]
fn manual_trigger_runs_a_full_cycle() {
    let mut w = world_with_label("organic");
    w.app.trigger_sort(
        &mut w.hw,
        &mut w.link,
        &mut w.camera,
        &mut w.http,
        &w.clock,
        &mut w.sink,
    );

    assert_eq!(w.completed(), Some((Category::Organic, 2, 2)));
    assert_eq!(w.app.current_bin(), 2);
    assert_eq!(w.app.state(), StateId::Idle);
}
