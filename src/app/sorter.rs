//! Sort sequence — the one place the machine physically moves.
//!
//! Strictly ordered and blocking: announce, rotate, settle, open, dwell,
//! close, record, announce.  The gate never opens while the carousel is in
//! motion, and the recorded position only advances after the move completes.

use crate::app::ports::{ActuatorPort, ClockPort, FeedbackPattern, FeedbackPort};
use crate::config::SystemConfig;
use crate::routing::BinIndex;
use log::info;

/// Execute the physical sort: rotate to `target` (by the pre-planned
/// `delta`) and cycle the gate.  `current_bin` is updated to `target` once
/// the move is done and before the completion feedback plays.
///
/// A zero `delta` (object belongs to the bin already in position) skips the
/// rotation and settle entirely; the gate still cycles.
pub fn run_sort_sequence(
    hw: &mut (impl ActuatorPort + FeedbackPort),
    clock: &impl ClockPort,
    config: &SystemConfig,
    delta: i16,
    target: BinIndex,
    current_bin: &mut BinIndex,
) {
    info!(
        "sorting: bin {} -> {} (delta {:+})",
        *current_bin, target, delta
    );
    hw.play(FeedbackPattern::SortStarted);

    if delta != 0 {
        hw.rotate_steps(delta);
        // Let the mechanism stop ringing before anything drops through it.
        clock.delay_ms(config.settle_delay_ms);
    }

    hw.set_gate(true);
    clock.delay_ms(config.gate_dwell_ms);
    hw.set_gate(false);

    *current_bin = target;
    hw.play(FeedbackPattern::SortComplete);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Records every actuator and feedback call in order.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Rotate(i16),
        Gate(bool),
        Play(FeedbackPattern),
        Delay(u32),
    }

    impl ActuatorPort for Recorder {
        fn rotate_steps(&mut self, delta: i16) {
            self.calls.push(Call::Rotate(delta));
        }

        fn set_gate(&mut self, open: bool) {
            self.calls.push(Call::Gate(open));
        }

        fn all_off(&mut self) {}
    }

    impl FeedbackPort for Recorder {
        fn play(&mut self, pattern: FeedbackPattern) {
            self.calls.push(Call::Play(pattern));
        }
    }

    /// Clock that appends its delays to a shared trace.
    struct TracingClock<'a> {
        now: Cell<u64>,
        trace: &'a Cell<Vec<Call>>,
    }

    impl ClockPort for TracingClock<'_> {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        fn delay_ms(&self, ms: u32) {
            self.now.set(self.now.get() + u64::from(ms));
            let mut t = self.trace.take();
            t.push(Call::Delay(ms));
            self.trace.set(t);
        }
    }

    fn run(delta: i16, target: BinIndex, current: BinIndex) -> (Vec<Call>, BinIndex) {
        let config = SystemConfig::default();
        let mut hw = Recorder::default();
        let trace = Cell::new(Vec::new());
        let clock = TracingClock { now: Cell::new(0), trace: &trace };
        let mut bin = current;

        run_sort_sequence(&mut hw, &clock, &config, delta, target, &mut bin);

        (hw.calls, bin)
    }

    #[test]
    fn full_sequence_order() {
        let (calls, bin) = run(-2, 3, 0);
        assert_eq!(
            calls,
            vec![
                Call::Play(FeedbackPattern::SortStarted),
                Call::Rotate(-2),
                Call::Gate(true),
                Call::Gate(false),
                Call::Play(FeedbackPattern::SortComplete),
            ]
        );
        assert_eq!(bin, 3);
    }

    #[test]
    fn zero_delta_skips_rotation_but_cycles_gate() {
        let (calls, bin) = run(0, 2, 2);
        assert_eq!(
            calls,
            vec![
                Call::Play(FeedbackPattern::SortStarted),
                Call::Gate(true),
                Call::Gate(false),
                Call::Play(FeedbackPattern::SortComplete),
            ]
        );
        assert_eq!(bin, 2);
    }

    #[test]
    fn gate_dwell_and_settle_use_configured_durations() {
        let config = SystemConfig::default();
        let mut hw = Recorder::default();
        let trace = Cell::new(Vec::new());
        let clock = TracingClock { now: Cell::new(0), trace: &trace };
        let mut bin = 4;

        run_sort_sequence(&mut hw, &clock, &config, 2, 1, &mut bin);

        let delays = trace.take();
        assert_eq!(
            delays,
            vec![
                Call::Delay(config.settle_delay_ms),
                Call::Delay(config.gate_dwell_ms),
            ]
        );
        assert_eq!(bin, 1);
    }
}
