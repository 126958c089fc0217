//! Feedback buzzer driver (active piezo on a plain GPIO).
//!
//! Each [`FeedbackPattern`] maps to a fixed pulse schedule.  Playback is
//! blocking and runs on the control thread; the longest pattern
//! (connect-failed) is just over a second, which is acceptable because
//! feedback only plays at cycle milestones, never inside timing-critical
//! motion.

use crate::app::ports::FeedbackPattern;
use crate::drivers::hw_init;
use crate::pins;
use log::debug;

/// One buzzer pulse: drive high for `on_ms`, then stay silent for `gap_ms`
/// before the next pulse.  The final gap of a schedule is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub on_ms: u32,
    pub gap_ms: u32,
}

const fn p(on_ms: u32, gap_ms: u32) -> Pulse {
    Pulse { on_ms, gap_ms }
}

// Pattern vocabulary. Distinctness matters more than musicality: each
// schedule differs in count or cadence from every other so a user can tell
// them apart without looking.
static CONNECTED: [Pulse; 2] = [p(300, 150), p(150, 0)];
static CONNECT_FAILED: [Pulse; 3] = [p(200, 150), p(200, 150), p(200, 0)];
static OBJECT_DETECTED: [Pulse; 2] = [p(100, 50), p(100, 0)];
static SORT_STARTED: [Pulse; 1] = [p(300, 0)];
static SORT_COMPLETE: [Pulse; 3] = [p(80, 50), p(80, 50), p(80, 0)];

/// The pulse schedule for a pattern.
pub fn schedule(pattern: FeedbackPattern) -> &'static [Pulse] {
    match pattern {
        FeedbackPattern::Connected => &CONNECTED,
        FeedbackPattern::ConnectFailed => &CONNECT_FAILED,
        FeedbackPattern::ObjectDetected => &OBJECT_DETECTED,
        FeedbackPattern::SortStarted => &SORT_STARTED,
        FeedbackPattern::SortComplete => &SORT_COMPLETE,
    }
}

pub struct BuzzerDriver;

impl BuzzerDriver {
    pub fn new() -> Self {
        Self
    }

    /// Play a pattern to completion. Blocks for the schedule's duration.
    pub fn play(&mut self, pattern: FeedbackPattern) {
        debug!("buzzer: {:?}", pattern);
        for pulse in schedule(pattern) {
            hw_init::gpio_write(pins::BUZZER_GPIO, true);
            hw_init::delay_ms(pulse.on_ms);
            hw_init::gpio_write(pins::BUZZER_GPIO, false);
            if pulse.gap_ms > 0 {
                hw_init::delay_ms(pulse.gap_ms);
            }
        }
    }

    /// Force the output low (used by the all-off path).
    pub fn off(&mut self) {
        hw_init::gpio_write(pins::BUZZER_GPIO, false);
    }
}

impl Default for BuzzerDriver {
    fn default() -> Self {
        Self::new()
    }
}
