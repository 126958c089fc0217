//! Connectivity guardian — the pre-flight check before any classification.
//!
//! The classifier endpoint is remote, so every sort cycle begins by proving
//! the link is up.  An already-connected link passes silently; a downed link
//! gets one bounded reconnect attempt (disconnect, connect, poll until the
//! deadline).  The outcome is announced on the buzzer either way, and a
//! failure aborts the cycle before the camera is ever touched.

use crate::adapters::wifi::ConnectivityPort;
use crate::app::ports::{ClockPort, FeedbackPattern, FeedbackPort};
use crate::config::SystemConfig;
use log::{info, warn};

/// Ensure the network link is up, reconnecting if needed.
///
/// Returns `true` once the link is confirmed.  Blocks for at most
/// `config.connect_timeout_ms` in the reconnect path; the happy path
/// (already connected) performs no waits and no feedback.
pub fn ensure_connected(
    conn: &mut impl ConnectivityPort,
    feedback: &mut impl FeedbackPort,
    clock: &impl ClockPort,
    config: &SystemConfig,
) -> bool {
    if conn.is_connected() {
        return true;
    }

    info!("link down ahead of classification, reconnecting");

    // Tear down whatever half-state the link is in before retrying.
    let _ = conn.disconnect();

    if let Err(e) = conn.connect() {
        warn!("reconnect attempt rejected: {}", e);
        feedback.play(FeedbackPattern::ConnectFailed);
        return false;
    }

    let deadline = clock.now_ms() + u64::from(config.connect_timeout_ms);
    loop {
        conn.poll();

        if conn.is_connected() {
            info!("link re-established");
            feedback.play(FeedbackPattern::Connected);
            return true;
        }

        if clock.now_ms() >= deadline {
            break;
        }
        clock.delay_ms(config.connect_poll_interval_ms);
    }

    warn!(
        "link not re-established within {}ms",
        config.connect_timeout_ms
    );
    feedback.play(FeedbackPattern::ConnectFailed);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::wifi::ConnectivityError;
    use core::cell::Cell;

    /// Link that comes up after a fixed number of polls (`None` = never).
    struct ScriptedLink {
        up_after_polls: Option<u32>,
        polls: u32,
        started: bool,
        connect_calls: u32,
        disconnect_calls: u32,
        reject_connect: bool,
    }

    impl ScriptedLink {
        fn new(up_after_polls: Option<u32>) -> Self {
            Self {
                up_after_polls,
                polls: 0,
                started: false,
                connect_calls: 0,
                disconnect_calls: 0,
                reject_connect: false,
            }
        }

        fn already_up() -> Self {
            let mut link = Self::new(Some(0));
            link.started = true;
            link
        }
    }

    impl ConnectivityPort for ScriptedLink {
        fn set_credentials(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
            Ok(())
        }

        fn connect(&mut self) -> Result<(), ConnectivityError> {
            self.connect_calls += 1;
            if self.reject_connect {
                return Err(ConnectivityError::NoCredentials);
            }
            self.started = true;
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), ConnectivityError> {
            self.disconnect_calls += 1;
            self.started = false;
            self.polls = 0;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.started && self.up_after_polls.is_some_and(|n| self.polls >= n)
        }

        fn poll(&mut self) {
            self.polls += 1;
        }

        fn rssi(&self) -> Option<i8> {
            self.is_connected().then_some(-55)
        }
    }

    struct FakeClock {
        now: Cell<u64>,
    }

    impl ClockPort for FakeClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        fn delay_ms(&self, ms: u32) {
            self.now.set(self.now.get() + u64::from(ms));
        }
    }

    #[derive(Default)]
    struct RecordingBuzzer {
        played: Vec<FeedbackPattern>,
    }

    impl FeedbackPort for RecordingBuzzer {
        fn play(&mut self, pattern: FeedbackPattern) {
            self.played.push(pattern);
        }
    }

    fn fake_clock() -> FakeClock {
        FakeClock { now: Cell::new(10_000) }
    }

    #[test]
    fn connected_link_passes_silently() {
        let mut link = ScriptedLink::already_up();
        let mut buzzer = RecordingBuzzer::default();
        let clock = fake_clock();

        assert!(ensure_connected(&mut link, &mut buzzer, &clock, &SystemConfig::default()));
        assert!(buzzer.played.is_empty(), "no feedback on the happy path");
        assert_eq!(link.connect_calls, 0);
    }

    #[test]
    fn downed_link_reconnects_and_signals_success() {
        let mut link = ScriptedLink::new(Some(3));
        let mut buzzer = RecordingBuzzer::default();
        let clock = fake_clock();

        assert!(ensure_connected(&mut link, &mut buzzer, &clock, &SystemConfig::default()));
        assert_eq!(link.disconnect_calls, 1);
        assert_eq!(link.connect_calls, 1);
        assert_eq!(buzzer.played, vec![FeedbackPattern::Connected]);
    }

    #[test]
    fn timeout_signals_failure_once() {
        let mut link = ScriptedLink::new(None);
        let mut buzzer = RecordingBuzzer::default();
        let clock = fake_clock();
        let config = SystemConfig::default();

        let start = clock.now_ms();
        assert!(!ensure_connected(&mut link, &mut buzzer, &clock, &config));
        assert_eq!(buzzer.played, vec![FeedbackPattern::ConnectFailed]);
        // The poll loop respects the configured deadline.
        let waited = clock.now_ms() - start;
        assert!(waited >= u64::from(config.connect_timeout_ms));
        assert!(waited < u64::from(config.connect_timeout_ms + config.connect_poll_interval_ms));
    }

    #[test]
    fn rejected_connect_fails_without_polling() {
        let mut link = ScriptedLink::new(Some(0));
        link.reject_connect = true;
        let mut buzzer = RecordingBuzzer::default();
        let clock = fake_clock();

        assert!(!ensure_connected(&mut link, &mut buzzer, &clock, &SystemConfig::default()));
        assert_eq!(link.polls, 0);
        assert_eq!(buzzer.played, vec![FeedbackPattern::ConnectFailed]);
    }
}
