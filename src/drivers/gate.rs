//! Trapdoor gate servo driver (SG90 class, LEDC PWM).
//!
//! Two-position actuator: open or closed, nothing in between.  The duty
//! counts for each position come from configuration so a rebuilt mechanism
//! can be re-trimmed without reflashing defaults.

use crate::drivers::hw_init;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    Closed,
}

pub struct GateDriver {
    open_duty: u16,
    closed_duty: u16,
    state: GateState,
}

impl GateDriver {
    /// Create the driver and drive the servo to the closed position so the
    /// chute is never left open across a reboot.
    pub fn new(open_duty: u16, closed_duty: u16) -> Self {
        let mut driver = Self {
            open_duty,
            closed_duty,
            state: GateState::Open, // force the first set() through
        };
        driver.set(false);
        driver
    }

    /// Command the gate open (`true`) or closed (`false`).
    pub fn set(&mut self, open: bool) {
        let target = if open { GateState::Open } else { GateState::Closed };
        if self.state == target {
            return;
        }
        let duty = if open { self.open_duty } else { self.closed_duty };
        debug!("gate: {:?} (duty={})", target, duty);
        hw_init::ledc_set(hw_init::LEDC_CH_GATE, u32::from(duty));
        self.state = target;
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let gate = GateDriver::new(1_638, 819);
        assert_eq!(gate.state(), GateState::Closed);
    }

    #[test]
    fn open_close_cycle() {
        let mut gate = GateDriver::new(1_638, 819);
        gate.set(true);
        assert!(gate.is_open());
        gate.set(false);
        assert!(!gate.is_open());
    }

    #[test]
    fn redundant_commands_are_idempotent() {
        let mut gate = GateDriver::new(1_638, 819);
        gate.set(false);
        gate.set(false);
        assert_eq!(gate.state(), GateState::Closed);
        gate.set(true);
        gate.set(true);
        assert_eq!(gate.state(), GateState::Open);
    }
}
