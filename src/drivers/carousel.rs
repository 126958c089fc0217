//! Carousel stepper driver (A4988 step/dir interface).
//!
//! Converts signed bin-position deltas into motor step pulses.  The motor
//! is a standard 200-step NEMA17 driven full-step, so one bin slot on the
//! five-slot ring is 40 motor steps.
//!
//! Rotation is blocking and open-loop: there is no encoder, so the caller's
//! position bookkeeping is only as good as the mechanics.  The driver stays
//! energised after a move for holding torque while the gate cycles;
//! `release()` de-energises it.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real step/dir/enable GPIOs via hw_init helpers.
//! On host/test: tracks position in-memory only (pulse delays still run).

use crate::drivers::hw_init;
use crate::pins;
use log::debug;

/// Full steps per motor revolution (1.8° full-step).
const MOTOR_STEPS_PER_REV: u32 = 200;

/// Motor steps per bin slot on the five-slot ring.
pub const STEPS_PER_SLOT: u32 = MOTOR_STEPS_PER_REV / crate::category::Category::COUNT as u32;

pub struct CarouselDriver {
    /// Pulse period in microseconds (full high+low cycle).
    step_period_us: u32,
    energised: bool,
    /// Net motor steps since boot, signed. Diagnostic only.
    position_steps: i64,
}

impl CarouselDriver {
    pub fn new(step_period_us: u32) -> Self {
        Self {
            step_period_us,
            energised: false,
            position_steps: 0,
        }
    }

    /// Rotate by `delta` bin slots. Positive = clockwise. Blocks until the
    /// pulse train is complete.
    pub fn rotate_slots(&mut self, delta: i16) {
        if delta == 0 {
            return;
        }

        let clockwise = delta > 0;
        let motor_steps = u32::from(delta.unsigned_abs()) * STEPS_PER_SLOT;
        debug!(
            "carousel: {} slots {} ({} motor steps @ {}us)",
            delta.abs(),
            if clockwise { "cw" } else { "ccw" },
            motor_steps,
            self.step_period_us
        );

        hw_init::gpio_write(pins::DIR_GPIO, clockwise);
        self.energise();
        // A4988 needs the direction stable before the first step edge.
        hw_init::delay_us(10);

        let half = (self.step_period_us / 2).max(1);
        for _ in 0..motor_steps {
            hw_init::gpio_write(pins::STEP_GPIO, true);
            hw_init::delay_us(half);
            hw_init::gpio_write(pins::STEP_GPIO, false);
            hw_init::delay_us(half);
        }

        self.position_steps += if clockwise {
            i64::from(motor_steps)
        } else {
            -i64::from(motor_steps)
        };
    }

    /// Cut coil current. The carousel can be back-driven afterwards.
    pub fn release(&mut self) {
        hw_init::gpio_write(pins::STEPPER_EN_GPIO, true); // EN is active-low
        self.energised = false;
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }

    pub fn position_steps(&self) -> i64 {
        self.position_steps
    }

    fn energise(&mut self) {
        if !self.energised {
            hw_init::gpio_write(pins::STEPPER_EN_GPIO, false);
            self.energised = true;
        }
    }
}
