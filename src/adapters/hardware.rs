//! Hardware adapter — binds the mechanical ports to the board drivers.
//!
//! Implements [`SensorPort`], [`ActuatorPort`] and [`FeedbackPort`] over
//! the carousel, gate and buzzer drivers plus the raw IR input.  One struct
//! implements all three because the sort sequence needs the actuators and
//! the buzzer under a single borrow.

use crate::app::ports::{ActuatorPort, FeedbackPattern, FeedbackPort, SensorPort};
use crate::config::SystemConfig;
use crate::drivers::buzzer::BuzzerDriver;
use crate::drivers::carousel::CarouselDriver;
use crate::drivers::gate::GateDriver;
use crate::drivers::hw_init;
use crate::pins;

pub struct HardwareAdapter {
    sensor_active_low: bool,
    carousel: CarouselDriver,
    gate: GateDriver,
    buzzer: BuzzerDriver,
}

impl HardwareAdapter {
    /// Build the adapter from configuration. `hw_init::init_peripherals()`
    /// must already have run; `GateDriver::new` drives the servo closed.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            sensor_active_low: config.sensor_active_low,
            carousel: CarouselDriver::new(config.step_period_us),
            gate: GateDriver::new(config.gate_open_duty, config.gate_closed_duty),
            buzzer: BuzzerDriver::new(),
        }
    }

    pub fn carousel(&self) -> &CarouselDriver {
        &self.carousel
    }

    pub fn gate(&self) -> &GateDriver {
        &self.gate
    }
}

impl SensorPort for HardwareAdapter {
    fn object_present(&mut self) -> bool {
        let level = hw_init::gpio_read(pins::IR_SENSOR_GPIO);
        if self.sensor_active_low { !level } else { level }
    }
}

impl ActuatorPort for HardwareAdapter {
    fn rotate_steps(&mut self, delta: i16) {
        self.carousel.rotate_slots(delta);
    }

    fn set_gate(&mut self, open: bool) {
        self.gate.set(open);
    }

    fn all_off(&mut self) {
        self.gate.set(false);
        self.carousel.release();
        self.buzzer.off();
    }
}

impl FeedbackPort for HardwareAdapter {
    fn play(&mut self, pattern: FeedbackPattern) {
        self.buzzer.play(pattern);
    }
}
