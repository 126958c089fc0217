//! Hardware drivers — dumb actuators and board bring-up.
//!
//! Drivers know pins and registers, never policy.  Policy (when to rotate,
//! how long the gate dwells) lives in the application layer and arrives
//! through the adapters.

pub mod buzzer;
pub mod carousel;
pub mod gate;
pub mod hw_init;
pub mod hw_timer;
pub mod watchdog;
