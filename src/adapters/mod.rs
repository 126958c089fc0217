//! Adapters — implementations of the application ports.
//!
//! Each adapter is the only place a given piece of the outside world is
//! touched.  All of them are dual-target: real peripherals under
//! `target_os = "espidf"`, in-memory simulation everywhere else.

pub mod camera;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
