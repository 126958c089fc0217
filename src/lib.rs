//! SortBin firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod category;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod routing;

mod pins;

// The ESP-IDF-only implementations are guarded by cfg attributes inside;
// on the host these compile to their simulation backends.
pub mod adapters;
pub mod drivers;
