//! Application layer — hexagonal core of the SortBin firmware.
//!
//! Everything in here is hardware-agnostic: the service, the cycle stages
//! (guardian, classifier, sorter), and the port traits they speak through.

pub mod classifier;
pub mod commands;
pub mod events;
pub mod guardian;
pub mod ports;
pub mod service;
pub mod sorter;
