//! GestureKey firmware library.
//!
//! Record a reference wrist gesture, read a candidate, and decide with
//! dynamic time warping whether they match.  Exposes the pure-logic
//! modules for integration testing; ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod gesture;
pub mod phase;
pub mod pins;
