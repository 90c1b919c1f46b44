//! Application core: gesture cycle orchestration, zero I/O.
//!
//! The main-loop logic lives here: capture a reference, capture a
//! candidate, compare, report.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without a gyro, LEDs or a button.

pub mod events;
pub mod ports;
pub mod service;
