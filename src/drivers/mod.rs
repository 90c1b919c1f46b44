//! Peripheral drivers: button edge relay, phase LEDs, gyroscope, and
//! core-pinned thread spawning.

pub mod button;
pub mod gyro;
pub mod indicator;
pub mod task_pin;
