//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements               | Connects to                |
//! |-------------|--------------------------|----------------------------|
//! | `log_sink`  | ResultSink               | Serial log output          |
//! | `time`      | Clock                    | esp_timer / `Instant`      |
//! | `sim`       | SampleSource · Indicator | Host simulation            |
//! |             | ButtonLine               |                            |
//!
//! The board adapters (gyro, LEDs, button line) live in [`crate::drivers`].

pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod time;
