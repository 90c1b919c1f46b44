//! Unified error types for the GestureKey firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! main loop's error handling uniform.  All variants are `Copy` so they can
//! be passed between the sampling loop, the matcher and the service without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor read or register write failed.
    Sensor(SensorError),
    /// Gesture buffer or matcher failure.
    Gesture(GestureError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Gesture(e) => write!(f, "gesture: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C read (register or burst) returned an error.
    BusReadFailed,
    /// I2C register write returned an error.
    BusWriteFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusReadFailed => write!(f, "I2C read failed"),
            Self::BusWriteFailed => write!(f, "I2C write failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Gesture errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureError {
    /// `append` on a buffer already holding `N_max` samples.
    /// Recovered by the sampling loop: it seals early and stops.
    BufferFull,
    /// `at(index)` outside `[0, len)`.  A programming defect.
    IndexOutOfRange { index: usize, len: usize },
    /// DTW asked to compare an empty buffer.  Reported as "no gesture".
    InsufficientData,
    /// DTW asked to compare a buffer that is still being filled.
    NotSealed,
    /// `append` on a sealed buffer (it must be cleared first).
    Sealed,
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferFull => write!(f, "gesture buffer full"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "sample index {index} out of range (len {len})")
            }
            Self::InsufficientData => write!(f, "insufficient data for matching"),
            Self::NotSealed => write!(f, "gesture buffer not sealed"),
            Self::Sealed => write!(f, "gesture buffer is sealed"),
        }
    }
}

impl From<GestureError> for Error {
    fn from(e: GestureError) -> Self {
        Self::Gesture(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The serialized config could not be parsed.
    Parse,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config could not be parsed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
