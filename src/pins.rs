//! GPIO / peripheral pin assignments for the gesture key board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// Momentary push button, active HIGH with external pull-down.
/// The ISR fires on the rising edge.
pub const BUTTON_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Phase LEDs
// ---------------------------------------------------------------------------

/// Lit while the reference gesture is being recorded.
pub const LED_GREEN_GPIO: i32 = 4;
/// Lit while the candidate gesture is being read.
pub const LED_RED_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Gyroscope (L3GD20, I2C0)
// ---------------------------------------------------------------------------

pub const GYRO_SDA_GPIO: i32 = 8;
pub const GYRO_SCL_GPIO: i32 = 9;
/// SDO pulled high.
pub const GYRO_I2C_ADDR: u8 = 0x6B;
pub const GYRO_I2C_FREQ_HZ: u32 = 400_000;
