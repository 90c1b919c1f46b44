//! Host simulation adapters.
//!
//! Lets the full pipeline (ISR handler, edge relay, phase controller,
//! sampling, DTW) run on a development machine without the board:
//!
//! | Adapter         | Stands in for                         |
//! |-----------------|---------------------------------------|
//! | [`SimGyro`]     | L3GD20 over I2C                       |
//! | [`ConsoleLeds`] | green/red phase LEDs                  |
//! | [`SimButton`]   | button GPIO level + edge interrupt    |

use std::f32::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::info;

use crate::app::ports::{Indicator, SampleSource};
use crate::drivers::button::{ButtonLine, button_isr_handler};
use crate::gesture::Sample;
use crate::phase::Phase;
use crate::phase::table::LedPattern;

// ---------------------------------------------------------------------------
// Gyro
// ---------------------------------------------------------------------------

/// Scripted angular-rate source: a wrist roll (one sinusoid period about
/// X with a smaller Y component) plus a little noise.  When `alternate`
/// is set the waveform becomes a fast shake about Z, which should not
/// match a recorded roll.
pub struct SimGyro {
    tick: u32,
    period_ticks: u32,
    amplitude: f32,
    noise: f32,
    rng: u32,
    alternate: Arc<AtomicBool>,
}

impl SimGyro {
    pub fn new(period_ticks: u32, amplitude: f32) -> Self {
        Self {
            tick: 0,
            period_ticks: period_ticks.max(1),
            amplitude,
            noise: amplitude * 0.02,
            rng: 0x2545_F491,
            alternate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared switch between the roll and the shake waveform.
    pub fn alternate_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alternate)
    }

    /// xorshift32, mapped to `[-1, 1)`.
    fn jitter(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl SampleSource for SimGyro {
    fn read_angular_rate(&mut self) -> Sample {
        let phase = TAU * (self.tick % self.period_ticks) as f32 / self.period_ticks as f32;
        self.tick = self.tick.wrapping_add(1);

        let base = if self.alternate.load(Ordering::Relaxed) {
            Sample::new(0.0, 0.0, 2.0 * self.amplitude * (3.0 * phase).sin())
        } else {
            Sample::new(
                self.amplitude * phase.sin(),
                0.3 * self.amplitude * phase.cos(),
                0.0,
            )
        };
        Sample::new(
            base.x + self.noise * self.jitter(),
            base.y + self.noise * self.jitter(),
            base.z + self.noise * self.jitter(),
        )
    }
}

// ---------------------------------------------------------------------------
// LEDs
// ---------------------------------------------------------------------------

/// Indicator that logs the LED pattern instead of driving pins.
#[derive(Debug, Default)]
pub struct ConsoleLeds {
    current: LedPattern,
}

impl ConsoleLeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> LedPattern {
        self.current
    }
}

impl Indicator for ConsoleLeds {
    fn set_indicator(&mut self, phase: Phase) {
        let pattern = phase.leds();
        if pattern != self.current {
            info!(
                "LED | green={} red={} ({})",
                if pattern.green { "ON" } else { "off" },
                if pattern.red { "ON" } else { "off" },
                phase.name()
            );
        }
        self.current = pattern;
    }
}

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// Momentary button whose level is held until the relay samples it.
#[derive(Clone, Default)]
pub struct SimButton {
    level: Arc<AtomicBool>,
}

impl SimButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull the line high and fire the edge interrupt.
    pub fn press(&self) {
        self.level.store(true, Ordering::Release);
        button_isr_handler();
    }

    /// Fire the edge interrupt without a level (contact bounce).
    pub fn bounce(&self) {
        button_isr_handler();
    }
}

impl ButtonLine for SimButton {
    // Reading releases the button.
    fn is_pressed(&mut self) -> bool {
        self.level.swap(false, Ordering::AcqRel)
    }
}
