//! Two-LED phase indicator.
//!
//! Green on [`LED_GREEN_GPIO`](crate::pins::LED_GREEN_GPIO) while the
//! reference is being recorded, red on
//! [`LED_RED_GPIO`](crate::pins::LED_RED_GPIO) while the candidate is being
//! read, both off otherwise.  The pattern comes straight from the phase
//! table; this driver only pushes it to the pins.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::Indicator;
use crate::phase::Phase;
use crate::phase::table::LedPattern;

pub struct LedIndicator<G, R> {
    green: G,
    red: R,
    current: LedPattern,
}

impl<G: OutputPin, R: OutputPin> LedIndicator<G, R> {
    /// Take both pins and drive them low.
    pub fn new(green: G, red: R) -> Self {
        let mut led = Self {
            green,
            red,
            current: LedPattern::OFF,
        };
        led.show(LedPattern::OFF);
        led
    }

    pub fn show(&mut self, pattern: LedPattern) {
        if let Err(e) = self.green.set_state(PinState::from(pattern.green)) {
            warn!("LED: green pin write failed: {:?}", e);
        }
        if let Err(e) = self.red.set_state(PinState::from(pattern.red)) {
            warn!("LED: red pin write failed: {:?}", e);
        }
        self.current = pattern;
    }

    pub fn current(&self) -> LedPattern {
        self.current
    }
}

impl<G, R> Indicator for LedIndicator<G, R>
where
    G: OutputPin + Send,
    R: OutputPin + Send,
{
    fn set_indicator(&mut self, phase: Phase) {
        self.show(phase.leds());
    }
}
