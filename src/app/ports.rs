//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GestureService / PhaseController (domain)
//! ```
//!
//! Driven adapters (gyro, LEDs, result reporting, time) implement these
//! traits.  The domain core consumes them via generics, so it never
//! touches hardware directly.

use crate::gesture::Sample;
use crate::phase::Phase;

use super::events::Verdict;

// ───────────────────────────────────────────────────────────────
// Sample source (driven adapter: gyro → domain)
// ───────────────────────────────────────────────────────────────

/// Angular-rate sensor.  Called once per sampling tick.
///
/// Reads never fail from the domain's point of view: an adapter that hits
/// a bus error logs it and returns its best value.
pub trait SampleSource {
    fn read_angular_rate(&mut self) -> Sample;
}

// ───────────────────────────────────────────────────────────────
// Indicator (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Phase indication.  Called exactly once per phase transition (and once
/// at boot for the initial phase).
pub trait Indicator: Send {
    fn set_indicator(&mut self, phase: Phase);
}

// ───────────────────────────────────────────────────────────────
// Result sink (driven adapter: domain → user)
// ───────────────────────────────────────────────────────────────

/// Receives one verdict per completed `Comparing` phase.
pub trait ResultSink {
    fn report(&mut self, verdict: &Verdict);
}

// ───────────────────────────────────────────────────────────────
// Clock (driven adapter: domain ↔ RTOS tick)
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking delay for the main loop.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Block the calling thread for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}
