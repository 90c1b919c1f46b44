//! Button edge ISR and the edge-relay worker.
//!
//! ## Hardware
//!
//! Momentary switch on [`BUTTON_GPIO`](crate::pins::BUTTON_GPIO).  The GPIO
//! interrupt fires on the press edge and calls [`button_isr_handler`],
//! which does exactly one thing: raise [`BUTTON_PENDING`].  No locks, no
//! phase logic, no buffers; O(1) and safe in interrupt context.
//!
//! ## Relay
//!
//! ```text
//!  ISR ──raise──▶ PendingSignal ──wait──▶ EdgeRelay ──press_if(line)──▶ PhaseController
//! ```
//!
//! The relay thread blocks on the pending signal, takes it, and offers one
//! press to the phase controller.  The line is re-read under the phase
//! lock; if it no longer reads "pressed" the edge was a bounce and is
//! absorbed.  Several edges raised before the relay wakes coalesce into a
//! single press.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::digital::InputPin;
use log::{debug, info};

use crate::app::ports::Indicator;
use crate::phase::{PhaseController, PressOutcome, Transition};

// ---------------------------------------------------------------------------
// Pending signal
// ---------------------------------------------------------------------------

/// Coalescing "pressed since last processed" flag, safe to raise from an
/// ISR (critical-section mutex, never a blocking lock).
pub struct PendingSignal {
    inner: Signal<CriticalSectionRawMutex, ()>,
}

impl PendingSignal {
    pub const fn new() -> Self {
        Self {
            inner: Signal::new(),
        }
    }

    /// Raise the signal.  Raising an already-raised signal is a no-op.
    pub fn raise(&self) {
        self.inner.signal(());
    }

    pub fn is_raised(&self) -> bool {
        self.inner.signaled()
    }

    /// Take the signal if raised.  Non-blocking.
    pub fn try_take(&self) -> bool {
        self.inner.try_take().is_some()
    }

    /// Block the calling thread until the signal is raised, then take it.
    pub fn wait(&self) {
        futures_lite::future::block_on(self.inner.wait());
    }
}

impl Default for PendingSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The one pending signal shared by the button ISR and the relay thread.
pub static BUTTON_PENDING: PendingSignal = PendingSignal::new();

/// ISR handler; register this on the button GPIO press edge.
/// Safe to call from interrupt context.
pub fn button_isr_handler() {
    BUTTON_PENDING.raise();
}

// ---------------------------------------------------------------------------
// Button line
// ---------------------------------------------------------------------------

/// Instantaneous level of the button line.
pub trait ButtonLine {
    fn is_pressed(&mut self) -> bool;
}

/// Button that pulls the line high when pressed.
pub struct ActiveHigh<P>(pub P);

// A failed read counts as "not pressed": the edge is absorbed.
impl<P: InputPin> ButtonLine for ActiveHigh<P> {
    fn is_pressed(&mut self) -> bool {
        self.0.is_high().unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Edge relay
// ---------------------------------------------------------------------------

/// Converts pending signals into phase transitions.  Never touches the
/// gesture buffers.
pub struct EdgeRelay<'a, L, I: Indicator> {
    line: L,
    pending: &'a PendingSignal,
    phase: &'a PhaseController<I>,
    absorbed: u64,
}

impl<'a, L: ButtonLine, I: Indicator> EdgeRelay<'a, L, I> {
    pub fn new(line: L, pending: &'a PendingSignal, phase: &'a PhaseController<I>) -> Self {
        Self {
            line,
            pending,
            phase,
            absorbed: 0,
        }
    }

    /// Take the pending signal if raised and process it.  Non-blocking.
    pub fn poll(&mut self) -> Option<Transition> {
        if self.pending.try_take() {
            self.process()
        } else {
            None
        }
    }

    /// Relay thread body.  Returns once `shutdown` is set and the signal is
    /// raised (to wake the blocked wait).
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!("Edge relay running");
        loop {
            self.pending.wait();
            if shutdown.load(Ordering::Acquire) {
                break;
            }
            self.process();
        }
        info!("Edge relay stopped ({} edges absorbed)", self.absorbed);
    }

    /// Edges that produced no transition (bounces and ignored presses).
    pub fn absorbed_count(&self) -> u64 {
        self.absorbed
    }

    fn process(&mut self) -> Option<Transition> {
        let line = &mut self.line;
        match self.phase.press_if(|| line.is_pressed()) {
            PressOutcome::Applied(t) => Some(t),
            PressOutcome::Bounced => {
                debug!("Button: edge without press level, absorbed");
                self.absorbed += 1;
                None
            }
            PressOutcome::Ignored(phase) => {
                debug!("Button: press ignored in {}", phase.name());
                self.absorbed += 1;
                None
            }
        }
    }
}
