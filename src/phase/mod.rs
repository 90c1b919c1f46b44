//! Gesture-capture phase controller.
//!
//! One tagged phase value behind one lock replaces a set of independently
//! locked flags, so no reader can ever observe an inconsistent
//! combination.  Transitions come from three places only:
//!
//! | Cause               | Caller          | Transition                    |
//! |---------------------|-----------------|-------------------------------|
//! | Validated press     | edge relay      | row `on_press` in [`table`]   |
//! | Comparison done     | main loop       | `Comparing → Idle`            |
//! | Inactivity timeout  | main loop       | capture phases `→ Idle`       |
//!
//! Every transition bumps a generation counter and drives the
//! [`Indicator`] exactly once while the lock is still held, so indicator
//! updates are totally ordered with the transitions that cause them.

pub mod table;

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use crate::app::ports::Indicator;
use crate::gesture::BufferRole;
use table::{LedPattern, PHASE_TABLE, PhaseDescriptor};

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// The closed set of capture/compare phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Recording = 1,
    PostRecordIdle = 2,
    Reading = 3,
    Comparing = 4,
}

impl Phase {
    /// Total number of phases, used to size the table array.
    pub const COUNT: usize = 5;

    /// Phase entered at power-on: the first press seals a reference
    /// recording rather than starting one.
    pub const BOOT: Self = Self::Recording;

    /// Convert an index back to `Phase`.  Out-of-range indices assert in
    /// debug builds and fall back to `Idle`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Recording,
            2 => Self::PostRecordIdle,
            3 => Self::Reading,
            4 => Self::Comparing,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Idle
            }
        }
    }

    pub fn descriptor(self) -> &'static PhaseDescriptor {
        &PHASE_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Phase reached by a validated button press, if presses count here.
    pub fn on_press(self) -> Option<Phase> {
        self.descriptor().on_press
    }

    /// Buffer filled while this phase is active.
    pub fn capture_role(self) -> Option<BufferRole> {
        self.descriptor().capture
    }

    pub fn leds(self) -> LedPattern {
        self.descriptor().leds
    }
}

// ---------------------------------------------------------------------------
// Transition records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    ButtonPress,
    ComparisonDone,
    InactivityTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub cause: TransitionCause,
}

/// Consistent view of the phase and how many transitions preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSnapshot {
    pub phase: Phase,
    /// Incremented on every transition; identifies one stay in a phase.
    pub generation: u64,
}

/// Result of offering a button press to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    Applied(Transition),
    /// Line did not read "pressed" under the lock: bounce, absorbed.
    Bounced,
    /// Press was genuine but the current phase ignores presses.
    Ignored(Phase),
}

// ---------------------------------------------------------------------------
// PhaseController
// ---------------------------------------------------------------------------

struct PhaseState<I> {
    phase: Phase,
    generation: u64,
    indicator: I,
}

/// Shared phase cell.  Written by the edge relay (presses) and by the main
/// loop (comparison done, inactivity); read by the main loop.
pub struct PhaseController<I: Indicator> {
    state: Mutex<PhaseState<I>>,
}

impl<I: Indicator> PhaseController<I> {
    /// Create the controller in `initial` and show its indicator pattern.
    pub fn new(initial: Phase, mut indicator: I) -> Self {
        info!("Phase controller starting in: {}", initial.name());
        indicator.set_indicator(initial);
        Self {
            state: Mutex::new(PhaseState {
                phase: initial,
                generation: 0,
                indicator,
            }),
        }
    }

    /// Current phase and generation, read under the lock.
    pub fn snapshot(&self) -> PhaseSnapshot {
        let state = self.lock();
        PhaseSnapshot {
            phase: state.phase,
            generation: state.generation,
        }
    }

    pub fn current(&self) -> Phase {
        self.lock().phase
    }

    /// Total transitions since construction.
    pub fn transition_count(&self) -> u64 {
        self.lock().generation
    }

    /// Apply a button press without re-validating the line.
    pub fn press(&self) -> PressOutcome {
        self.press_if(|| true)
    }

    /// Apply a button press if `line_pressed` (evaluated under the lock)
    /// confirms the button is still down.
    pub fn press_if(&self, line_pressed: impl FnOnce() -> bool) -> PressOutcome {
        let mut state = self.lock();
        if !line_pressed() {
            return PressOutcome::Bounced;
        }
        match state.phase.on_press() {
            Some(next) => {
                PressOutcome::Applied(Self::apply(&mut state, next, TransitionCause::ButtonPress))
            }
            None => PressOutcome::Ignored(state.phase),
        }
    }

    /// `Comparing → Idle` once the main loop has produced a verdict.
    /// No-op in any other phase.
    pub fn complete_comparison(&self) -> Option<Transition> {
        let mut state = self.lock();
        (state.phase == Phase::Comparing)
            .then(|| Self::apply(&mut state, Phase::Idle, TransitionCause::ComparisonDone))
    }

    /// Abandon an unfinished cycle (inactivity watchdog).  Only the
    /// press-driven waiting phases can be abandoned; `Idle` and `Comparing`
    /// are left alone.
    pub fn abandon_cycle(&self) -> Option<Transition> {
        let mut state = self.lock();
        matches!(
            state.phase,
            Phase::Recording | Phase::PostRecordIdle | Phase::Reading
        )
        .then(|| Self::apply(&mut state, Phase::Idle, TransitionCause::InactivityTimeout))
    }

    /// Borrow the indicator (diagnostics and tests).
    pub fn with_indicator<R>(&self, f: impl FnOnce(&I) -> R) -> R {
        f(&self.lock().indicator)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn apply(state: &mut PhaseState<I>, next: Phase, cause: TransitionCause) -> Transition {
        let from = state.phase;
        state.phase = next;
        state.generation += 1;
        state.indicator.set_indicator(next);
        info!("Phase transition: {} -> {} ({:?})", from.name(), next.name(), cause);
        Transition {
            from,
            to: next,
            cause,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PhaseState<I>> {
        // A panic while holding the lock cannot leave the phase half
        // written (single-field stores), so a poisoned lock is still valid.
        self.state.lock().unwrap_or_else(|e| {
            debug!("phase lock poisoned, recovering");
            PoisonError::into_inner(e)
        })
    }
}
