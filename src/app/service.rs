//! Application service: the main-loop core.
//!
//! [`GestureService`] owns both gesture buffers and the DTW matcher, and
//! shares the [`PhaseController`] with the edge relay thread.  Each call to
//! [`step`](GestureService::step) is one main-loop iteration: read the
//! phase under its lock, then capture, compare, or wait.
//!
//! ```text
//!  SampleSource ──▶ ┌──────────────────────────┐ ──▶ ResultSink
//!                   │      GestureService       │
//!         Clock ◀──▶│ buffers · DTW · watchdog  │
//!                   └────────────┬─────────────┘
//!                                │ snapshot / complete_comparison
//!                         PhaseController ◀── EdgeRelay (press)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::config::GestureConfig;
use crate::gesture::dtw::DtwMatcher;
use crate::gesture::sampling::{self, CaptureOutcome};
use crate::gesture::{BufferRole, GestureBuffer};
use crate::phase::{Phase, PhaseController, Transition};

use super::events::Verdict;
use super::ports::{Clock, Indicator, ResultSink, SampleSource};

/// Transitions between the `Recording` stay and the `Comparing` stay of
/// one cycle (Recording, PostRecordIdle, Reading, Comparing).
const REFERENCE_LAG: u64 = 3;
/// Transitions between the `Reading` stay and the `Comparing` stay.
const CANDIDATE_LAG: u64 = 1;

/// What one main-loop iteration did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// A capture ran to completion and its buffer is sealed.
    Captured(CaptureOutcome),
    /// A comparison finished and was reported.
    Compared(Verdict),
    /// The inactivity watchdog sent the cycle back to Idle.
    Abandoned(Transition),
    /// Nothing to do in this phase; slept for `idle_poll_ms`.
    Waited(Phase),
}

// ───────────────────────────────────────────────────────────────
// GestureService
// ───────────────────────────────────────────────────────────────

pub struct GestureService<I: Indicator> {
    phase: Arc<PhaseController<I>>,
    config: GestureConfig,
    matcher: DtwMatcher,
    reference: GestureBuffer,
    candidate: GestureBuffer,
    /// Generation of the phase stay each buffer was captured in.  One
    /// capture per stay; a buffer from an older stay is stale.
    reference_generation: Option<u64>,
    candidate_generation: Option<u64>,
    /// Generation last observed, and when it was first seen.
    seen_generation: Option<u64>,
    phase_seen_at_ms: u64,
    /// Set by the host binary to end a capture early on quit.
    shutdown: Option<Arc<AtomicBool>>,
    cycles: u64,
}

impl<I: Indicator> GestureService<I> {
    pub fn new(config: GestureConfig, phase: Arc<PhaseController<I>>) -> Self {
        let matcher = DtwMatcher::new(config.match_threshold);
        Self {
            phase,
            config,
            matcher,
            reference: GestureBuffer::new(),
            candidate: GestureBuffer::new(),
            reference_generation: None,
            candidate_generation: None,
            seen_generation: None,
            phase_seen_at_ms: 0,
            shutdown: None,
            cycles: 0,
        }
    }

    /// Stop any running capture as soon as `flag` is set.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one main-loop iteration.
    pub fn step(
        &mut self,
        source: &mut impl SampleSource,
        clock: &mut impl Clock,
        sink: &mut impl ResultSink,
    ) -> StepOutcome {
        let snap = self.phase.snapshot();
        if self.seen_generation != Some(snap.generation) {
            self.seen_generation = Some(snap.generation);
            self.phase_seen_at_ms = clock.now_ms();
        }

        // 1. Capture phases: fill the phase's buffer once per stay.  The
        //    capture also ends at the watchdog deadline so step 3 can
        //    abandon the cycle on the next iteration.
        if let Some(role) = snap.phase.capture_role() {
            let deadline = self
                .config
                .inactivity_timeout_ms()
                .map(|t| self.phase_seen_at_ms.saturating_add(t));
            let shutdown = self.shutdown.as_deref();
            let (buffer, captured_in) = match role {
                BufferRole::Reference => (&mut self.reference, &mut self.reference_generation),
                BufferRole::Candidate => (&mut self.candidate, &mut self.candidate_generation),
            };
            if *captured_in != Some(snap.generation) {
                *captured_in = Some(snap.generation);
                let phase = Arc::clone(&self.phase);
                let outcome = sampling::capture(
                    role,
                    buffer,
                    source,
                    clock,
                    self.config.sample_period_ms,
                    |now_ms| {
                        phase.snapshot().generation == snap.generation
                            && deadline.is_none_or(|d| now_ms < d)
                            && !shutdown.is_some_and(|s| s.load(Ordering::Acquire))
                    },
                );
                return StepOutcome::Captured(outcome);
            }
        }

        // 2. Compare, report, hand the phase back to Idle.
        if snap.phase == Phase::Comparing {
            let verdict = self.compare(snap.generation);
            sink.report(&verdict);
            self.cycles += 1;
            if self.phase.complete_comparison().is_none() {
                warn!("Comparing phase left before the verdict was reported");
            }
            return StepOutcome::Compared(verdict);
        }

        // 3. Optional inactivity watchdog.
        if let Some(timeout_ms) = self.config.inactivity_timeout_ms() {
            let waited = clock.now_ms().saturating_sub(self.phase_seen_at_ms);
            if waited >= timeout_ms {
                if let Some(t) = self.phase.abandon_cycle() {
                    warn!(
                        "No press for {} s in {}, returning to Idle",
                        waited / 1000,
                        t.from.name()
                    );
                    return StepOutcome::Abandoned(t);
                }
            }
        }

        clock.sleep_ms(self.config.idle_poll_ms);
        StepOutcome::Waited(snap.phase)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    pub fn reference(&self) -> &GestureBuffer {
        &self.reference
    }

    pub fn candidate(&self) -> &GestureBuffer {
        &self.candidate
    }

    /// Completed compare cycles since boot.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the live configuration.  The caller validates first.
    pub fn update_config(&mut self, config: GestureConfig) {
        self.matcher.set_threshold(config.match_threshold);
        self.config = config;
        info!("Configuration updated at runtime");
    }

    // ── Internal ──────────────────────────────────────────────

    fn compare(&mut self, generation: u64) -> Verdict {
        // A capture phase pressed through before this loop observed it
        // never ran; whatever its buffer holds belongs to an earlier cycle.
        if self.reference_generation != generation.checked_sub(REFERENCE_LAG) {
            debug!("Reference not captured this cycle, discarding");
            self.reference.clear();
            self.reference.seal();
        }
        if self.candidate_generation != generation.checked_sub(CANDIDATE_LAG) {
            debug!("Candidate not captured this cycle, discarding");
            self.candidate.clear();
            self.candidate.seal();
        }

        let result = self.matcher.compare(&self.reference, &self.candidate);
        if let Err(e) = result {
            info!("Comparison skipped: {}", e);
        }
        Verdict::from_comparison(result)
    }
}
