//! Mock hardware adapters for integration tests.
//!
//! Scripted gyro samples, a manual clock, a verdict collector and an LED
//! recorder, so whole record/read/compare cycles run deterministically on
//! the host.

use std::sync::Arc;

use gesturekey::app::events::Verdict;
use gesturekey::app::ports::{Clock, Indicator, ResultSink, SampleSource};
use gesturekey::gesture::Sample;
use gesturekey::phase::{Phase, PhaseController};

// ── LEDs ──────────────────────────────────────────────────────

/// Records every indicator call in order.
#[derive(Default)]
pub struct MockLeds {
    pub shown: Vec<Phase>,
}

pub type Controller = PhaseController<MockLeds>;

pub fn controller(initial: Phase) -> Arc<Controller> {
    Arc::new(PhaseController::new(initial, MockLeds::default()))
}

impl Indicator for MockLeds {
    fn set_indicator(&mut self, phase: Phase) {
        self.shown.push(phase);
    }
}

// ── Gyro ──────────────────────────────────────────────────────

/// Plays back a fixed list of samples (then repeats the last one), and can
/// press the button after a given number of reads to end a capture.
pub struct ScriptedGyro {
    samples: Vec<Sample>,
    reads: usize,
    presses: Vec<usize>,
    phase: Option<Arc<Controller>>,
}

#[allow(dead_code)]
impl ScriptedGyro {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            reads: 0,
            presses: Vec::new(),
            phase: None,
        }
    }

    /// Press the button right after read number `after_read` (1-based,
    /// counted across the whole script).
    pub fn press_after(mut self, phase: &Arc<Controller>, after_read: usize) -> Self {
        self.presses.push(after_read);
        self.phase = Some(Arc::clone(phase));
        self
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl SampleSource for ScriptedGyro {
    fn read_angular_rate(&mut self) -> Sample {
        let sample = self
            .samples
            .get(self.reads)
            .or(self.samples.last())
            .copied()
            .unwrap_or_default();
        self.reads += 1;
        if self.presses.contains(&self.reads) {
            if let Some(phase) = &self.phase {
                phase.press();
            }
        }
        sample
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Time only moves when the code under test sleeps.
#[derive(Default)]
pub struct ManualClock {
    pub now: u64,
    pub sleeps: usize,
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
        self.sleeps += 1;
    }
}

// ── Result sink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CollectSink {
    pub verdicts: Vec<Verdict>,
}

impl ResultSink for CollectSink {
    fn report(&mut self, verdict: &Verdict) {
        self.verdicts.push(*verdict);
    }
}

// ── Waveforms ─────────────────────────────────────────────────

/// `n` points of a roll about X (one sinusoid period).
pub fn roll(n: usize, amplitude: f32) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let t = std::f32::consts::TAU * i as f32 / n as f32;
            Sample::new(amplitude * t.sin(), 0.0, 0.0)
        })
        .collect()
}

/// Each sample repeated `factor` times: the same gesture performed slower.
pub fn slowed(samples: &[Sample], factor: usize) -> Vec<Sample> {
    samples
        .iter()
        .flat_map(|s| std::iter::repeat_n(*s, factor))
        .collect()
}
