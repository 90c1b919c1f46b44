//! Log-based result sink.
//!
//! Implements [`ResultSink`] by writing each verdict to the logger (UART /
//! USB-CDC on target, stderr on the host).  Keeps running totals so a
//! long session can be summarised.

use log::info;

use crate::app::events::Verdict;
use crate::app::ports::ResultSink;

#[derive(Debug, Default)]
pub struct LogResultSink {
    matches: u32,
    misses: u32,
    empty: u32,
}

impl LogResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(matches, misses, no-gesture)` reported so far.
    pub fn totals(&self) -> (u32, u32, u32) {
        (self.matches, self.misses, self.empty)
    }
}

impl ResultSink for LogResultSink {
    fn report(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Match(r) => {
                self.matches += 1;
                info!("RESULT | Gesture detected (distance={:.2})", r.distance);
            }
            Verdict::NoMatch(r) => {
                self.misses += 1;
                info!("RESULT | Gesture not detected (distance={:.2})", r.distance);
            }
            Verdict::NoGesture => {
                self.empty += 1;
                info!("RESULT | Gesture not detected (no samples captured)");
            }
        }
    }
}
