//! Outbound verdicts.
//!
//! The [`GestureService`](super::service::GestureService) reports one of
//! these through the [`ResultSink`](super::ports::ResultSink) port per
//! completed comparison.  It is not stored anywhere afterwards.

use crate::error::GestureError;
use crate::gesture::dtw::MatchResult;

/// Outcome of one compare cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Candidate matched the reference.
    Match(MatchResult),
    /// Candidate differs from the reference.
    NoMatch(MatchResult),
    /// One of the gestures held no samples.
    NoGesture,
}

impl Verdict {
    /// Fold a matcher result into a user-facing verdict.  Every matcher
    /// failure is reported as "no gesture"; none of them is fatal.
    pub fn from_comparison(result: Result<MatchResult, GestureError>) -> Self {
        match result {
            Ok(r) if r.is_similar => Self::Match(r),
            Ok(r) => Self::NoMatch(r),
            Err(_) => Self::NoGesture,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    /// DTW distance, when one was computed.
    pub fn distance(&self) -> Option<f32> {
        match self {
            Self::Match(r) | Self::NoMatch(r) => Some(r.distance),
            Self::NoGesture => None,
        }
    }
}
