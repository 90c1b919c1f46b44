//! Dynamic Time Warping matcher.
//!
//! Aligns a reference and a candidate gesture of possibly different length
//! and speed by minimising cumulative Euclidean distance over monotonic,
//! contiguous warping paths.
//!
//! ```text
//!  acc[0][0] = 0
//!  acc[i][0] = acc[0][j] = +inf                    (i, j > 0)
//!  acc[i][j] = d(ref[i-1], cand[j-1])
//!            + min(acc[i-1][j], acc[i][j-1], acc[i-1][j-1])
//!
//!  distance  = acc[m][n] / (m + n)
//! ```
//!
//! Only the previous row of the grid is ever read, so the matcher keeps two
//! rows sized to the shorter sequence: O(min(m, n)) memory.  The recurrence
//! is symmetric under transposition, so the longer sequence can always be
//! the outer loop without changing the result.

use log::debug;

use super::{GESTURE_CAPACITY, GestureBuffer, Sample};
use crate::error::GestureError;

/// Verdict plus the distance that produced it.  Consumed once by the
/// result sink and dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Path-length-normalized DTW distance (>= 0).
    pub distance: f32,
    /// `distance <= threshold`.
    pub is_similar: bool,
}

/// DTW matcher with reusable row storage.
pub struct DtwMatcher {
    threshold: f32,
    prev: Vec<f32>,
    curr: Vec<f32>,
}

impl DtwMatcher {
    /// Create a matcher with the given verdict threshold.  Row storage is
    /// reserved up front for buffers of [`GESTURE_CAPACITY`].
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            prev: Vec::with_capacity(GESTURE_CAPACITY + 1),
            curr: Vec::with_capacity(GESTURE_CAPACITY + 1),
        }
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Compare two sealed buffers.  An empty buffer is `InsufficientData`
    /// whether or not it is sealed.
    pub fn compare<const N: usize>(
        &mut self,
        reference: &GestureBuffer<N>,
        candidate: &GestureBuffer<N>,
    ) -> Result<MatchResult, GestureError> {
        if reference.is_empty() || candidate.is_empty() {
            return Err(GestureError::InsufficientData);
        }
        if !reference.is_sealed() || !candidate.is_sealed() {
            return Err(GestureError::NotSealed);
        }
        self.compare_samples(reference.as_slice(), candidate.as_slice())
    }

    /// Compare two raw sample sequences.
    pub fn compare_samples(
        &mut self,
        reference: &[Sample],
        candidate: &[Sample],
    ) -> Result<MatchResult, GestureError> {
        let distance = self.distance(reference, candidate)?;
        let is_similar = distance <= self.threshold;
        debug!(
            "dtw: m={} n={} distance={:.3} threshold={:.3} similar={}",
            reference.len(),
            candidate.len(),
            distance,
            self.threshold,
            is_similar
        );
        Ok(MatchResult {
            distance,
            is_similar,
        })
    }

    /// Normalized DTW distance: `acc[m][n] / (m + n)`.
    pub fn distance(&mut self, a: &[Sample], b: &[Sample]) -> Result<f32, GestureError> {
        if a.is_empty() || b.is_empty() {
            return Err(GestureError::InsufficientData);
        }
        let total = self.accumulated_cost(a, b);
        Ok(total / (a.len() + b.len()) as f32)
    }

    /// Un-normalized `acc[m][n]`.  Callers guarantee both slices are
    /// non-empty.
    fn accumulated_cost(&mut self, a: &[Sample], b: &[Sample]) -> f32 {
        // Longer sequence outer, shorter one sizes the rows.
        let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let width = inner.len() + 1;

        self.prev.clear();
        self.prev.resize(width, f32::INFINITY);
        self.prev[0] = 0.0;
        self.curr.clear();
        self.curr.resize(width, f32::INFINITY);

        for o in outer {
            self.curr[0] = f32::INFINITY;
            for (j, i) in inner.iter().enumerate() {
                let best = self.prev[j + 1].min(self.curr[j]).min(self.prev[j]);
                self.curr[j + 1] = o.distance(i) + best;
            }
            core::mem::swap(&mut self.prev, &mut self.curr);
        }

        self.prev[width - 1]
    }
}

/// One-shot convenience wrapper around [`DtwMatcher::distance`].
pub fn dtw_distance(a: &[Sample], b: &[Sample]) -> Result<f32, GestureError> {
    DtwMatcher::new(0.0).distance(a, b)
}

#[cfg(test)]
fn full_grid(a: &[Sample], b: &[Sample]) -> Vec<Vec<f32>> {
    let (m, n) = (a.len(), b.len());
    let mut acc = vec![vec![f32::INFINITY; n + 1]; m + 1];
    acc[0][0] = 0.0;
    for i in 1..=m {
        for j in 1..=n {
            let best = acc[i - 1][j].min(acc[i][j - 1]).min(acc[i - 1][j - 1]);
            acc[i][j] = a[i - 1].distance(&b[j - 1]) + best;
        }
    }
    acc
}
