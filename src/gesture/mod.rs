//! Gesture capture primitives: samples, bounded buffers, the sampling loop
//! and the DTW matcher.
//!
//! ```text
//!  SampleSource ──▶ sampling::capture ──▶ GestureBuffer (reference | candidate)
//!                                              │ seal()
//!                                              ▼
//!                                       dtw::DtwMatcher ──▶ MatchResult
//! ```
//!
//! A [`GestureBuffer`] is written by exactly one party at a time: the
//! sampling loop while the phase is `Recording`/`Reading`, then it is
//! sealed and only read by the matcher.

pub mod dtw;
pub mod sampling;

use heapless::Vec;

use crate::error::GestureError;

/// Maximum samples per buffer (`N_max`).  10 s of motion at 20 Hz.
pub const GESTURE_CAPACITY: usize = 200;

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One angular-rate reading (deg/s about X, Y, Z).  The sequence index is
/// implicit: its position in the owning buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two readings.
    pub fn distance(&self, other: &Sample) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<(f32, f32, f32)> for Sample {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self { x, y, z }
    }
}

// ---------------------------------------------------------------------------
// Buffer role
// ---------------------------------------------------------------------------

/// Which of the two buffers a capture fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferRole {
    /// Written while `Recording`, kept across cycles until re-recorded.
    Reference,
    /// Written while `Reading`, overwritten every cycle.
    Candidate,
}

// ---------------------------------------------------------------------------
// GestureBuffer
// ---------------------------------------------------------------------------

/// Append-only, fixed-capacity sample sequence.
///
/// Invariants: `len() <= N`; a sealed buffer rejects `append` until
/// [`clear`](Self::clear) is called.
#[derive(Debug, Clone, Default)]
pub struct GestureBuffer<const N: usize = GESTURE_CAPACITY> {
    samples: Vec<Sample, N>,
    sealed: bool,
}

impl<const N: usize> GestureBuffer<N> {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
            sealed: false,
        }
    }

    /// Append one sample.  Fails with `BufferFull` at capacity and with
    /// `Sealed` once capture has been marked complete.
    pub fn append(&mut self, sample: Sample) -> Result<(), GestureError> {
        if self.sealed {
            return Err(GestureError::Sealed);
        }
        self.samples
            .push(sample)
            .map_err(|_| GestureError::BufferFull)
    }

    /// Drop all samples and unseal for reuse.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sealed = false;
    }

    /// Mark capture complete.  Idempotent.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.is_full()
    }

    /// Capacity (`N_max`).
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bounds-checked sample access.
    pub fn at(&self, index: usize) -> Result<Sample, GestureError> {
        self.samples
            .get(index)
            .copied()
            .ok_or(GestureError::IndexOutOfRange {
                index,
                len: self.samples.len(),
            })
    }

    /// All captured samples in order.
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}
