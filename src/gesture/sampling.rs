//! Sampling loop.
//!
//! Pulls one reading per period from the [`SampleSource`] into a buffer
//! until the caller's stop condition trips (phase over, deadline passed,
//! shutdown) or the buffer is full, then seals the buffer.  The stop condition is checked at the top of
//! each iteration only; a read in progress is never interrupted.

use log::{info, warn};

use super::{BufferRole, GestureBuffer};
use crate::app::ports::{Clock, SampleSource};
use crate::error::GestureError;

/// Summary of a finished capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub role: BufferRole,
    /// Samples held by the sealed buffer.
    pub samples: usize,
    /// Capture stopped because the buffer reached capacity.
    pub truncated: bool,
}

/// Clear `buffer`, fill it, seal it.
///
/// `keep_going` is polled with the clock's current time before every read;
/// the caller returns `false` once the capture should end.
pub fn capture<const N: usize>(
    role: BufferRole,
    buffer: &mut GestureBuffer<N>,
    source: &mut impl SampleSource,
    clock: &mut impl Clock,
    period_ms: u32,
    mut keep_going: impl FnMut(u64) -> bool,
) -> CaptureOutcome {
    buffer.clear();
    info!("Capture {:?}: started ({} ms period)", role, period_ms);

    let truncated = loop {
        if !keep_going(clock.now_ms()) {
            break false;
        }

        let sample = source.read_angular_rate();
        match buffer.append(sample) {
            Ok(()) => {}
            Err(GestureError::BufferFull) => {
                warn!("Capture {:?}: buffer full at {} samples, sealing early", role, N);
                break true;
            }
            Err(e) => {
                warn!("Capture {:?}: {}", role, e);
                break false;
            }
        }

        clock.sleep_ms(period_ms);
    };

    buffer.seal();
    info!("Capture {:?}: sealed with {} samples", role, buffer.len());

    CaptureOutcome {
        role,
        samples: buffer.len(),
        truncated,
    }
}
