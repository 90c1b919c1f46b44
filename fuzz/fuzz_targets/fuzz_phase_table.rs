//! Fuzz target: phase controller
//!
//! Drives arbitrary press / bounce / comparison-done / abandon sequences
//! and verifies:
//! - No panics
//! - Every applied transition is a row of the phase table or one of the
//!   two loop-driven returns to Idle
//! - The indicator is called exactly once per transition
//!
//! cargo fuzz run fuzz_phase_table

#![no_main]

use gesturekey::app::ports::Indicator;
use gesturekey::phase::{Phase, PhaseController, PressOutcome, TransitionCause};
use libfuzzer_sys::fuzz_target;

struct CountingLeds(u64);

impl Indicator for CountingLeds {
    fn set_indicator(&mut self, _phase: Phase) {
        self.0 += 1;
    }
}

fuzz_target!(|data: &[u8]| {
    let initial = Phase::from_index(usize::from(data.first().copied().unwrap_or(1)) % Phase::COUNT);
    let pc = PhaseController::new(initial, CountingLeds(0));

    for byte in data.iter().skip(1) {
        let before = pc.current();
        let transition = match byte % 4 {
            0 => match pc.press() {
                PressOutcome::Applied(t) => Some(t),
                _ => None,
            },
            1 => {
                assert_eq!(pc.press_if(|| false), PressOutcome::Bounced);
                None
            }
            2 => pc.complete_comparison(),
            _ => pc.abandon_cycle(),
        };

        if let Some(t) = transition {
            assert_eq!(t.from, before);
            match t.cause {
                TransitionCause::ButtonPress => assert_eq!(Some(t.to), before.on_press()),
                TransitionCause::ComparisonDone => {
                    assert_eq!((t.from, t.to), (Phase::Comparing, Phase::Idle));
                }
                TransitionCause::InactivityTimeout => {
                    assert_eq!(t.to, Phase::Idle);
                    assert!(before.capture_role().is_some() || before == Phase::PostRecordIdle);
                }
            }
        } else {
            assert_eq!(pc.current(), before);
        }
    }

    let calls = pc.with_indicator(|leds| leds.0);
    assert_eq!(calls, pc.transition_count() + 1);
});
