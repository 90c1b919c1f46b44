//! Integration tests for the PhaseController → GestureService pipeline.
//!
//! Presses are applied directly to the controller (or by the scripted gyro
//! mid-capture), and the service is stepped one main-loop iteration at a
//! time against mock adapters.

use gesturekey::app::events::Verdict;
use gesturekey::app::service::{GestureService, StepOutcome};
use gesturekey::config::GestureConfig;
use gesturekey::gesture::{BufferRole, GESTURE_CAPACITY, Sample};
use gesturekey::phase::{Phase, TransitionCause};

use super::mock_hw::{
    CollectSink, Controller, ManualClock, MockLeds, ScriptedGyro, controller, roll, slowed,
};

use std::sync::Arc;

fn make_service(pc: &Arc<Controller>, config: GestureConfig) -> GestureService<MockLeds> {
    GestureService::new(config, Arc::clone(pc))
}

fn captured(out: StepOutcome) -> (BufferRole, usize, bool) {
    match out {
        StepOutcome::Captured(c) => (c.role, c.samples, c.truncated),
        other => panic!("expected a capture, got {:?}", other),
    }
}

/// Drive one full cycle from `Recording`: the gyro ends the reference after
/// `reference.len()` reads, the test presses into `Reading`, and the gyro
/// ends the candidate after `candidate.len()` more reads.
fn run_cycle(reference: &[Sample], candidate: &[Sample]) -> (Arc<Controller>, CollectSink) {
    let pc = controller(Phase::BOOT);
    let mut script = reference.to_vec();
    script.extend_from_slice(candidate);
    let mut gyro = ScriptedGyro::new(script)
        .press_after(&pc, reference.len())
        .press_after(&pc, reference.len() + candidate.len());
    let mut app = make_service(&pc, GestureConfig::default());
    let mut clock = ManualClock::default();
    let mut sink = CollectSink::default();

    let (role, n, truncated) = captured(app.step(&mut gyro, &mut clock, &mut sink));
    assert_eq!((role, n, truncated), (BufferRole::Reference, reference.len(), false));
    assert_eq!(pc.current(), Phase::PostRecordIdle);

    assert_eq!(
        app.step(&mut gyro, &mut clock, &mut sink),
        StepOutcome::Waited(Phase::PostRecordIdle)
    );

    pc.press();
    let (role, n, _) = captured(app.step(&mut gyro, &mut clock, &mut sink));
    assert_eq!((role, n), (BufferRole::Candidate, candidate.len()));
    assert_eq!(pc.current(), Phase::Comparing);

    assert!(matches!(
        app.step(&mut gyro, &mut clock, &mut sink),
        StepOutcome::Compared(_)
    ));
    assert_eq!(pc.current(), Phase::Idle);
    assert_eq!(app.cycles(), 1);
    (pc, sink)
}

// ── Full cycles ───────────────────────────────────────────────

#[test]
fn slower_repeat_of_reference_matches() {
    let reference = roll(10, 100.0);
    let candidate = slowed(&reference, 2);
    let (pc, sink) = run_cycle(&reference, &candidate);

    assert_eq!(sink.verdicts.len(), 1);
    match sink.verdicts[0] {
        Verdict::Match(r) => assert!(r.distance < 1e-4, "distance {}", r.distance),
        other => panic!("expected a match, got {:?}", other),
    }

    pc.with_indicator(|leds| {
        assert_eq!(
            leds.shown,
            vec![
                Phase::Recording,
                Phase::PostRecordIdle,
                Phase::Reading,
                Phase::Comparing,
                Phase::Idle,
            ]
        );
    });
}

#[test]
fn different_gesture_does_not_match() {
    let reference = roll(10, 100.0);
    let candidate: Vec<Sample> = reference
        .iter()
        .map(|s| Sample::new(s.x, s.y + 200.0, s.z))
        .collect();
    let (_, sink) = run_cycle(&reference, &candidate);

    match sink.verdicts.as_slice() {
        [Verdict::NoMatch(r)] => assert!(r.distance > GestureConfig::default().match_threshold),
        other => panic!("expected one non-match, got {:?}", other),
    }
}

#[test]
fn pressing_through_reading_reports_no_gesture() {
    let reference = roll(8, 50.0);
    let (pc, mut sink) = run_cycle(&reference, &reference);
    assert!(sink.verdicts[0].is_match());

    // Second cycle: record a new reference, then press through Reading
    // before the main loop ever observes it.
    let mut gyro = ScriptedGyro::new(roll(8, 50.0)).press_after(&pc, 8);
    let mut app = make_service(&pc, GestureConfig::default());
    let mut clock = ManualClock::default();

    pc.press();
    let (role, n, _) = captured(app.step(&mut gyro, &mut clock, &mut sink));
    assert_eq!((role, n), (BufferRole::Reference, 8));
    pc.press();
    pc.press();
    assert_eq!(pc.current(), Phase::Comparing);

    assert_eq!(
        app.step(&mut gyro, &mut clock, &mut sink),
        StepOutcome::Compared(Verdict::NoGesture)
    );
    assert_eq!(pc.current(), Phase::Idle);
}

#[test]
fn stale_candidate_from_previous_cycle_is_not_reused() {
    let reference = roll(12, 80.0);
    let pc = controller(Phase::BOOT);
    let mut script = reference.clone();
    script.extend_from_slice(&reference);
    let mut gyro = ScriptedGyro::new(script)
        .press_after(&pc, 12)
        .press_after(&pc, 24)
        .press_after(&pc, 36);
    let mut app = make_service(&pc, GestureConfig::default());
    let mut clock = ManualClock::default();
    let mut sink = CollectSink::default();

    // Cycle 1 with one service instance: match.
    app.step(&mut gyro, &mut clock, &mut sink);
    pc.press();
    app.step(&mut gyro, &mut clock, &mut sink);
    app.step(&mut gyro, &mut clock, &mut sink);
    assert!(sink.verdicts[0].is_match());

    // Cycle 2: Idle → Recording, reference captured; then Reading and
    // Comparing are entered without the loop seeing Reading.
    pc.press();
    app.step(&mut gyro, &mut clock, &mut sink);
    assert_eq!(pc.current(), Phase::PostRecordIdle);
    pc.press();
    pc.press();
    app.step(&mut gyro, &mut clock, &mut sink);

    assert_eq!(sink.verdicts[1], Verdict::NoGesture);
    assert!(app.candidate().is_empty());
    assert!(app.candidate().is_sealed());
}

// ── Buffer limits ─────────────────────────────────────────────

#[test]
fn full_reference_seals_early_and_is_not_restarted() {
    let pc = controller(Phase::Recording);
    let mut gyro = ScriptedGyro::new(vec![Sample::new(1.0, 2.0, 3.0)]);
    let mut app = make_service(&pc, GestureConfig::default());
    let mut clock = ManualClock::default();
    let mut sink = CollectSink::default();

    let (role, n, truncated) = captured(app.step(&mut gyro, &mut clock, &mut sink));
    assert_eq!((role, n, truncated), (BufferRole::Reference, GESTURE_CAPACITY, true));
    assert!(app.reference().is_sealed());
    assert_eq!(gyro.reads(), GESTURE_CAPACITY + 1);

    // Still Recording: the loop waits for the press instead of re-capturing.
    assert_eq!(
        app.step(&mut gyro, &mut clock, &mut sink),
        StepOutcome::Waited(Phase::Recording)
    );
    assert_eq!(gyro.reads(), GESTURE_CAPACITY + 1);

    pc.press();
    assert_eq!(pc.current(), Phase::PostRecordIdle);
    assert_eq!(app.reference().len(), GESTURE_CAPACITY);
}

// ── Inactivity watchdog ───────────────────────────────────────

#[test]
fn watchdog_returns_abandoned_cycle_to_idle() {
    let config = GestureConfig {
        inactivity_timeout_secs: 1,
        ..GestureConfig::default()
    };
    let pc = controller(Phase::PostRecordIdle);
    let mut gyro = ScriptedGyro::new(Vec::new());
    let mut app = make_service(&pc, config);
    let mut clock = ManualClock::default();
    let mut sink = CollectSink::default();

    let abandoned = (0..500).find_map(|_| match app.step(&mut gyro, &mut clock, &mut sink) {
        StepOutcome::Abandoned(t) => Some(t),
        _ => None,
    });
    let t = abandoned.expect("watchdog never fired");
    assert_eq!((t.from, t.to), (Phase::PostRecordIdle, Phase::Idle));
    assert_eq!(t.cause, TransitionCause::InactivityTimeout);
    assert!(clock.now >= 1000);
    pc.with_indicator(|leds| assert_eq!(leds.shown.last(), Some(&Phase::Idle)));

    // Idle is never abandoned.
    for _ in 0..300 {
        assert_eq!(
            app.step(&mut gyro, &mut clock, &mut sink),
            StepOutcome::Waited(Phase::Idle)
        );
    }
    assert!(sink.verdicts.is_empty());
}

/// A capture phase left alone ends its capture at the deadline instead of
/// running until the buffer is full, and the next step abandons the cycle.
fn watchdog_cuts_capture_short(start: Phase) {
    let config = GestureConfig {
        inactivity_timeout_secs: 1,
        ..GestureConfig::default()
    };
    let pc = controller(start);
    let mut gyro = ScriptedGyro::new(roll(8, 50.0));
    let mut app = make_service(&pc, config);
    let mut clock = ManualClock::default();
    let mut sink = CollectSink::default();

    // 50 ms period: reads at 0, 50 .. 950 ms, deadline at 1000 ms.
    let (_, n, truncated) = captured(app.step(&mut gyro, &mut clock, &mut sink));
    assert_eq!((n, truncated), (20, false));
    assert_eq!(clock.now, 1000);
    assert_eq!(pc.current(), start);

    match app.step(&mut gyro, &mut clock, &mut sink) {
        StepOutcome::Abandoned(t) => {
            assert_eq!((t.from, t.to), (start, Phase::Idle));
            assert_eq!(t.cause, TransitionCause::InactivityTimeout);
        }
        other => panic!("expected the cycle to be abandoned, got {:?}", other),
    }
    assert_eq!(clock.now, 1000);
    assert_eq!(pc.current(), Phase::Idle);
    assert!(sink.verdicts.is_empty());
}

#[test]
fn watchdog_ends_abandoned_recording() {
    watchdog_cuts_capture_short(Phase::Recording);
}

#[test]
fn watchdog_ends_abandoned_reading() {
    watchdog_cuts_capture_short(Phase::Reading);
}

#[test]
fn watchdog_disabled_by_default() {
    let pc = controller(Phase::Reading);
    let mut gyro = ScriptedGyro::new(vec![Sample::default()]);
    let mut app = make_service(&pc, GestureConfig::default());
    let mut clock = ManualClock::default();
    let mut sink = CollectSink::default();

    // Candidate fills up, then the loop waits for a press indefinitely.
    captured(app.step(&mut gyro, &mut clock, &mut sink));
    for _ in 0..1000 {
        app.step(&mut gyro, &mut clock, &mut sink);
    }
    assert_eq!(pc.current(), Phase::Reading);
}
