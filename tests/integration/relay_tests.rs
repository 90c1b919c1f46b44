//! Integration tests for the ISR → PendingSignal → EdgeRelay thread path.
//!
//! These spawn real threads (scoped) and use short polling waits, so they
//! exercise the same lock and signal primitives the firmware uses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use gesturekey::adapters::sim::{SimButton, SimGyro};
use gesturekey::adapters::time::SystemClock;
use gesturekey::app::service::GestureService;
use gesturekey::config::GestureConfig;
use gesturekey::drivers::button::{BUTTON_PENDING, ButtonLine, EdgeRelay, PendingSignal};
use gesturekey::phase::Phase;

use super::mock_hw::{CollectSink, Controller, controller};

/// Fixed button level.
struct Held(bool);

impl ButtonLine for Held {
    fn is_pressed(&mut self) -> bool {
        self.0
    }
}

fn wait_for(pc: &Controller, phase: Phase) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while pc.current() != phase {
        assert!(Instant::now() < deadline, "timed out waiting for {:?}", phase);
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn stop_relay(pending: &PendingSignal, shutdown: &AtomicBool) {
    shutdown.store(true, Ordering::Release);
    pending.raise();
}

#[test]
fn relay_thread_applies_press() {
    let pending = PendingSignal::new();
    let pc = controller(Phase::Idle);
    let shutdown = AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| EdgeRelay::new(Held(true), &pending, &pc).run(&shutdown));
        pending.raise();
        wait_for(&pc, Phase::Recording);
        stop_relay(&pending, &shutdown);
    });

    assert_eq!(pc.transition_count(), 1);
}

#[test]
fn two_edges_before_wake_make_one_transition() {
    let pending = PendingSignal::new();
    let pc = controller(Phase::Recording);
    let shutdown = AtomicBool::new(false);

    // Both edges land before the relay thread exists.
    pending.raise();
    pending.raise();

    std::thread::scope(|s| {
        s.spawn(|| EdgeRelay::new(Held(true), &pending, &pc).run(&shutdown));
        wait_for(&pc, Phase::PostRecordIdle);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(pc.current(), Phase::PostRecordIdle);
        stop_relay(&pending, &shutdown);
    });

    assert_eq!(pc.transition_count(), 1);
}

#[test]
fn bounced_edge_is_absorbed_by_thread() {
    let pending = PendingSignal::new();
    let pc = controller(Phase::Idle);
    let shutdown = AtomicBool::new(false);

    let absorbed = std::thread::scope(|s| {
        let relay = s.spawn(|| {
            let mut relay = EdgeRelay::new(Held(false), &pending, &pc);
            relay.run(&shutdown);
            relay.absorbed_count()
        });
        pending.raise();
        let deadline = Instant::now() + Duration::from_secs(2);
        while pending.is_raised() {
            assert!(Instant::now() < deadline, "relay never took the signal");
            std::thread::sleep(Duration::from_millis(1));
        }
        stop_relay(&pending, &shutdown);
        relay.join().unwrap()
    });

    assert_eq!(absorbed, 1);
    assert_eq!(pc.current(), Phase::Idle);
    assert_eq!(pc.transition_count(), 0);
}

#[test]
fn concurrent_presses_are_serialized() {
    let pc = controller(Phase::Recording);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| pc.press());
        }
    });

    // Three presses walk to Comparing; the fourth is ignored there.
    assert_eq!(pc.current(), Phase::Comparing);
    assert_eq!(pc.transition_count(), 3);
    pc.with_indicator(|leds| {
        assert_eq!(
            leds.shown,
            vec![
                Phase::Recording,
                Phase::PostRecordIdle,
                Phase::Reading,
                Phase::Comparing,
            ]
        );
    });
}

/// The one test in this binary that uses the global ISR signal.
#[test]
fn isr_relay_and_main_loop_complete_a_cycle() {
    let pc = controller(Phase::BOOT);
    let shutdown = AtomicBool::new(false);
    let stop_loop = AtomicBool::new(false);
    let button = SimButton::new();
    let config = GestureConfig {
        sample_period_ms: 1,
        idle_poll_ms: 1,
        ..GestureConfig::default()
    };

    let verdicts = std::thread::scope(|s| {
        let line = button.clone();
        s.spawn(|| EdgeRelay::new(line, &BUTTON_PENDING, &pc).run(&shutdown));

        let main_loop = s.spawn(|| {
            let mut app = GestureService::new(config, std::sync::Arc::clone(&pc));
            let mut gyro = SimGyro::new(20, 100.0);
            let mut clock = SystemClock::new();
            let mut sink = CollectSink::default();
            while !stop_loop.load(Ordering::Acquire) {
                app.step(&mut gyro, &mut clock, &mut sink);
            }
            sink.verdicts
        });

        for next in [Phase::PostRecordIdle, Phase::Reading, Phase::Comparing] {
            std::thread::sleep(Duration::from_millis(20));
            button.press();
            if next != Phase::Comparing {
                wait_for(&pc, next);
            }
        }
        // The main loop hands Comparing back to Idle on its own.
        wait_for(&pc, Phase::Idle);

        stop_loop.store(true, Ordering::Release);
        stop_relay(&BUTTON_PENDING, &shutdown);
        main_loop.join().unwrap()
    });

    assert_eq!(verdicts.len(), 1);
    assert_eq!(pc.transition_count(), 4);
}
