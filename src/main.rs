//! GestureKey Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │  L3gd20 / SimGyro    LedIndicator / ConsoleLeds              │
//! │  (SampleSource)      (Indicator)                             │
//! │  LogResultSink       SystemClock                             │
//! │  (ResultSink)        (Clock)                                 │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────         │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │ GestureService (main loop)  ·  PhaseController      │      │
//! │  │ capture · DTW · verdict     ·  EdgeRelay (thread)   │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  button ISR ──▶ BUTTON_PENDING ──▶ edge-relay thread          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use log::{info, warn};

use gesturekey::adapters::log_sink::LogResultSink;
use gesturekey::adapters::time::SystemClock;
use gesturekey::app::ports::Indicator;
use gesturekey::app::service::GestureService;
use gesturekey::config::GestureConfig;
use gesturekey::drivers::button::{BUTTON_PENDING, ButtonLine, EdgeRelay};
use gesturekey::drivers::task_pin::{Core, spawn_on_core};
use gesturekey::phase::PhaseController;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap + logging ────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  GestureKey v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    info!(
        "Config: period={}ms threshold={:.1} watchdog={}s",
        config.sample_period_ms, config.match_threshold, config.inactivity_timeout_secs
    );

    #[cfg(target_os = "espidf")]
    return board::run(config);

    #[cfg(not(target_os = "espidf"))]
    sim::run(config)
}

/// Load `GESTUREKEY_CONFIG` (JSON) if set; defaults otherwise.
#[cfg(not(target_os = "espidf"))]
fn load_config() -> GestureConfig {
    let Ok(path) = std::env::var("GESTUREKEY_CONFIG") else {
        return GestureConfig::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| warn!("Config: cannot read {}: {}", path, e))
        .and_then(|text| {
            GestureConfig::from_json(&text).map_err(|e| warn!("Config: {} in {}", e, path))
        });
    match parsed {
        Ok(cfg) => {
            info!("Config loaded from {}", path);
            cfg
        }
        Err(()) => {
            warn!("Config: using defaults");
            GestureConfig::default()
        }
    }
}

#[cfg(target_os = "espidf")]
fn load_config() -> GestureConfig {
    GestureConfig::default()
}

/// Start the edge-relay thread.  It owns the button line and shares the
/// phase controller with the main loop.
fn spawn_relay<L, I>(
    config: &GestureConfig,
    line: L,
    phase: Arc<PhaseController<I>>,
    shutdown: Arc<AtomicBool>,
) -> Result<std::thread::JoinHandle<()>>
where
    L: ButtonLine + Send + 'static,
    I: Indicator + 'static,
{
    let handle = spawn_on_core(
        Core::App,
        config.relay_priority,
        config.relay_stack_kb,
        "edge-relay\0",
        move || {
            let mut relay = EdgeRelay::new(line, &BUTTON_PENDING, &phase);
            relay.run(&shutdown);
        },
    )?;
    Ok(handle)
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use super::*;

    use std::io::BufRead;

    use gesturekey::adapters::sim::{ConsoleLeds, SimButton, SimGyro};
    use gesturekey::phase::Phase;

    /// Roll period in samples (one second at the default cadence).
    const ROLL_PERIOD_TICKS: u32 = 20;
    const ROLL_AMPLITUDE_DPS: f32 = 120.0;

    pub fn run(config: GestureConfig) -> Result<()> {
        let phase = Arc::new(PhaseController::new(Phase::BOOT, ConsoleLeds::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let button = SimButton::new();
        let mut gyro = SimGyro::new(ROLL_PERIOD_TICKS, ROLL_AMPLITUDE_DPS);

        let relay = spawn_relay(&config, button.clone(), Arc::clone(&phase), Arc::clone(&shutdown))?;

        // stdin stands in for the physical button.
        let alternate = gyro.alternate_handle();
        let stop = Arc::clone(&shutdown);
        let _stdin = spawn_on_core(Core::Pro, 1, 8, "stdin-button\0", move || {
            info!("Enter = press, 's' + Enter = toggle roll/shake, 'q' + Enter = quit");
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match line.trim() {
                    "" => button.press(),
                    "s" => {
                        let shake = !alternate.fetch_xor(true, Ordering::Relaxed);
                        info!("Sim gyro: {}", if shake { "shake" } else { "roll" });
                    }
                    "q" => break,
                    other => warn!("Unknown input '{}'", other),
                }
            }
            stop.store(true, Ordering::Release);
        })?;

        // Quitting mid-capture must not wait for the buffer to fill.
        let mut service =
            GestureService::new(config, Arc::clone(&phase)).with_shutdown(Arc::clone(&shutdown));
        let mut clock = SystemClock::new();
        let mut sink = LogResultSink::new();

        info!("System ready. Entering main loop.");
        while !shutdown.load(Ordering::Acquire) {
            service.step(&mut gyro, &mut clock, &mut sink);
        }

        // Wake the relay so it observes the shutdown flag.
        BUTTON_PENDING.raise();
        if relay.join().is_err() {
            warn!("Edge relay thread panicked");
        }

        let (matches, misses, empty) = sink.totals();
        info!(
            "Session: {} cycles ({} matched, {} not matched, {} empty), {} transitions",
            service.cycles(),
            matches,
            misses,
            empty,
            phase.transition_count()
        );
        Ok(())
    }
}

// ── Board ─────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod board {
    use super::*;

    use esp_idf_hal::gpio::{Gpio0, Input, InterruptType, PinDriver, Pull};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;

    use gesturekey::drivers::button::{ActiveHigh, button_isr_handler};
    use gesturekey::drivers::gyro::L3gd20;
    use gesturekey::drivers::indicator::LedIndicator;
    use gesturekey::phase::Phase;
    use gesturekey::pins;

    /// Zero-rate calibration samples taken at boot (board at rest).
    const GYRO_BIAS_SAMPLES: u16 = 50;

    /// The GPIO driver disables the interrupt after each edge; re-arm it
    /// every time the relay samples the line.
    struct RearmingButton(ActiveHigh<PinDriver<'static, Gpio0, Input>>);

    impl ButtonLine for RearmingButton {
        fn is_pressed(&mut self) -> bool {
            let pressed = self.0.is_pressed();
            if let Err(e) = self.0.0.enable_interrupt() {
                warn!("Button: re-arm failed: {}", e);
            }
            pressed
        }
    }

    pub fn run(config: GestureConfig) -> Result<()> {
        let p = Peripherals::take()?;

        // ── LEDs ──────────────────────────────────────────────
        let green = PinDriver::output(p.pins.gpio4)?;
        let red = PinDriver::output(p.pins.gpio5)?;
        let phase = Arc::new(PhaseController::new(
            Phase::BOOT,
            LedIndicator::new(green, red),
        ));

        // ── Gyro ──────────────────────────────────────────────
        let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::GYRO_I2C_FREQ_HZ));
        let i2c = I2cDriver::new(p.i2c0, p.pins.gpio8, p.pins.gpio9, &i2c_cfg)?;
        let mut gyro = L3gd20::new(i2c, pins::GYRO_I2C_ADDR)?;
        gyro.calibrate(GYRO_BIAS_SAMPLES)?;

        // ── Button ISR ────────────────────────────────────────
        let mut btn = PinDriver::input(p.pins.gpio0)?;
        btn.set_pull(Pull::Down)?;
        btn.set_interrupt_type(InterruptType::PosEdge)?;
        // SAFETY: the handler only raises an interrupt-safe signal.
        unsafe { btn.subscribe(button_isr_handler)? };
        btn.enable_interrupt()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let _relay = spawn_relay(
            &config,
            RearmingButton(ActiveHigh(btn)),
            Arc::clone(&phase),
            shutdown,
        )?;

        let mut service = GestureService::new(config, phase);
        let mut clock = SystemClock::new();
        let mut sink = LogResultSink::new();

        info!("System ready. Entering main loop.");
        loop {
            service.step(&mut gyro, &mut clock, &mut sink);
        }
    }
}
