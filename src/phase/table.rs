//! Static phase table.
//!
//! One row per [`Phase`], indexed by `Phase as usize`.  Each row names the
//! phase, the phase a button press moves to, the buffer the main loop fills
//! while the phase is active, and the LED pattern shown on entry.
//!
//! ```text
//!  RECORDING ──press──▶ POST_RECORD_IDLE ──press──▶ READING
//!      ▲                                               │
//!    press                                           press
//!      │                                               ▼
//!    IDLE ◀─────────[comparison done]────────────── COMPARING
//! ```

use super::Phase;
use crate::gesture::BufferRole;

/// Two-LED pattern (green = recording, red = reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedPattern {
    pub green: bool,
    pub red: bool,
}

impl LedPattern {
    pub const OFF: Self = Self {
        green: false,
        red: false,
    };
}

/// Static descriptor for a single phase.
pub struct PhaseDescriptor {
    pub id: Phase,
    pub name: &'static str,
    /// Target of a validated button press; `None` = presses are ignored.
    pub on_press: Option<Phase>,
    /// Buffer the sampling loop fills while this phase is active.
    pub capture: Option<BufferRole>,
    /// Indicator output for this phase.
    pub leds: LedPattern,
}

/// The transition table.
pub static PHASE_TABLE: [PhaseDescriptor; Phase::COUNT] = [
    // Index 0 Idle
    PhaseDescriptor {
        id: Phase::Idle,
        name: "Idle",
        on_press: Some(Phase::Recording),
        capture: None,
        leds: LedPattern::OFF,
    },
    // Index 1 Recording
    PhaseDescriptor {
        id: Phase::Recording,
        name: "Recording",
        on_press: Some(Phase::PostRecordIdle),
        capture: Some(BufferRole::Reference),
        leds: LedPattern {
            green: true,
            red: false,
        },
    },
    // Index 2 PostRecordIdle
    PhaseDescriptor {
        id: Phase::PostRecordIdle,
        name: "PostRecordIdle",
        on_press: Some(Phase::Reading),
        capture: None,
        leds: LedPattern::OFF,
    },
    // Index 3 Reading
    PhaseDescriptor {
        id: Phase::Reading,
        name: "Reading",
        on_press: Some(Phase::Comparing),
        capture: Some(BufferRole::Candidate),
        leds: LedPattern {
            green: false,
            red: true,
        },
    },
    // Index 4 Comparing (left by the main loop, never by a press)
    PhaseDescriptor {
        id: Phase::Comparing,
        name: "Comparing",
        on_press: None,
        capture: None,
        leds: LedPattern::OFF,
    },
];
