//! System configuration parameters
//!
//! All tunable parameters for the GestureKey system.  The match threshold
//! is an empirical value: tune it against the noise floor of the fitted
//! gyro before relying on verdicts.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    // --- Sampling ---
    /// Period between gyro reads while capturing (milliseconds)
    pub sample_period_ms: u32,

    // --- Matching ---
    /// Normalized DTW distance at or below which gestures match (deg/s)
    pub match_threshold: f32,

    // --- Main loop ---
    /// Sleep between phase checks when there is nothing to sample or compare
    pub idle_poll_ms: u32,
    /// Force the cycle back to Idle after this long without a press.
    /// Zero disables the watchdog (the board waits for a press forever).
    pub inactivity_timeout_secs: u32,

    // --- Edge relay thread ---
    /// Stack size of the relay thread (KB)
    pub relay_stack_kb: usize,
    /// RTOS priority of the relay thread
    pub relay_priority: u8,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sample_period_ms: 50, // 20 Hz

            // Matching
            match_threshold: 30.0,

            // Main loop
            idle_poll_ms: 10,
            inactivity_timeout_secs: 0,

            // Relay thread
            relay_stack_kb: 4,
            relay_priority: 5,
        }
    }
}

impl GestureConfig {
    /// Reject values that would stall the main loop or make every verdict
    /// meaningless.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_period_ms must be > 0"));
        }
        if self.idle_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("idle_poll_ms must be > 0"));
        }
        if !self.match_threshold.is_finite() || self.match_threshold < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "match_threshold must be finite and >= 0",
            ));
        }
        if self.relay_stack_kb < 2 {
            return Err(ConfigError::ValidationFailed("relay_stack_kb must be >= 2"));
        }
        Ok(())
    }

    /// Parse a JSON document and validate it.  Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Inactivity watchdog timeout in milliseconds, if enabled.
    pub fn inactivity_timeout_ms(&self) -> Option<u64> {
        (self.inactivity_timeout_secs > 0).then(|| u64::from(self.inactivity_timeout_secs) * 1000)
    }
}
