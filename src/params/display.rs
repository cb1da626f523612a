//! Window and display-surface configuration.

use std::time::Duration;

use crate::color::Hsl;
use crate::error::ConfigError;

/// Shortest background transition the control surface allows (seconds)
pub const MIN_TRANSITION_SECS: f32 = 0.1;

/// Longest background transition the control surface allows (seconds)
pub const MAX_TRANSITION_SECS: f32 = 3.0;

/// Largest window edge accepted from configuration (pixels), the
/// `max_texture_dimension_2d` of wgpu's default limits
pub const MAX_WINDOW_DIMENSION: u32 = 8192;

/// Display configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Time the background takes to reach a new color (seconds).
    /// Display-only; the analysis core never reads it.
    pub transition_secs: f32,

    /// How long the white flash is held after an onset (milliseconds)
    pub strobe_duration_ms: u64,

    /// Background shown while not listening
    pub idle_color: Hsl,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            transition_secs: 1.2,
            strobe_duration_ms: 60,
            idle_color: Hsl::new(0.0, 0.0, 4.0),
        }
    }
}

impl DisplayConfig {
    pub fn strobe_duration(&self) -> Duration {
        Duration::from_millis(self.strobe_duration_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_secs_f32(self.transition_secs)
    }

    /// Set transition speed, saturating into the supported range
    pub fn set_transition_secs(&mut self, secs: f32) {
        if secs.is_finite() {
            self.transition_secs = secs.clamp(MIN_TRANSITION_SECS, MAX_TRANSITION_SECS);
        }
    }

    /// Nudge transition speed by 0.1 s steps
    pub fn step_transition(&mut self, steps: i32) {
        let stepped = self.transition_secs + steps as f32 * 0.1;
        self.set_transition_secs((stepped * 10.0).round() / 10.0);
    }

    /// Validate window dimensions
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if self.window_width > MAX_WINDOW_DIMENSION || self.window_height > MAX_WINDOW_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} exceeds {} pixels per side",
                self.window_width, self.window_height, MAX_WINDOW_DIMENSION
            )));
        }
        Ok(())
    }
}
