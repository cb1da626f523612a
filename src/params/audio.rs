//! Audio analysis settings and constants.

use crate::error::ConfigError;

/// Lowest sensitivity the control surface allows
pub const MIN_SENSITIVITY: f32 = 0.2;

/// Highest sensitivity the control surface allows
pub const MAX_SENSITIVITY: f32 = 3.0;

/// Increment applied by a single sensitivity key press
pub const SENSITIVITY_STEP: f32 = 0.1;

/// Smallest analysis window the analyser accepts (samples)
pub const MIN_WINDOW_SIZE: usize = 32;

/// Largest analysis window the analyser accepts (samples)
pub const MAX_WINDOW_SIZE: usize = 32768;

/// User-adjustable analyzer settings, read by the loop on every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerSettings {
    /// Linear gain applied after RMS, also lowers the onset threshold
    sensitivity: f32,

    /// Analysis window (samples, power of two). Bin count is half of this.
    window_size: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            sensitivity: 1.5,
            window_size: 2048,
        }
    }
}

impl AnalyzerSettings {
    /// Create settings, clamping sensitivity and validating the window size
    pub fn new(sensitivity: f32, window_size: usize) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        settings.set_sensitivity(sensitivity);
        settings.set_window_size(window_size)?;
        Ok(settings)
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of frequency bins produced per analysis window
    pub fn bin_count(&self) -> usize {
        self.window_size / 2
    }

    /// Set sensitivity, saturating into the supported range.
    ///
    /// Non-finite input leaves the current value untouched.
    pub fn set_sensitivity(&mut self, value: f32) {
        if value.is_finite() {
            self.sensitivity = value.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
        }
    }

    /// Nudge sensitivity by a number of key steps (negative lowers it)
    pub fn step_sensitivity(&mut self, steps: i32) {
        let stepped = self.sensitivity + steps as f32 * SENSITIVITY_STEP;
        // Keep one decimal so repeated steps don't drift
        self.set_sensitivity((stepped * 10.0).round() / 10.0);
    }

    /// Set the analysis window size (must be a power of two in range)
    pub fn set_window_size(&mut self, size: usize) -> Result<(), ConfigError> {
        validate_window_size(size)?;
        self.window_size = size;
        Ok(())
    }
}

/// Validate an analysis window size
pub fn validate_window_size(size: usize) -> Result<(), ConfigError> {
    if !size.is_power_of_two() {
        return Err(ConfigError::Invalid(format!(
            "analysis window must be a power of 2, got {}",
            size
        )));
    }
    if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&size) {
        return Err(ConfigError::Invalid(format!(
            "analysis window must be between {} and {}, got {}",
            MIN_WINDOW_SIZE, MAX_WINDOW_SIZE, size
        )));
    }
    Ok(())
}

/// Fixed parameters of the frequency analyser
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Temporal smoothing between successive magnitude reads (0 = none)
    pub smoothing: f32,

    /// Magnitude (dB) mapped to byte value 0
    pub min_decibels: f32,

    /// Magnitude (dB) mapped to byte value 255
    pub max_decibels: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity_saturates() {
        let mut settings = AnalyzerSettings::default();

        settings.set_sensitivity(10.0);
        assert_eq!(settings.sensitivity(), MAX_SENSITIVITY);

        settings.set_sensitivity(0.0);
        assert_eq!(settings.sensitivity(), MIN_SENSITIVITY);

        settings.set_sensitivity(f32::NAN);
        assert_eq!(settings.sensitivity(), MIN_SENSITIVITY);
    }

    #[test]
    fn test_sensitivity_steps() {
        let mut settings = AnalyzerSettings::default();
        settings.step_sensitivity(3);
        assert!((settings.sensitivity() - 1.8).abs() < 1e-6);

        settings.step_sensitivity(-40);
        assert_eq!(settings.sensitivity(), MIN_SENSITIVITY);
    }

    #[test]
    fn test_window_size_validation() {
        let mut settings = AnalyzerSettings::default();

        assert!(settings.set_window_size(1000).is_err());
        assert!(settings.set_window_size(16).is_err());
        assert!(settings.set_window_size(65536).is_err());
        assert_eq!(settings.window_size(), 2048);

        settings.set_window_size(4096).unwrap();
        assert_eq!(settings.window_size(), 4096);
        assert_eq!(settings.bin_count(), 2048);
    }
}
