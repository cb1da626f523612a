//! Optional TOML configuration, merged under command-line overrides.
//!
//! ```toml
//! [audio]
//! sensitivity = 1.5
//! fft_size = 2048
//! device = "USB Microphone"
//!
//! [display]
//! width = 1280
//! height = 720
//! transition_secs = 1.2
//! strobe_ms = 60
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::params::{
    AnalyzerSettings, DisplayConfig, MAX_SENSITIVITY, MAX_TRANSITION_SECS, MIN_SENSITIVITY,
    MIN_TRANSITION_SECS,
};

pub const DEFAULT_CONFIG_FILE: &str = "hueshift.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioSection {
    pub sensitivity: Option<f32>,
    pub fft_size: Option<usize>,
    pub device: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisplaySection {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub transition_secs: Option<f32>,
    pub strobe_ms: Option<u64>,
}

/// Settings after merging defaults, file and command line
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: AnalyzerSettings,
    pub display: DisplayConfig,
    pub device: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

impl Config {
    /// Apply command-line overrides and validate the result
    pub fn resolve(self, args: &Args) -> Result<ResolvedConfig, ConfigError> {
        let mut settings = AnalyzerSettings::default();
        let mut display = DisplayConfig::default();

        if let Some(size) = args.fft_size.or(self.audio.fft_size) {
            settings.set_window_size(size)?;
        }

        if let Some(sensitivity) = args.sensitivity.or(self.audio.sensitivity) {
            if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&sensitivity) {
                log::warn!(
                    "Sensitivity {} outside {}-{}, clamping",
                    sensitivity,
                    MIN_SENSITIVITY,
                    MAX_SENSITIVITY
                );
            }
            settings.set_sensitivity(sensitivity);
        }

        if let Some(secs) = args.transition.or(self.display.transition_secs) {
            if !(MIN_TRANSITION_SECS..=MAX_TRANSITION_SECS).contains(&secs) {
                log::warn!(
                    "Transition {}s outside {}-{}s, clamping",
                    secs,
                    MIN_TRANSITION_SECS,
                    MAX_TRANSITION_SECS
                );
            }
            display.set_transition_secs(secs);
        }
        if let Some(width) = self.display.width {
            display.window_width = width;
        }
        if let Some(height) = self.display.height {
            display.window_height = height;
        }
        if let Some(strobe_ms) = self.display.strobe_ms {
            display.strobe_duration_ms = strobe_ms;
        }
        display.validate()?;

        Ok(ResolvedConfig {
            settings,
            display,
            device: args.device.clone().or(self.audio.device),
        })
    }
}
