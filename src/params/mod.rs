//! Parameter definitions with units and documented ranges.
//!
//! Every tunable number of the pipeline lives here:
//! - Units (Hz, samples, seconds, dB)
//! - Documented ranges and defaults
//! - Range enforcement on write

mod audio;
mod display;

// Re-export all types
pub use audio::{
    validate_window_size, AnalysisConfig, AnalyzerSettings, MAX_SENSITIVITY, MAX_WINDOW_SIZE,
    MIN_SENSITIVITY, MIN_WINDOW_SIZE, SENSITIVITY_STEP,
};
pub use display::{
    DisplayConfig, MAX_TRANSITION_SECS, MAX_WINDOW_DIMENSION, MIN_TRANSITION_SECS,
};
