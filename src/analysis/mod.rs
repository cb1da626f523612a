//! Spectrum analysis and feature extraction.
//!
//! The analyser turns raw mono samples into a byte frequency buffer;
//! feature extraction reduces that buffer to centroid, energy and onset.

mod features;
mod spectrum;

pub use features::{centroid_hz, extract, normalize_centroid, rms, FeatureFrame};
pub use spectrum::{FrequencyAnalyser, MagnitudeSource};
