//! Windowed FFT producing byte-quantized, time-smoothed magnitude bins.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::ConfigError;
use crate::params::{validate_window_size, AnalysisConfig};

/// Pull-based source of frequency buffers, one snapshot per read
pub trait MagnitudeSource {
    /// Sample rate of the analysed signal (Hz)
    fn sample_rate(&self) -> f32;

    /// Number of bins a read produces
    fn bin_count(&self) -> usize;

    /// Fill `out` with the current magnitudes (0-255 per bin).
    /// `out` is resized to `bin_count()`.
    fn read(&mut self, out: &mut Vec<u8>);
}

/// Frequency analyser over a fixed-size window of mono samples
pub struct FrequencyAnalyser {
    config: AnalysisConfig,
    planner: FftPlanner<f32>,
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitude per bin, carried between reads
    smoothed: Vec<f32>,
}

impl FrequencyAnalyser {
    pub fn new(fft_size: usize, config: AnalysisConfig) -> Result<Self, ConfigError> {
        validate_window_size(fft_size)?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Ok(Self {
            config,
            planner,
            fft,
            fft_size,
            window: blackman_window(fft_size),
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Switch to a new window size. Smoothing history is dropped.
    pub fn resize(&mut self, fft_size: usize) -> Result<(), ConfigError> {
        validate_window_size(fft_size)?;
        if fft_size == self.fft_size {
            return Ok(());
        }

        self.fft = self.planner.plan_fft_forward(fft_size);
        self.fft_size = fft_size;
        self.window = blackman_window(fft_size);
        self.scratch = vec![Complex::new(0.0, 0.0); fft_size];
        self.smoothed = vec![0.0; fft_size / 2];
        Ok(())
    }

    /// Analyse the most recent `fft_size` samples and update smoothed magnitudes.
    ///
    /// Shorter input is treated as preceded by silence.
    pub fn process(&mut self, samples: &[f32]) {
        let n = self.fft_size;
        let samples = &samples[samples.len().saturating_sub(n)..];
        let offset = n - samples.len();

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < offset { 0.0 } else { samples[i - offset] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let tau = self.config.smoothing;
        let scale = 1.0 / n as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(self.scratch.iter()) {
            let magnitude = bin.norm() * scale;
            let value = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if value.is_finite() { value } else { 0.0 };
        }
    }

    /// Current smoothed magnitudes quantized to bytes over the dB range
    pub fn byte_frequency_data(&self, out: &mut Vec<u8>) {
        let min_db = self.config.min_decibels;
        let range_scale = 255.0 / (self.config.max_decibels - min_db);

        out.clear();
        out.extend(self.smoothed.iter().map(|&magnitude| {
            let db = 20.0 * magnitude.log10();
            let scaled = (db - min_db) * range_scale;
            if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            }
        }));
    }
}

/// Blackman window (alpha = 0.16)
fn blackman_window(size: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42, 0.5, 0.08);
    (0..size)
        .map(|i| {
            let phase = 2.0 * PI * i as f32 / size as f32;
            a0 - a1 * phase.cos() + a2 * (2.0 * phase).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 2048;

    fn sine_at_bin(bin: usize, amplitude: f32) -> Vec<f32> {
        (0..SIZE)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / SIZE as f32).sin())
            .collect()
    }

    fn read(analyser: &FrequencyAnalyser) -> Vec<u8> {
        let mut out = Vec::new();
        analyser.byte_frequency_data(&mut out);
        out
    }

    #[test]
    fn test_blackman_window_shape() {
        let window = blackman_window(SIZE);
        assert!(window[0].abs() < 1e-6);
        assert!((window[SIZE / 2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_silence_reads_zero() {
        let mut analyser = FrequencyAnalyser::new(SIZE, AnalysisConfig::default()).unwrap();
        analyser.process(&vec![0.0; SIZE]);
        let bytes = read(&analyser);
        assert_eq!(bytes.len(), SIZE / 2);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = FrequencyAnalyser::new(SIZE, AnalysisConfig::default()).unwrap();
        analyser.process(&sine_at_bin(64, 1.0));
        let bytes = read(&analyser);

        let peak = bytes
            .iter()
            .enumerate()
            .max_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .unwrap();
        assert!((63..=65).contains(&peak));
        assert_eq!(bytes[64], 255);
        assert!(bytes[400] < 32);
    }

    #[test]
    fn test_smoothing_carries_between_reads() {
        let mut analyser = FrequencyAnalyser::new(SIZE, AnalysisConfig::default()).unwrap();
        analyser.process(&sine_at_bin(64, 1.0));
        analyser.process(&vec![0.0; SIZE]);
        let decaying = read(&analyser)[64];
        assert!(decaying > 0);

        for _ in 0..200 {
            analyser.process(&vec![0.0; SIZE]);
        }
        assert_eq!(read(&analyser)[64], 0);
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let mut analyser = FrequencyAnalyser::new(SIZE, AnalysisConfig::default()).unwrap();
        analyser.process(&[]);
        assert!(read(&analyser).iter().all(|&b| b == 0));

        analyser.process(&sine_at_bin(64, 1.0)[..SIZE / 2]);
        assert!(read(&analyser)[64] > 0);
    }

    #[test]
    fn test_resize_replans() {
        let mut analyser = FrequencyAnalyser::new(SIZE, AnalysisConfig::default()).unwrap();
        analyser.process(&sine_at_bin(64, 1.0));

        analyser.resize(512).unwrap();
        assert_eq!(analyser.bin_count(), 256);
        let bytes = read(&analyser);
        assert_eq!(bytes.len(), 256);
        assert!(bytes.iter().all(|&b| b == 0));

        assert!(analyser.resize(300).is_err());
        assert_eq!(analyser.fft_size(), 512);
    }
}
