//! Per-frame feature extraction from a byte frequency buffer.

use crate::params::AnalyzerSettings;

/// Largest value a byte-quantized magnitude bin can hold
const MAX_MAGNITUDE: f32 = 255.0;

/// Lower edge of the centroid range worth visualizing (Hz)
const CENTROID_FLOOR_HZ: f32 = 80.0;

/// Width of the centroid range, 80 Hz up to 8 kHz
const CENTROID_SPAN_HZ: f32 = 7920.0;

/// Energy gain applied on top of the user sensitivity
const ENERGY_GAIN: f32 = 3.0;

/// Energy rise (at sensitivity 1.0) needed to count as an onset
const ONSET_DELTA: f32 = 0.15;

/// Absolute energy an onset frame must exceed, independent of sensitivity
const ONSET_ENERGY_FLOOR: f32 = 0.3;

/// Features derived from one analysis tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureFrame {
    /// Magnitude-weighted mean frequency, normalized to [0, 1]
    pub spectral_centroid: f32,

    /// Sensitivity-scaled RMS of the bins, in [0, 1]
    pub energy: f32,

    /// Rising edge in energy that qualifies as a transient
    pub is_onset: bool,
}

/// Extract features from one frequency buffer.
///
/// `previous_energy` is the energy of the prior tick (0 after a restart);
/// the second return value is the energy to carry into the next tick.
/// Empty or silent buffers yield the zero frame.
pub fn extract(
    buffer: &[u8],
    sample_rate: f32,
    settings: &AnalyzerSettings,
    previous_energy: f32,
) -> (FeatureFrame, f32) {
    let sensitivity = settings.sensitivity();

    let spectral_centroid = normalize_centroid(centroid_hz(buffer, sample_rate));
    let energy = (rms(buffer) * sensitivity * ENERGY_GAIN).clamp(0.0, 1.0);

    let delta = energy - previous_energy;
    let is_onset = delta > ONSET_DELTA / sensitivity && energy > ONSET_ENERGY_FLOOR;

    let frame = FeatureFrame {
        spectral_centroid,
        energy,
        is_onset,
    };
    (frame, energy)
}

/// Spectral centroid in Hz. Bin `i` sits at `i * sample_rate / (2 * N)`.
pub fn centroid_hz(buffer: &[u8], sample_rate: f32) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }

    let bin_hz = sample_rate / (2 * buffer.len()) as f32;
    let (weighted, total) = buffer
        .iter()
        .enumerate()
        .fold((0.0f32, 0.0f32), |(weighted, total), (i, &magnitude)| {
            let magnitude = f32::from(magnitude);
            (weighted + i as f32 * bin_hz * magnitude, total + magnitude)
        });

    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Map a centroid in Hz onto [0, 1] over 80 Hz - 8 kHz, saturating outside
pub fn normalize_centroid(hz: f32) -> f32 {
    ((hz - CENTROID_FLOOR_HZ) / CENTROID_SPAN_HZ).clamp(0.0, 1.0)
}

/// Root-mean-square of the bins, each scaled to [0, 1] first
pub fn rms(buffer: &[u8]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = buffer
        .iter()
        .map(|&magnitude| {
            let normalized = f32::from(magnitude) / MAX_MAGNITUDE;
            normalized * normalized
        })
        .sum();
    (sum_squares / buffer.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MAX_SENSITIVITY, MIN_SENSITIVITY};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SAMPLE_RATE: f32 = 44100.0;

    fn settings(sensitivity: f32) -> AnalyzerSettings {
        AnalyzerSettings::new(sensitivity, 2048).unwrap()
    }

    /// Flat buffer whose bins all hold the byte giving `energy` at `sensitivity`
    fn buffer_with_energy(energy: f32, sensitivity: f32) -> Vec<u8> {
        let level = (energy / (sensitivity * ENERGY_GAIN) * MAX_MAGNITUDE).round() as u8;
        vec![level; 1024]
    }

    #[test]
    fn test_silence_is_zero_frame() {
        for sensitivity in [0.2, 1.0, 1.5, 3.0] {
            let (frame, carried) = extract(&[0u8; 1024], SAMPLE_RATE, &settings(sensitivity), 0.7);
            assert_eq!(frame, FeatureFrame::default());
            assert_eq!(carried, 0.0);
        }
    }

    #[test]
    fn test_empty_buffer_degrades_gracefully() {
        let (frame, carried) = extract(&[], SAMPLE_RATE, &settings(1.5), 0.4);
        assert_eq!(frame, FeatureFrame::default());
        assert_eq!(carried, 0.0);
        assert!(!frame.spectral_centroid.is_nan());
    }

    #[test]
    fn test_features_stay_in_unit_range() {
        let loud = vec![255u8; 1024];
        let mut ramp: Vec<u8> = (0..1024).map(|i| (i % 256) as u8).collect();
        ramp.reverse();
        let spike = {
            let mut b = vec![0u8; 1024];
            b[1023] = 255;
            b
        };

        for sensitivity in [0.2, 0.7, 1.5, 3.0] {
            for buffer in [&loud, &ramp, &spike] {
                let (frame, _) = extract(buffer, 96000.0, &settings(sensitivity), 0.0);
                assert!((0.0..=1.0).contains(&frame.energy));
                assert!((0.0..=1.0).contains(&frame.spectral_centroid));
            }
        }
    }

    #[test]
    fn test_random_buffers_stay_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..500 {
            let len = rng.gen_range(0..=4096);
            let buffer: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let sample_rate = rng.gen_range(8000.0..=192000.0);
            let sensitivity = rng.gen_range(MIN_SENSITIVITY..=MAX_SENSITIVITY);
            let previous = rng.gen_range(0.0..=1.0);

            let (frame, carried) = extract(&buffer, sample_rate, &settings(sensitivity), previous);
            assert!((0.0..=1.0).contains(&frame.energy));
            assert!((0.0..=1.0).contains(&frame.spectral_centroid));
            assert_eq!(carried, frame.energy);
        }
    }

    #[test]
    fn test_centroid_of_single_bin() {
        // 1024 bins at 44.1 kHz → ~21.5 Hz per bin; bin 100 ≈ 2153 Hz
        let mut buffer = vec![0u8; 1024];
        buffer[100] = 200;
        let hz = centroid_hz(&buffer, SAMPLE_RATE);
        assert!((hz - 100.0 * SAMPLE_RATE / 2048.0).abs() < 1e-2);

        let normalized = normalize_centroid(hz);
        assert!((normalized - (hz - 80.0) / 7920.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_saturates() {
        assert_eq!(normalize_centroid(20.0), 0.0);
        assert_eq!(normalize_centroid(12000.0), 1.0);
    }

    #[test]
    fn test_sensitivity_is_post_rms_gain() {
        let buffer = vec![40u8; 1024];
        let (low, _) = extract(&buffer, SAMPLE_RATE, &settings(0.5), 0.0);
        let (high, _) = extract(&buffer, SAMPLE_RATE, &settings(1.0), 0.0);
        assert!((high.energy - 2.0 * low.energy).abs() < 1e-6);
        // Sensitivity does not move the centroid
        assert_eq!(low.spectral_centroid, high.spectral_centroid);
    }

    #[test]
    fn test_onset_on_rising_edge() {
        let settings = settings(1.5);
        let (first, carried) = extract(&buffer_with_energy(0.1, 1.5), SAMPLE_RATE, &settings, 0.0);
        assert!(!first.is_onset);
        assert!((carried - 0.1).abs() < 0.01);

        let (second, _) = extract(&buffer_with_energy(0.5, 1.5), SAMPLE_RATE, &settings, carried);
        assert!((second.energy - 0.5).abs() < 0.01);
        assert!(second.is_onset);
    }

    #[test]
    fn test_no_onset_without_enough_delta() {
        let settings = settings(1.5);
        let (_, carried) = extract(&buffer_with_energy(0.35, 1.5), SAMPLE_RATE, &settings, 0.0);
        let (second, _) = extract(&buffer_with_energy(0.36, 1.5), SAMPLE_RATE, &settings, carried);
        assert!(second.energy > ONSET_ENERGY_FLOOR);
        assert!(!second.is_onset);
    }

    #[test]
    fn test_no_onset_below_energy_floor() {
        // Big jump from silence, but still quiet
        let settings = settings(3.0);
        let (frame, _) = extract(&buffer_with_energy(0.25, 3.0), SAMPLE_RATE, &settings, 0.0);
        assert!(frame.energy > ONSET_DELTA / 3.0);
        assert!(!frame.is_onset);
    }

    #[test]
    fn test_sensitivity_lowers_onset_threshold() {
        // Delta of ~0.12 qualifies at 3.0 (threshold 0.05) but not at 0.5 (0.3)
        let buffer = vec![255u8; 1024];
        let (eager, _) = extract(&buffer, SAMPLE_RATE, &settings(3.0), 0.88);
        assert!(eager.is_onset);

        let (reluctant, _) = extract(&buffer, SAMPLE_RATE, &settings(0.5), 0.88);
        assert!(!reluctant.is_onset);
    }

    #[test]
    fn test_previous_energy_always_carried() {
        let settings = settings(1.0);
        let buffer = buffer_with_energy(0.2, 1.0);
        let (frame, carried) = extract(&buffer, SAMPLE_RATE, &settings, 0.9);
        assert!(!frame.is_onset);
        assert_eq!(carried, frame.energy);
    }
}
