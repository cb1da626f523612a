//! Microphone capture via cpal.
//!
//! The input callback downmixes to mono and appends into a bounded ring of
//! recent samples; the render loop copies the newest window out of it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::error::AcquisitionError;
use crate::params::MAX_WINDOW_SIZE;

/// Processing the capture layer is asked to apply (or not)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl CaptureConstraints {
    /// Unprocessed signal, preferred for analysis
    pub const fn raw() -> Self {
        Self {
            echo_cancellation: false,
            noise_suppression: false,
            auto_gain_control: false,
        }
    }

    pub fn wants_processing(&self) -> bool {
        self.echo_cancellation || self.noise_suppression || self.auto_gain_control
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self::raw()
    }
}

/// Something that can hand out a live input stream
pub trait CaptureDevice {
    type Stream: SampleStream;

    /// Open the input. May block while the OS asks for microphone permission.
    fn open(&mut self, constraints: &CaptureConstraints)
        -> Result<Self::Stream, AcquisitionError>;
}

/// A running mono input stream
pub trait SampleStream {
    fn sample_rate(&self) -> u32;

    /// Copy the newest samples into `out`, right-aligned.
    /// Slots older than what has been captured are zeroed.
    fn copy_latest(&self, out: &mut [f32]);

    /// Release the device. Idempotent.
    fn stop(&mut self);
}

/// Bounded history of mono samples
#[derive(Debug)]
pub struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append samples, discarding the oldest beyond capacity
    pub fn push_slice(&mut self, samples: &[f32]) {
        let incoming = &samples[samples.len().saturating_sub(self.capacity)..];
        let overflow = (self.samples.len() + incoming.len()).saturating_sub(self.capacity);
        self.samples.drain(..overflow);
        self.samples.extend(incoming.iter().copied());
    }

    pub fn copy_latest(&self, out: &mut [f32]) {
        let available = self.samples.len().min(out.len());
        let padding = out.len() - available;
        out[..padding].fill(0.0);

        let start = self.samples.len() - available;
        for (slot, &sample) in out[padding..].iter_mut().zip(self.samples.range(start..)) {
            *slot = sample;
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Default (or named) system input device
#[derive(Debug, Clone, Default)]
pub struct MicrophoneCapture {
    device_name: Option<String>,
}

impl MicrophoneCapture {
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }

    fn select_device(&self, host: &cpal::Host) -> Result<cpal::Device, AcquisitionError> {
        match &self.device_name {
            Some(name) => host
                .input_devices()?
                .find(|device| device.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| AcquisitionError::DeviceNotFound(name.clone())),
            None => host
                .default_input_device()
                .ok_or(AcquisitionError::NoInputDevice),
        }
    }
}

impl CaptureDevice for MicrophoneCapture {
    type Stream = MicrophoneStream;

    fn open(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<MicrophoneStream, AcquisitionError> {
        if constraints.wants_processing() {
            // cpal delivers the device signal untouched
            log::warn!("Input processing requested but unavailable, capturing raw signal");
        }

        let host = cpal::default_host();
        let device = self.select_device(&host)?;
        let config = device.default_input_config()?;

        let sample_format = config.sample_format();
        let channels = usize::from(config.channels()).max(1);
        let sample_rate = config.sample_rate().0;
        let stream_config: cpal::StreamConfig = config.into();

        log::info!(
            "Input: {} @ {}Hz, {} channel(s), {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            sample_format
        );

        let ring = Arc::new(Mutex::new(SampleRing::new(MAX_WINDOW_SIZE)));
        let shared = Arc::clone(&ring);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                build_input_stream::<f32>(&device, &stream_config, channels, shared)?
            }
            cpal::SampleFormat::I16 => {
                build_input_stream::<i16>(&device, &stream_config, channels, shared)?
            }
            cpal::SampleFormat::U16 => {
                build_input_stream::<u16>(&device, &stream_config, channels, shared)?
            }
            cpal::SampleFormat::I32 => {
                build_input_stream::<i32>(&device, &stream_config, channels, shared)?
            }
            other => return Err(AcquisitionError::UnsupportedSampleFormat(other)),
        };

        stream.play()?;

        Ok(MicrophoneStream {
            stream: Some(stream),
            ring,
            sample_rate,
        })
    }
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    ring: Arc<Mutex<SampleRing>>,
) -> Result<cpal::Stream, AcquisitionError>
where
    T: SizedSample + 'static,
    f32: FromSample<T>,
{
    let mut mono: Vec<f32> = Vec::with_capacity(1024);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            mono.clear();
            mono.extend(data.chunks(channels).map(|frame| {
                frame.iter().map(|&s| f32::from_sample(s)).sum::<f32>() / frame.len() as f32
            }));

            if let Ok(mut ring) = ring.lock() {
                ring.push_slice(&mono);
            }
        },
        |err| log::error!("Audio input stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Live microphone stream; dropping it releases the device
pub struct MicrophoneStream {
    stream: Option<cpal::Stream>,
    ring: Arc<Mutex<SampleRing>>,
    sample_rate: u32,
}

impl SampleStream for MicrophoneStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn copy_latest(&self, out: &mut [f32]) {
        match self.ring.lock() {
            Ok(ring) => ring.copy_latest(out),
            Err(_) => out.fill(0.0),
        }
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::debug!("Failed to pause input stream: {}", e);
            }
            log::debug!("Input stream released");
        }
        if let Ok(mut ring) = self.ring.lock() {
            ring.clear();
        }
    }
}

impl Drop for MicrophoneStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Names of all input devices on the default host
pub fn list_input_devices() -> Result<Vec<String>, AcquisitionError> {
    let host = cpal::default_host();
    let names = host
        .input_devices()?
        .filter_map(|device| device.name().ok())
        .collect();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_constraints() {
        let raw = CaptureConstraints::default();
        assert!(!raw.echo_cancellation);
        assert!(!raw.noise_suppression);
        assert!(!raw.auto_gain_control);
        assert!(!raw.wants_processing());
    }

    #[test]
    fn test_ring_keeps_newest() {
        let mut ring = SampleRing::new(4);
        ring.push_slice(&[1.0, 2.0, 3.0]);
        ring.push_slice(&[4.0, 5.0]);
        assert_eq!(ring.len(), 4);

        let mut out = [0.0; 4];
        ring.copy_latest(&mut out);
        assert_eq!(out, [2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_ring_oversized_push() {
        let mut ring = SampleRing::new(3);
        ring.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut out = [0.0; 3];
        ring.copy_latest(&mut out);
        assert_eq!(out, [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_ring_pads_missing_history() {
        let mut ring = SampleRing::new(8);
        ring.push_slice(&[0.5, 0.25]);

        let mut out = [9.0; 5];
        ring.copy_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.0, 0.5, 0.25]);

        let mut short = [0.0; 1];
        ring.copy_latest(&mut short);
        assert_eq!(short, [0.25]);

        ring.clear();
        assert!(ring.is_empty());
    }
}
