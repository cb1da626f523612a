//! Analysis context: a live input stream paired with a frequency analyser.

use crate::analysis::{FrequencyAnalyser, MagnitudeSource};
use crate::error::ConfigError;
use crate::params::AnalysisConfig;

use super::capture::SampleStream;

pub struct AnalysisContext<S: SampleStream> {
    stream: S,
    analyser: FrequencyAnalyser,
    samples: Vec<f32>,
}

impl<S: SampleStream> AnalysisContext<S> {
    pub fn new(stream: S, fft_size: usize, config: AnalysisConfig) -> Result<Self, ConfigError> {
        let analyser = FrequencyAnalyser::new(fft_size, config)?;
        Ok(Self {
            stream,
            analyser,
            samples: vec![0.0; fft_size],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.analyser.fft_size()
    }

    /// Change the analysis window; takes effect on the next read
    pub fn resize(&mut self, fft_size: usize) -> Result<(), ConfigError> {
        self.analyser.resize(fft_size)?;
        self.samples.resize(fft_size, 0.0);
        Ok(())
    }

    /// Stop the stream and drop the analyser
    pub fn close(mut self) {
        self.stream.stop();
    }
}

impl<S: SampleStream> MagnitudeSource for AnalysisContext<S> {
    fn sample_rate(&self) -> f32 {
        self.stream.sample_rate() as f32
    }

    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn read(&mut self, out: &mut Vec<u8>) {
        self.stream.copy_latest(&mut self.samples);
        self.analyser.process(&self.samples);
        self.analyser.byte_frequency_data(out);
    }
}
