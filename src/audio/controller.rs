//! Acquisition and frame-loop controller.
//!
//! Owns the input lifecycle (Idle → Acquiring → Active → Idle) and runs one
//! analysis tick per scheduled frame: pull the frequency buffer, extract
//! features, map them to a color, schedule the next frame.

use std::fmt;
use std::time::{Duration, Instant};

use crate::analysis::{extract, FeatureFrame, MagnitudeSource};
use crate::color::{visualizer_color, VisualizerColor};
use crate::error::{AcquisitionError, ConfigError};
use crate::params::{AnalysisConfig, AnalyzerSettings};

use super::capture::{CaptureConstraints, CaptureDevice};
use super::context::AnalysisContext;
use super::scheduler::FrameScheduler;
use super::strobe::{NoStrobe, StrobeLight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    /// Only observable inside `start`: cpal opens the device synchronously
    Acquiring,
    Active,
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Acquiring => "starting",
            AcquisitionState::Active => "listening",
        };
        f.write_str(label)
    }
}

/// Result of one analysis tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub frame: FeatureFrame,
    pub color: VisualizerColor,
}

pub struct AcquisitionController<D: CaptureDevice, S: FrameScheduler> {
    device: D,
    scheduler: S,
    strobe: Box<dyn StrobeLight>,

    settings: AnalyzerSettings,
    analysis_config: AnalysisConfig,
    strobe_duration: Duration,

    state: AcquisitionState,
    context: Option<AnalysisContext<D::Stream>>,
    buffer: Vec<u8>,

    /// Energy of the last tick; the only state carried between frames
    previous_energy: f32,
    frame: FeatureFrame,
    strobe_until: Option<Instant>,
    frame_pending: bool,
}

impl<D: CaptureDevice, S: FrameScheduler> AcquisitionController<D, S> {
    pub fn new(
        device: D,
        scheduler: S,
        settings: AnalyzerSettings,
        analysis_config: AnalysisConfig,
        strobe_duration: Duration,
    ) -> Self {
        Self {
            device,
            scheduler,
            strobe: Box::new(NoStrobe),
            settings,
            analysis_config,
            strobe_duration,
            state: AcquisitionState::Idle,
            context: None,
            buffer: Vec::new(),
            previous_energy: 0.0,
            frame: FeatureFrame::default(),
            strobe_until: None,
            frame_pending: false,
        }
    }

    /// Use a hardware strobe light when listening
    pub fn with_strobe(mut self, strobe: Box<dyn StrobeLight>) -> Self {
        self.strobe = strobe;
        self
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AcquisitionState::Active
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn feature_frame(&self) -> FeatureFrame {
        self.frame
    }

    pub fn previous_energy(&self) -> f32 {
        self.previous_energy
    }

    /// Window size the running analyser uses, if any
    pub fn analysis_window(&self) -> Option<usize> {
        self.context.as_ref().map(|context| context.fft_size())
    }

    pub fn set_sensitivity(&mut self, value: f32) {
        self.settings.set_sensitivity(value);
    }

    pub fn step_sensitivity(&mut self, steps: i32) {
        self.settings.step_sensitivity(steps);
    }

    /// Change the analysis window; a running analyser picks it up next tick
    pub fn set_window_size(&mut self, size: usize) -> Result<(), ConfigError> {
        self.settings.set_window_size(size)
    }

    /// Open the microphone and begin the frame loop.
    ///
    /// On failure the error is logged and the controller stays idle.
    /// Calling this while already active does nothing.
    pub fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.state != AcquisitionState::Idle {
            return Ok(());
        }

        self.state = AcquisitionState::Acquiring;
        log::info!("Requesting microphone access");

        let context = match self.open_context() {
            Ok(context) => context,
            Err(e) => {
                log::error!("Microphone access failed: {}", e);
                self.state = AcquisitionState::Idle;
                return Err(e);
            }
        };

        self.context = Some(context);
        self.previous_energy = 0.0;
        self.frame = FeatureFrame::default();
        self.strobe_until = None;
        self.state = AcquisitionState::Active;

        self.try_enable_strobe();
        self.schedule_frame();

        log::info!(
            "Listening (window {} samples, sensitivity {:.1})",
            self.settings.window_size(),
            self.settings.sensitivity()
        );
        Ok(())
    }

    fn open_context(&mut self) -> Result<AnalysisContext<D::Stream>, AcquisitionError> {
        let stream = self.device.open(&CaptureConstraints::raw())?;
        let context =
            AnalysisContext::new(stream, self.settings.window_size(), self.analysis_config)?;
        Ok(context)
    }

    /// Tear down the loop, the stream and the analyser in one step
    pub fn stop(&mut self) {
        if self.state == AcquisitionState::Idle {
            return;
        }

        self.scheduler.cancel();
        self.frame_pending = false;

        if let Some(context) = self.context.take() {
            context.close();
        }
        if self.strobe.supports_strobe() {
            if let Err(e) = self.strobe.disable() {
                log::debug!("Strobe disable ignored: {}", e);
            }
        }

        self.previous_energy = 0.0;
        self.frame = FeatureFrame::default();
        self.strobe_until = None;
        self.state = AcquisitionState::Idle;

        log::info!("Stopped listening");
    }

    /// Run one analysis tick if a frame was scheduled.
    ///
    /// Returns `None` when idle or when no frame is pending (e.g. a redraw
    /// caused by a window resize).
    pub fn tick(&mut self, now: Instant) -> Option<TickOutput> {
        if self.state != AcquisitionState::Active || !self.frame_pending {
            return None;
        }
        self.frame_pending = false;

        let context = self.context.as_mut()?;

        let window_size = self.settings.window_size();
        if context.fft_size() != window_size {
            match context.resize(window_size) {
                Ok(()) => log::debug!("Analysis window resized to {}", window_size),
                Err(e) => log::warn!("Keeping analysis window {}: {}", context.fft_size(), e),
            }
        }

        context.read(&mut self.buffer);
        let (frame, energy) = extract(
            &self.buffer,
            context.sample_rate(),
            &self.settings,
            self.previous_energy,
        );
        self.previous_energy = energy;
        self.frame = frame;

        if frame.is_onset {
            self.strobe_until = Some(now + self.strobe_duration);
        }
        let strobe_active = self.strobe_until.is_some_and(|until| now < until);
        let color = visualizer_color(frame.spectral_centroid, frame.energy, strobe_active);

        log::trace!(
            "centroid={:.3} energy={:.3} onset={} color={}",
            frame.spectral_centroid,
            frame.energy,
            frame.is_onset,
            color
        );

        self.schedule_frame();
        Some(TickOutput { frame, color })
    }

    fn schedule_frame(&mut self) {
        self.frame_pending = true;
        self.scheduler.request_frame();
    }

    fn try_enable_strobe(&mut self) {
        if !self.strobe.supports_strobe() {
            return;
        }
        match self.strobe.enable() {
            Ok(()) => log::info!("Strobe light enabled"),
            Err(e) => log::debug!("Strobe unavailable: {}", e),
        }
    }
}
