//! Error types, one enum per concern.

use std::path::PathBuf;

use thiserror::Error;

/// Microphone access or device failure. Never fatal: the controller
/// logs it and stays idle until the user starts again.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Input device '{0}' not found")]
    DeviceNotFound(String),

    #[error("Failed to enumerate input devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Failed to get input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0:?}")]
    UnsupportedSampleFormat(cpal::SampleFormat),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Optional strobe capability failure, ignored by the pipeline
#[derive(Debug, Error)]
pub enum StrobeError {
    #[error("Strobe light not supported by this device")]
    Unsupported,

    #[error("Failed to switch strobe light: {0}")]
    Switch(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
}
