//! Microphone acquisition and the per-frame analysis loop.
//!
//! Capture runs on the cpal callback thread and only fills a sample ring.
//! Everything else (analysis, feature extraction, color mapping) runs on
//! the window thread, one tick per scheduled frame.

mod capture;
mod context;
mod controller;
mod scheduler;
mod strobe;

// Re-export public types
pub use capture::{
    list_input_devices, CaptureConstraints, CaptureDevice, MicrophoneCapture, MicrophoneStream,
    SampleRing, SampleStream,
};
pub use context::AnalysisContext;
pub use controller::{AcquisitionController, AcquisitionState, TickOutput};
pub use scheduler::{FrameScheduler, RedrawScheduler};
pub use strobe::{NoStrobe, StrobeLight};
