//! Optional hardware strobe (camera torch and the like).

use crate::error::StrobeError;

/// A light the visualizer may switch on while listening.
/// Entirely optional: every failure is swallowed by the caller.
pub trait StrobeLight {
    fn supports_strobe(&self) -> bool;

    fn enable(&mut self) -> Result<(), StrobeError>;

    fn disable(&mut self) -> Result<(), StrobeError>;
}

/// Fallback for devices without a light
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStrobe;

impl StrobeLight for NoStrobe {
    fn supports_strobe(&self) -> bool {
        false
    }

    fn enable(&mut self) -> Result<(), StrobeError> {
        Err(StrobeError::Unsupported)
    }

    fn disable(&mut self) -> Result<(), StrobeError> {
        Ok(())
    }
}
