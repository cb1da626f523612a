//! Hueshift library - ambient microphone visualizer
//!
//! Spectral centroid and energy of the live input drive a slowly shifting
//! background color; sudden energy rises flash the screen white.

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod color;
pub mod config;
pub mod display;
pub mod error;
pub mod params;
pub mod rendering;
