//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_FILE;

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "hueshift")]
#[command(about = "Turns microphone input into a shifting background color", long_about = None)]
pub struct Args {
    /// Config file (defaults to ./hueshift.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input sensitivity (0.2-3.0)
    #[arg(short, long, value_name = "GAIN")]
    pub sensitivity: Option<f32>,

    /// Analysis window in samples (power of 2)
    #[arg(long, value_name = "SAMPLES")]
    pub fft_size: Option<usize>,

    /// Background transition time (0.1-3.0 seconds)
    #[arg(short, long, value_name = "SECONDS")]
    pub transition: Option<f32>,

    /// Input device name (see --list-devices)
    #[arg(short, long, value_name = "NAME")]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Start listening right away instead of waiting for Space
    #[arg(long)]
    pub listen: bool,
}

impl Args {
    /// Config file to load: the explicit one, else the local default if it exists
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            local.exists().then_some(local)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Args::try_parse_from([
            "hueshift",
            "--sensitivity",
            "2.2",
            "--fft-size",
            "4096",
            "-t",
            "0.5",
            "--listen",
        ])
        .unwrap();

        assert_eq!(args.sensitivity, Some(2.2));
        assert_eq!(args.fft_size, Some(4096));
        assert_eq!(args.transition, Some(0.5));
        assert!(args.listen);
        assert!(!args.list_devices);
        assert!(args.device.is_none());
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let args = Args::try_parse_from(["hueshift", "--config", "elsewhere.toml"]).unwrap();
        assert_eq!(args.config_path(), Some(PathBuf::from("elsewhere.toml")));
    }

    #[test]
    fn test_rejects_non_numeric_sensitivity() {
        assert!(Args::try_parse_from(["hueshift", "--sensitivity", "loud"]).is_err());
    }
}
