//! Configuration module - environment variable parsing and gameplay tuning

pub mod tuning;

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub use tuning::Tuning;

use crate::util::time::DEFAULT_FPS;

/// Session configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Draw surface size reported by the headless host
    pub viewport_width: f64,
    pub viewport_height: f64,

    /// Frames per second of the driver loop
    pub frame_rate: u32,
    /// Fixed seed for reproducible sessions (entropy when absent)
    pub seed: Option<u64>,
    /// Optional JSON file with tuning overrides
    pub tuning_path: Option<PathBuf>,
    /// Hard cap on the number of frames a session may run
    pub max_frames: Option<u64>,
    /// Frames between debug snapshots
    pub snapshot_every: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            viewport_width: parse_or("VIEWPORT_WIDTH", 1000.0)?,
            viewport_height: parse_or("VIEWPORT_HEIGHT", 800.0)?,

            frame_rate: parse_or("FRAME_RATE", DEFAULT_FPS)?,
            seed: parse_opt("GAME_SEED")?,
            tuning_path: env::var("TUNING_PATH").ok().map(PathBuf::from),
            max_frames: parse_opt("MAX_FRAMES")?,
            snapshot_every: parse_or("SNAPSHOT_EVERY", 30)?,
        })
    }

    /// Load the tuning file if one is configured
    pub fn tuning(&self) -> Result<Tuning, ConfigError> {
        match &self.tuning_path {
            Some(path) => Tuning::load(path),
            None => Ok(Tuning::default()),
        }
    }
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_opt(key)?.unwrap_or(default))
}

fn parse_opt<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Failed to read tuning file {0}")]
    TuningRead(String, #[source] std::io::Error),

    #[error("Malformed tuning file: {0}")]
    TuningParse(#[from] serde_json::Error),

    #[error("Tuning value out of range: {0}")]
    InvalidTuning(&'static str),
}
