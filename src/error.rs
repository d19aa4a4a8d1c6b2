//! Error types for configuration, audio and stage sequencing.

use std::path::PathBuf;

use thiserror::Error;

use crate::stage::StageId;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Audio capability errors; the engine degrades to silence on any of these
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    #[error("Failed to build stream: {0}")]
    StreamBuildError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Music source error: {0}")]
    MusicSource(String),

    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// Rejected stage or step transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("{from:?} is not the active stage (active: {active:?})")]
    NotActive { from: StageId, active: StageId },

    #[error("{to:?} does not follow {from:?}")]
    NotAdjacent { from: StageId, to: StageId },

    #[error("transition {from:?} -> {to:?} already in flight")]
    TransitionInFlight { from: StageId, to: StageId },

    #[error("step {attempted} attempted while step {current} is current")]
    StepOutOfOrder { attempted: u8, current: u8 },
}
