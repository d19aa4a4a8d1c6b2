//! Parameter definitions with units and documented semantics.
//!
//! Every constant the experience depends on lives here:
//! - Puzzle answers and prompt text (configuration data, not logic)
//! - Choreography delays in milliseconds
//! - Audio graph levels, fade time constants and pool sizes
//!
//! All structs implement `Default` with the shipped values and can be
//! overridden from a partial JSON file.

mod audio;
mod particles;
mod puzzle;
mod timing;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// Re-export all types
pub use audio::{audio_constants, AudioParams, MusicSourceConfig, DEFAULT_COMPOSITION};
pub use particles::ParticleParams;
pub use puzzle::{Challenge, PuzzleConfig};
pub use timing::TimingConfig;

/// Root configuration for one run of the experience
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub puzzle: PuzzleConfig,
    pub timing: TimingConfig,
    pub audio: AudioParams,
    pub particles: ParticleParams,
}

impl ExperienceConfig {
    /// Load a (possibly partial) JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.puzzle.validate()?;
        self.audio.validate()?;
        self.particles.validate()?;
        Ok(())
    }
}
