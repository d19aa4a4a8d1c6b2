//! Decorative particle parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Burst sizes, pool bound and view dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    /// Maximum live particles; the oldest is dropped beyond this
    pub pool_capacity: usize,

    /// Particles in the one-time confetti burst
    pub confetti_count: usize,

    /// Particles per cheers click
    pub cheers_count: usize,

    /// Logical view width (particle x coordinates)
    pub view_width: f32,

    /// Logical view height (particle y coordinates)
    pub view_height: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            pool_capacity: 512,
            confetti_count: 100,
            cheers_count: 25,
            view_width: 400.0,
            view_height: 800.0,
        }
    }
}

impl ParticleParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_capacity == 0 {
            return Err(ConfigError::Invalid("particle pool capacity must be > 0".to_string()));
        }
        if self.view_width <= 0.0 || self.view_height <= 0.0 {
            return Err(ConfigError::Invalid("view dimensions must be > 0".to_string()));
        }
        Ok(())
    }
}
