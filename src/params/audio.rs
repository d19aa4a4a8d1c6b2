//! Audio graph configuration and constants.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Procedural background loop (glicol code), used when no WAV file is given
pub const DEFAULT_COMPOSITION: &str = r#"
~gate: speed 2.0 >> seq 60 _60 _~a 48
~a: choose 48 48 48 72 0 0 0
~amp: ~gate >> envperc 0.001 0.4
~pit: ~gate >> mul 261.63
~lead: saw ~pit >> mul ~amp >> lpf ~mod 3.0 >> mul 0.2
~mod: sin 0.1 >> mul 800 >> add 1200
o: ~lead >> plate 0.2
"#;

/// Where the background music comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicSourceConfig {
    /// Glicol composition code, looped forever
    Composition(String),

    /// WAV file on disk, looped
    WavFile(PathBuf),
}

impl Default for MusicSourceConfig {
    fn default() -> Self {
        Self::Composition(DEFAULT_COMPOSITION.to_string())
    }
}

/// Audio graph parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioParams {
    /// Master amplitude (linear gain)
    pub master_gain: f32,

    /// Music channel level when playing (linear gain)
    pub music_level: f32,

    /// Fade-in time constant (seconds)
    pub music_fade_in_s: f32,

    /// Fade-out time constant (seconds)
    pub music_fade_out_s: f32,

    /// Delay between a pause request and the source actually stopping (seconds)
    pub music_stop_delay_s: f32,

    /// Music low-pass cutoff (Hz), clamped below Nyquist
    pub music_lowpass_hz: f32,

    /// Maximum simultaneous effect voices
    pub max_voices: usize,

    /// Sample rate for offline rendering (Hz)
    pub offline_sample_rate_hz: u32,

    /// Background music source
    pub music: MusicSourceConfig,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            master_gain: 1.0,
            music_level: 0.6,
            music_fade_in_s: 1.0,
            music_fade_out_s: 0.5,
            music_stop_delay_s: 0.5,
            music_lowpass_hz: 20_000.0,
            max_voices: 64,
            offline_sample_rate_hz: 44_100,
            music: MusicSourceConfig::default(),
        }
    }
}

impl AudioParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.offline_sample_rate_hz < audio_constants::MIN_SAMPLE_RATE_HZ {
            return Err(ConfigError::Invalid(format!(
                "offline sample rate must be at least {} Hz, got {}",
                audio_constants::MIN_SAMPLE_RATE_HZ,
                self.offline_sample_rate_hz
            )));
        }
        if self.max_voices == 0 {
            return Err(ConfigError::Invalid("max_voices must be > 0".to_string()));
        }
        if self.music_fade_in_s <= 0.0 || self.music_fade_out_s <= 0.0 {
            return Err(ConfigError::Invalid("fade time constants must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Glicol block size (samples per buffer)
    pub const BLOCK_SIZE: usize = 128;

    /// Output hard clip, applied after the master gain
    pub const OUTPUT_CLIP: f32 = 1.0;

    /// Lowest accepted offline rendering rate (Hz)
    pub const MIN_SAMPLE_RATE_HZ: u32 = 8_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(AudioParams::default().validate().is_ok());
    }

    #[test]
    fn test_tiny_sample_rate_rejected() {
        let params = AudioParams {
            offline_sample_rate_hz: 20,
            ..AudioParams::default()
        };
        assert!(matches!(params.validate(), Err(ConfigError::Invalid(_))));

        let params = AudioParams {
            offline_sample_rate_hz: audio_constants::MIN_SAMPLE_RATE_HZ,
            ..AudioParams::default()
        };
        assert!(params.validate().is_ok());
    }
}
