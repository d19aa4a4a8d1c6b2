//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::audio::{AudioBackend, CpalBackend, NullBackend};
use crate::error::ConfigError;
use crate::media::{MediaClip, TimedClip};
use crate::params::{ExperienceConfig, MusicSourceConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Strongroom")]
#[command(about = "Staged vault-door unlock with procedural sound", long_about = None)]
pub struct Args {
    /// JSON configuration file (partial files fall back to defaults)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run silently without opening an audio device
    #[arg(long)]
    pub no_audio: bool,

    /// Refuse the first play request of the recorded clip
    #[arg(long)]
    pub block_autoplay: bool,

    /// Length of the recorded clip (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "8")]
    pub clip_secs: f32,

    /// Loop a WAV file as background music instead of the built-in composition
    #[arg(long, value_name = "WAV")]
    pub music: Option<PathBuf>,

    /// Seed for particle bursts
    #[arg(long, value_name = "N", default_value = "23")]
    pub seed: u64,

    /// Render one effect to a WAV file and exit
    #[arg(long, value_name = "NAME", requires = "out")]
    pub render_effect: Option<String>,

    /// Output path for --render-effect
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl Args {
    /// Load the configuration file (if any) and apply command-line overrides
    pub fn load_config(&self) -> Result<ExperienceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ExperienceConfig::load(path)?,
            None => ExperienceConfig::default(),
        };
        if let Some(path) = &self.music {
            config.audio.music = MusicSourceConfig::WavFile(path.clone());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn create_backend(&self) -> Box<dyn AudioBackend> {
        if self.no_audio {
            log::info!("Audio disabled on the command line");
            Box::new(NullBackend)
        } else {
            Box::new(CpalBackend)
        }
    }

    pub fn create_clip(&self) -> Box<dyn MediaClip> {
        let duration_ms = (self.clip_secs.max(0.1) * 1000.0) as u64;
        let clip = TimedClip::new(duration_ms);
        if self.block_autoplay {
            Box::new(clip.with_blocked_autoplay())
        } else {
            Box::new(clip)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["strongroom"]);
        assert!(!args.no_audio);
        assert_eq!(args.seed, 23);
        assert!(args.render_effect.is_none());

        let config = args.load_config().unwrap();
        assert_eq!(config.puzzle.final_code, "232323");
    }

    #[test]
    fn test_music_override() {
        let args = Args::parse_from(["strongroom", "--music", "loop.wav"]);
        let config = args.load_config().unwrap();
        assert_eq!(
            config.audio.music,
            MusicSourceConfig::WavFile(PathBuf::from("loop.wav"))
        );
    }

    #[test]
    fn test_render_effect_requires_out() {
        assert!(Args::try_parse_from(["strongroom", "--render-effect", "slam"]).is_err());
        let args =
            Args::try_parse_from(["strongroom", "--render-effect", "slam", "--out", "s.wav"])
                .unwrap();
        assert_eq!(args.render_effect.as_deref(), Some("slam"));
    }

    #[test]
    fn test_blocked_clip_refuses_first_play() {
        let args = Args::parse_from(["strongroom", "--block-autoplay", "--clip-secs", "2"]);
        let mut clip = args.create_clip();
        assert!(clip.play(0).is_err());
        assert!(clip.play(1).is_ok());
    }
}
