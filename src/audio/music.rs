//! Looping background music sources.

use std::path::Path;

use glicol::Engine;

use crate::error::{AudioError, AudioResult};
use crate::params::{audio_constants::BLOCK_SIZE, MusicSourceConfig};

/// An endless mono sample stream at the graph's sample rate
pub trait MusicSource: Send {
    fn next_sample(&mut self) -> f32;
}

/// Build the configured source for a graph running at `sample_rate`
pub fn build_source(
    config: &MusicSourceConfig,
    sample_rate: u32,
) -> AudioResult<Box<dyn MusicSource>> {
    match config {
        MusicSourceConfig::Composition(code) => {
            Ok(Box::new(GlicolLoop::new(code, sample_rate)?))
        }
        MusicSourceConfig::WavFile(path) => Ok(Box::new(WavLoop::open(path, sample_rate)?)),
    }
}

/// Procedural composition rendered block by block with Glicol
pub struct GlicolLoop {
    render_block: Box<dyn FnMut(&mut [f32; BLOCK_SIZE]) + Send>,
    block: [f32; BLOCK_SIZE],
    cursor: usize,
}

impl GlicolLoop {
    pub fn new(code: &str, sample_rate: u32) -> AudioResult<Self> {
        // The engine borrows its code for as long as it lives; sources are
        // built once per session so the leak is bounded.
        let code: &'static str = Box::leak(code.to_owned().into_boxed_str());

        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate as usize);
        engine.update_with_code(code);
        engine
            .update()
            .map_err(|e| AudioError::MusicSource(format!("Glicol engine init failed: {:?}", e)))?;

        let render_block = move |block: &mut [f32; BLOCK_SIZE]| {
            let (buffers, _) = engine.next_block(vec![]);
            for (i, sample) in block.iter_mut().enumerate() {
                *sample = buffers[0][i];
            }
        };

        Ok(Self {
            render_block: Box::new(render_block),
            block: [0.0; BLOCK_SIZE],
            cursor: BLOCK_SIZE,
        })
    }
}

impl MusicSource for GlicolLoop {
    fn next_sample(&mut self) -> f32 {
        if self.cursor == BLOCK_SIZE {
            (self.render_block)(&mut self.block);
            self.cursor = 0;
        }
        let sample = self.block[self.cursor];
        self.cursor += 1;
        sample
    }
}

/// Pre-recorded loop decoded from a WAV file, resampled linearly
#[derive(Debug, Clone)]
pub struct WavLoop {
    samples: Vec<f32>,
    /// Source frames advanced per output sample
    step: f64,
    position: f64,
}

impl WavLoop {
    pub fn open(path: &Path, sample_rate: u32) -> AudioResult<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()?
            }
        };

        // Downmix to mono
        let mono = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        log::info!(
            "Music: {} ({} Hz, {} channel(s))",
            path.display(),
            spec.sample_rate,
            spec.channels
        );
        Self::from_samples(mono, spec.sample_rate, sample_rate)
    }

    pub fn from_samples(samples: Vec<f32>, source_rate: u32, target_rate: u32) -> AudioResult<Self> {
        if samples.is_empty() {
            return Err(AudioError::MusicSource("music file has no samples".to_string()));
        }
        if source_rate == 0 || target_rate == 0 {
            return Err(AudioError::MusicSource("sample rate must be > 0".to_string()));
        }
        Ok(Self {
            samples,
            step: source_rate as f64 / target_rate as f64,
            position: 0.0,
        })
    }
}

impl MusicSource for WavLoop {
    fn next_sample(&mut self) -> f32 {
        let len = self.samples.len();
        let index = self.position as usize % len;
        let next = (index + 1) % len;
        let frac = self.position.fract() as f32;
        let sample = self.samples[index] * (1.0 - frac) + self.samples[next] * frac;

        self.position = (self.position + self.step) % len as f64;
        sample
    }
}
