//! Offline rendering of effects to WAV files.

use std::path::Path;

use super::catalog::Effect;
use super::synthesis::Graph;
use crate::error::AudioResult;
use crate::params::AudioParams;

/// Silence appended after the last tone stops (seconds)
const TAIL_S: f32 = 0.05;

/// Render one effect through a fresh graph into a mono 32-bit float WAV.
/// Returns the number of frames written.
pub fn render_effect_to_wav(effect: Effect, path: &Path, params: &AudioParams) -> AudioResult<usize> {
    let sample_rate = params.offline_sample_rate_hz;
    let mut graph = Graph::new(sample_rate, params, None);
    graph.trigger(effect);

    let frames = ((effect.spec().duration_s() + TAIL_S) * sample_rate as f32).ceil() as usize;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for _ in 0..frames {
        writer.write_sample(graph.next_sample())?;
    }
    writer.finalize()?;

    log::info!("Rendered {} ({} frames) to {}", effect, frames, path.display());
    Ok(frames)
}
