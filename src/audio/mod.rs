//! Procedural audio: effect synthesis, background music and output backends.
//!
//! Every sound is synthesized at runtime from the declarative catalog; there
//! are no prerecorded effect clips.

mod backend;
mod catalog;
mod engine;
mod export;
mod haptics;
mod music;
mod synthesis;

// Re-export public types
pub use backend::{AudioBackend, AudioOutput, CpalBackend, NullBackend, OfflineBackend};
pub use catalog::{Effect, EffectSpec, ParamPoint, Ramp, Tone, Waveform};
pub use engine::{AudioEngine, AudioState};
pub use export::render_effect_to_wav;
pub use haptics::{HapticSink, LogHaptics};
pub use music::{GlicolLoop, MusicSource, WavLoop};
pub use synthesis::{Graph, SharedGraph};
