//! Lazily initialised audio engine.
//!
//! The engine starts `Uninitialized`. The first qualifying user interaction
//! calls [`AudioEngine::initialize`], which either builds the graph (`Ready`)
//! or records that the host has no audio (`Unavailable`). Every other call is
//! a silent no-op unless the engine is `Ready`.

use std::sync::Arc;

use super::backend::{AudioBackend, AudioOutput};
use super::catalog::Effect;
use super::haptics::HapticSink;
use super::music::build_source;
use super::synthesis::{Graph, SharedGraph};
use crate::error::AudioResult;
use crate::params::AudioParams;

/// Observable lifecycle of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Uninitialized,
    Ready,
    Unavailable,
}

enum Lifecycle {
    Uninitialized,
    Ready {
        graph: SharedGraph,
        /// Output stream (kept alive)
        _output: Box<dyn AudioOutput>,
    },
    Unavailable,
}

/// Effect triggers and background music over a single synthesis graph
pub struct AudioEngine {
    backend: Box<dyn AudioBackend>,
    haptics: Box<dyn HapticSink>,
    params: AudioParams,
    lifecycle: Lifecycle,
    music_playing: bool,
}

impl AudioEngine {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        haptics: Box<dyn HapticSink>,
        params: AudioParams,
    ) -> Self {
        Self {
            backend,
            haptics,
            params,
            lifecycle: Lifecycle::Uninitialized,
            music_playing: false,
        }
    }

    /// Build the graph once; later calls return the current state unchanged
    pub fn initialize(&mut self) -> AudioState {
        if !matches!(self.lifecycle, Lifecycle::Uninitialized) {
            return self.state();
        }

        self.lifecycle = match self.open_graph() {
            Ok((graph, output)) => {
                log::info!("Audio ready ({} backend)", self.backend.name());
                Lifecycle::Ready {
                    graph,
                    _output: output,
                }
            }
            Err(e) => {
                log::warn!("Audio unavailable, continuing silently: {}", e);
                Lifecycle::Unavailable
            }
        };
        self.state()
    }

    fn open_graph(&self) -> AudioResult<(SharedGraph, Box<dyn AudioOutput>)> {
        let mut output = self.backend.open()?;
        let sample_rate = output.sample_rate();

        // A broken music source must not take the effects down with it
        let source = match build_source(&self.params.music, sample_rate) {
            Ok(source) => Some(source),
            Err(e) => {
                log::warn!("Background music disabled: {}", e);
                None
            }
        };

        let graph = Graph::new(sample_rate, &self.params, source).into_shared();
        output.start(Arc::clone(&graph))?;
        Ok((graph, output))
    }

    pub fn state(&self) -> AudioState {
        match self.lifecycle {
            Lifecycle::Uninitialized => AudioState::Uninitialized,
            Lifecycle::Ready { .. } => AudioState::Ready,
            Lifecycle::Unavailable => AudioState::Unavailable,
        }
    }

    /// Handle to the graph, if the engine is ready
    pub fn graph(&self) -> Option<SharedGraph> {
        match &self.lifecycle {
            Lifecycle::Ready { graph, .. } => Some(Arc::clone(graph)),
            _ => None,
        }
    }

    /// Play a named effect and its haptic pattern
    pub fn trigger(&mut self, effect: Effect) {
        let Lifecycle::Ready { graph, .. } = &self.lifecycle else {
            return;
        };

        graph.lock().trigger(effect);
        log::debug!("Effect: {}", effect);

        let pattern = effect.spec().haptic_ms;
        if !pattern.is_empty() {
            self.haptics.vibrate(pattern);
        }
    }

    pub fn play_music(&mut self) {
        let Lifecycle::Ready { graph, .. } = &self.lifecycle else {
            return;
        };
        graph.lock().start_music();
        self.music_playing = true;
        log::info!("Music: playing");
    }

    pub fn pause_music(&mut self) {
        let Lifecycle::Ready { graph, .. } = &self.lifecycle else {
            return;
        };
        graph.lock().stop_music();
        self.music_playing = false;
        log::info!("Music: paused");
    }

    pub fn toggle_music(&mut self) {
        if self.music_playing {
            self.pause_music();
        } else {
            self.play_music();
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }
}
