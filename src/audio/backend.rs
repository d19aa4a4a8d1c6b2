//! Audio output backends.
//!
//! A backend opens an output (device + format) and, once the graph has been
//! built at the output's sample rate, starts pulling samples from it.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};

use super::synthesis::SharedGraph;
use crate::error::{AudioError, AudioResult};

/// An opened output waiting for (or driving) a graph
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Start pulling samples from `graph`
    fn start(&mut self, graph: SharedGraph) -> AudioResult<()>;
}

/// Host audio capability
pub trait AudioBackend {
    fn name(&self) -> &'static str;

    fn open(&self) -> AudioResult<Box<dyn AudioOutput>>;
}

/// Default system output through cpal
#[derive(Debug, Default)]
pub struct CpalBackend;

impl AudioBackend for CpalBackend {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioOutput>> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?;

        log::info!(
            "Audio: {} @ {}Hz ({} channel(s), {:?})",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate().0,
            config.channels(),
            config.sample_format()
        );

        Ok(Box::new(CpalOutput {
            device,
            config,
            stream: None,
        }))
    }
}

/// cpal device plus the stream kept alive once started
pub struct CpalOutput {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalOutput {
    fn build_stream<T>(&self, graph: SharedGraph) -> AudioResult<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let config: cpal::StreamConfig = self.config.clone().into();
        let channels = config.channels.max(1) as usize;

        self.device
            .build_output_stream(
                &config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    graph.lock().render(data, channels);
                },
                |err| log::warn!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamBuildError(e.to_string()))
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate().0
    }

    fn start(&mut self, graph: SharedGraph) -> AudioResult<()> {
        let stream = match self.config.sample_format() {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(graph)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(graph)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(graph)?,
            other => {
                return Err(AudioError::ConfigError(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| AudioError::StreamError(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }
}

/// Output that nobody pulls from; the caller renders the graph by hand
#[derive(Debug, Clone)]
pub struct OfflineBackend {
    pub sample_rate: u32,
}

impl OfflineBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl AudioBackend for OfflineBackend {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioOutput>> {
        Ok(Box::new(OfflineOutput {
            sample_rate: self.sample_rate,
        }))
    }
}

struct OfflineOutput {
    sample_rate: u32,
}

impl AudioOutput for OfflineOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // Rendering is driven through the engine's graph handle
    fn start(&mut self, _graph: SharedGraph) -> AudioResult<()> {
        Ok(())
    }
}

/// A host without audio capability
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn open(&self) -> AudioResult<Box<dyn AudioOutput>> {
        Err(AudioError::NoDevice)
    }
}
