//! Sample-level synthesis: oscillators, parameter automation and the mixing graph.
//!
//! ```text
//! effect voices ─────────────────────────────┐
//!                                             ├──▶ master gain ──▶ clip ──▶ output
//! music source ──▶ music gain ──▶ low-pass ──┘
//! ```

use std::collections::VecDeque;
use std::f32::consts::{FRAC_1_SQRT_2, TAU};
use std::sync::Arc;

use cpal::{FromSample, Sample};
use parking_lot::Mutex;

use super::catalog::{Effect, ParamPoint, Ramp, Tone, Waveform};
use super::music::MusicSource;
use crate::params::{audio_constants::OUTPUT_CLIP, AudioParams};

/// Graph shared between the engine and the output callback
pub type SharedGraph = Arc<Mutex<Graph>>;

/// Evaluate an automation curve at `t` seconds after trigger
pub fn param_value(points: &[ParamPoint], t: f32) -> f32 {
    let Some(first) = points.first() else {
        return 0.0;
    };

    let mut prev_t = first.time_s;
    let mut prev_v = first.value;

    for point in points {
        if t >= point.time_s {
            prev_t = point.time_s;
            prev_v = point.value;
            continue;
        }

        let frac = (t - prev_t) / (point.time_s - prev_t);
        return match point.ramp {
            Ramp::Step => prev_v,
            Ramp::Linear => prev_v + (point.value - prev_v) * frac,
            Ramp::Exponential => {
                // Exponential ramps are undefined through zero; hold instead
                if prev_v * point.value <= 0.0 {
                    prev_v
                } else {
                    prev_v * (point.value / prev_v).powf(frac)
                }
            }
        };
    }

    prev_v
}

/// Naive (non band-limited) oscillator output for a phase in [0, 1)
pub fn waveform_sample(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
        Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
    }
}

/// A playing instance of one tone
#[derive(Debug)]
struct Voice {
    tone: &'static Tone,
    trigger_frame: u64,
    phase: f32,
}

impl Voice {
    /// Next sample, or `None` once the tone has stopped
    fn next_sample(&mut self, frame: u64, sample_rate: f32) -> Option<f32> {
        let t = frame.saturating_sub(self.trigger_frame) as f32 / sample_rate;
        if t >= self.tone.stop_s {
            return None;
        }
        if t < self.tone.start_s {
            return Some(0.0);
        }

        let frequency = param_value(self.tone.frequency, t);
        let gain = param_value(self.tone.gain, t);
        let sample = waveform_sample(self.tone.waveform, self.phase) * gain;
        self.phase = (self.phase + frequency / sample_rate).fract();
        Some(sample)
    }
}

/// Second-order low-pass (RBJ cookbook)
#[derive(Debug, Clone)]
pub struct LowPass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPass {
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        // Keep the cutoff safely below Nyquist, whatever the rate
        let cutoff = cutoff_hz.min(sample_rate * 0.45).max(1.0);
        let w0 = TAU * cutoff / sample_rate;
        let alpha = w0.sin() / (2.0 * FRAC_1_SQRT_2);
        let cos_w0 = w0.cos();
        let a0 = 1.0 + alpha;

        Self {
            b0: (1.0 - cos_w0) / 2.0 / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: (1.0 - cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Background music sub-graph: source -> fadeable gain -> low-pass
pub struct MusicChannel {
    source: Option<Box<dyn MusicSource>>,
    gain: f32,
    target: f32,
    /// Per-sample approach coefficient for the current fade
    coeff: f32,
    running: bool,
    stop_at_frame: Option<u64>,
    filter: LowPass,
}

impl MusicChannel {
    fn new(sample_rate: f32, cutoff_hz: f32, source: Option<Box<dyn MusicSource>>) -> Self {
        Self {
            source,
            gain: 0.0,
            target: 0.0,
            coeff: 0.0,
            running: false,
            stop_at_frame: None,
            filter: LowPass::new(sample_rate, cutoff_hz),
        }
    }

    /// Exponential approach towards `target` with time constant `tau_s`
    fn fade_to(&mut self, target: f32, tau_s: f32, sample_rate: f32) {
        self.target = target;
        self.coeff = 1.0 - (-1.0 / (tau_s * sample_rate)).exp();
    }

    fn next_sample(&mut self, frame: u64) -> f32 {
        if self.stop_at_frame.is_some_and(|at| frame >= at) {
            self.running = false;
            self.stop_at_frame = None;
        }

        let raw = match (&mut self.source, self.running) {
            (Some(source), true) => source.next_sample(),
            _ => 0.0,
        };
        self.gain += (self.target - self.gain) * self.coeff;
        self.filter.process(raw * self.gain)
    }
}

/// The synthesis graph: effect voices and the music channel summed into a master gain
pub struct Graph {
    sample_rate: f32,
    frame: u64,
    master_gain: f32,
    voices: VecDeque<Voice>,
    max_voices: usize,
    music: MusicChannel,
    music_level: f32,
    fade_in_s: f32,
    fade_out_s: f32,
    stop_delay_s: f32,
}

impl Graph {
    pub fn new(sample_rate: u32, params: &AudioParams, source: Option<Box<dyn MusicSource>>) -> Self {
        let sample_rate = sample_rate as f32;
        Self {
            sample_rate,
            frame: 0,
            master_gain: params.master_gain,
            voices: VecDeque::new(),
            max_voices: params.max_voices.max(1),
            music: MusicChannel::new(sample_rate, params.music_lowpass_hz, source),
            music_level: params.music_level,
            fade_in_s: params.music_fade_in_s,
            fade_out_s: params.music_fade_out_s,
            stop_delay_s: params.music_stop_delay_s,
        }
    }

    pub fn into_shared(self) -> SharedGraph {
        Arc::new(Mutex::new(self))
    }

    /// Start every tone of an effect at the current graph time
    pub fn trigger(&mut self, effect: Effect) {
        for tone in effect.spec().tones {
            if self.voices.len() == self.max_voices {
                self.voices.pop_front();
            }
            self.voices.push_back(Voice {
                tone,
                trigger_frame: self.frame,
                phase: 0.0,
            });
        }
    }

    /// Start the music source and fade the channel in
    pub fn start_music(&mut self) {
        self.music.running = true;
        self.music.stop_at_frame = None;
        self.music
            .fade_to(self.music_level, self.fade_in_s, self.sample_rate);
    }

    /// Fade the channel out; the source stops once the fade has had time to finish
    pub fn stop_music(&mut self) {
        self.music.fade_to(0.0, self.fade_out_s, self.sample_rate);
        self.music.stop_at_frame = Some(self.frame + (self.stop_delay_s * self.sample_rate) as u64);
    }

    pub fn has_music_source(&self) -> bool {
        self.music.source.is_some()
    }

    /// Whether the music source is currently advancing
    pub fn music_running(&self) -> bool {
        self.music.running
    }

    /// Current music channel gain (linear)
    pub fn music_gain(&self) -> f32 {
        self.music.gain
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate as u32
    }

    /// Graph time in seconds
    pub fn current_time_s(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    /// Produce the next mono output sample
    pub fn next_sample(&mut self) -> f32 {
        let frame = self.frame;
        let sample_rate = self.sample_rate;

        let mut mix = 0.0;
        self.voices.retain_mut(|voice| match voice.next_sample(frame, sample_rate) {
            Some(sample) => {
                mix += sample;
                true
            }
            None => false,
        });
        mix += self.music.next_sample(frame);

        self.frame += 1;
        (mix * self.master_gain).clamp(-OUTPUT_CLIP, OUTPUT_CLIP)
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    pub fn render<T>(&mut self, out: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        for frame in out.chunks_mut(channels.max(1)) {
            let sample = T::from_sample(self.next_sample());
            frame.fill(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::catalog::{EffectSpec, ParamPoint};
    use approx::assert_relative_eq;
    use rustfft::{num_complex::Complex, FftPlanner};

    const SR: u32 = 44_100;

    fn point(time_s: f32, value: f32, ramp: Ramp) -> ParamPoint {
        ParamPoint { time_s, value, ramp }
    }

    /// Constant source for exercising the music channel
    struct Dc;

    impl MusicSource for Dc {
        fn next_sample(&mut self) -> f32 {
            1.0
        }
    }

    fn graph_with_dc() -> Graph {
        let params = AudioParams {
            music_lowpass_hz: 20_000.0,
            ..AudioParams::default()
        };
        Graph::new(SR, &params, Some(Box::new(Dc)))
    }

    fn render_secs(graph: &mut Graph, secs: f32) -> Vec<f32> {
        (0..(secs * SR as f32) as usize).map(|_| graph.next_sample()).collect()
    }

    #[test]
    fn test_linear_ramp() {
        let curve = [point(0.0, 0.1, Ramp::Step), point(0.5, 0.0, Ramp::Linear)];
        assert_relative_eq!(param_value(&curve, 0.0), 0.1);
        assert_relative_eq!(param_value(&curve, 0.25), 0.05, epsilon = 1e-6);
        assert_relative_eq!(param_value(&curve, 1.0), 0.0);
    }

    #[test]
    fn test_exponential_ramp() {
        let curve = [point(0.0, 100.0, Ramp::Step), point(0.1, 40.0, Ramp::Exponential)];
        // Geometric midpoint of 100 and 40
        assert_relative_eq!(param_value(&curve, 0.05), (100.0f32 * 40.0).sqrt(), epsilon = 1e-3);
        assert_relative_eq!(param_value(&curve, 0.2), 40.0);
    }

    #[test]
    fn test_attack_then_decay() {
        let curve = [
            point(0.0, 0.0, Ramp::Step),
            point(0.005, 0.6, Ramp::Linear),
            point(2.5, 0.001, Ramp::Exponential),
        ];
        assert_relative_eq!(param_value(&curve, 0.0025), 0.3, epsilon = 1e-4);
        assert_relative_eq!(param_value(&curve, 0.005), 0.6);
        assert!(param_value(&curve, 1.0) < 0.6);
        assert_relative_eq!(param_value(&curve, 3.0), 0.001);
    }

    #[test]
    fn test_waveforms_bounded() {
        for waveform in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            for i in 0..100 {
                let s = waveform_sample(waveform, i as f32 / 100.0);
                assert!((-1.0..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn test_voices_stop_at_their_own_time() {
        let mut graph = Graph::new(SR, &AudioParams::default(), None);
        graph.trigger(Effect::Click);
        assert_eq!(graph.active_voices(), 4);

        // The thump ends at 0.1s, the partials at 0.15s
        render_secs(&mut graph, 0.12);
        assert_eq!(graph.active_voices(), 3);
        render_secs(&mut graph, 0.05);
        assert_eq!(graph.active_voices(), 0);
    }

    #[test]
    fn test_effect_produces_sound_then_silence() {
        let mut graph = Graph::new(SR, &AudioParams::default(), None);
        graph.trigger(Effect::Slam);

        let samples = render_secs(&mut graph, 1.0);
        let head_peak = samples[..SR as usize / 10].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail_peak = samples[(SR as f32 * 0.7) as usize..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));

        assert!(head_peak > 0.3);
        assert_eq!(tail_peak, 0.0);
    }

    #[test]
    fn test_voice_count_is_bounded() {
        let params = AudioParams {
            max_voices: 5,
            ..AudioParams::default()
        };
        let mut graph = Graph::new(SR, &params, None);
        for _ in 0..10 {
            graph.trigger(Effect::Clink);
        }
        assert_eq!(graph.active_voices(), 5);
    }

    #[test]
    fn test_output_is_clipped() {
        let mut graph = Graph::new(SR, &AudioParams::default(), None);
        for _ in 0..8 {
            graph.trigger(Effect::Slam);
        }
        let samples = render_secs(&mut graph, 0.1);
        assert!(samples.iter().all(|s| s.abs() <= OUTPUT_CLIP));
    }

    #[test]
    fn test_sine_tone_spectral_peak() {
        static TONE: EffectSpec = EffectSpec {
            tones: &[Tone {
                waveform: Waveform::Sine,
                frequency: &[ParamPoint { time_s: 0.0, value: 1000.0, ramp: Ramp::Step }],
                gain: &[ParamPoint { time_s: 0.0, value: 0.5, ramp: Ramp::Step }],
                start_s: 0.0,
                stop_s: 1.0,
            }],
            haptic_ms: &[],
        };

        let fft_size = 4096;
        let mut graph = Graph::new(SR, &AudioParams::default(), None);
        graph.voices.push_back(Voice {
            tone: &TONE.tones[0],
            trigger_frame: 0,
            phase: 0.0,
        });

        let mut buffer: Vec<Complex<f32>> = (0..fft_size)
            .map(|_| Complex::new(graph.next_sample(), 0.0))
            .collect();
        FftPlanner::new().plan_fft_forward(fft_size).process(&mut buffer);

        let peak_bin = buffer[..fft_size / 2]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
            .map(|(i, _)| i)
            .unwrap();
        let peak_hz = peak_bin as f32 * SR as f32 / fft_size as f32;
        assert!((peak_hz - 1000.0).abs() < 2.0 * SR as f32 / fft_size as f32);
    }

    #[test]
    fn test_music_fades_in_and_stops_after_fade_out() {
        let mut graph = graph_with_dc();
        assert!(graph.has_music_source());

        graph.start_music();
        assert!(graph.music_running());
        render_secs(&mut graph, 3.0);
        // ~95% of the way to 0.6 after three time constants
        assert!(graph.music_gain() > 0.55 && graph.music_gain() <= 0.6);

        graph.stop_music();
        render_secs(&mut graph, 0.25);
        assert!(graph.music_running(), "source keeps running during the fade-out");
        render_secs(&mut graph, 0.3);
        assert!(!graph.music_running());
        assert!(graph.music_gain() < 0.6 * 0.5);
    }

    #[test]
    fn test_restart_cancels_pending_stop() {
        let mut graph = graph_with_dc();
        graph.start_music();
        graph.stop_music();
        render_secs(&mut graph, 0.1);
        graph.start_music();
        render_secs(&mut graph, 1.0);
        assert!(graph.music_running());
    }

    #[test]
    fn test_low_pass_survives_tiny_sample_rate() {
        let mut filter = LowPass::new(20.0, 20_000.0);
        assert!(filter.process(1.0).is_finite());

        let mut graph = Graph::new(20, &AudioParams::default(), None);
        graph.trigger(Effect::Click);
        assert!(graph.next_sample().is_finite());
    }

    #[test]
    fn test_render_interleaves_channels() {
        let mut graph = Graph::new(SR, &AudioParams::default(), None);
        graph.trigger(Effect::Drop);
        let mut out = vec![0.0f32; 64];
        graph.render(&mut out, 2);
        for frame in out.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert_relative_eq!(graph.current_time_s(), 32.0 / SR as f64);
    }

    #[test]
    fn test_render_converts_to_integer_samples() {
        let mut float_graph = Graph::new(SR, &AudioParams::default(), None);
        let mut int_graph = Graph::new(SR, &AudioParams::default(), None);
        float_graph.trigger(Effect::Slam);
        int_graph.trigger(Effect::Slam);

        let mut floats = vec![0.0f32; 3 * 256];
        let mut ints = vec![0i16; 3 * 256];
        float_graph.render(&mut floats, 3);
        int_graph.render(&mut ints, 3);

        assert!(ints.iter().any(|&s| s != 0));
        for (f, i) in floats.chunks(3).zip(ints.chunks(3)) {
            assert!(i.iter().all(|&s| s == i[0]));
            assert_eq!(i[0], i16::from_sample(f[0]));
        }
    }
}
