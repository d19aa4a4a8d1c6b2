//! Declarative sound effect catalog.
//!
//! Each effect is a list of tones. A tone is one oscillator with a frequency
//! curve, an amplitude envelope and explicit start/stop times relative to the
//! trigger. One generic routine in `synthesis` plays any of them.

use std::fmt;
use std::str::FromStr;

use crate::error::AudioError;

/// Named one-shot effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Click,
    Unlock,
    Slam,
    Grind,
    Drop,
    Clink,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::Click,
        Effect::Unlock,
        Effect::Slam,
        Effect::Grind,
        Effect::Drop,
        Effect::Clink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Effect::Click => "click",
            Effect::Unlock => "unlock",
            Effect::Slam => "slam",
            Effect::Grind => "grind",
            Effect::Drop => "drop",
            Effect::Clink => "clink",
        }
    }

    /// Waveform and envelope description for this effect
    pub fn spec(self) -> &'static EffectSpec {
        match self {
            Effect::Click => &CLICK,
            Effect::Unlock => &UNLOCK,
            Effect::Slam => &SLAM,
            Effect::Grind => &GRIND,
            Effect::Drop => &DROP,
            Effect::Clink => &CLINK,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Effect::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AudioError::UnknownEffect(s.to_string()))
    }
}

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// How a parameter reaches a point from the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Jump at the point's time
    Step,
    Linear,
    Exponential,
}

/// One automation point (time in seconds after trigger)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamPoint {
    pub time_s: f32,
    pub value: f32,
    pub ramp: Ramp,
}

const fn set(time_s: f32, value: f32) -> ParamPoint {
    ParamPoint { time_s, value, ramp: Ramp::Step }
}

const fn lin(time_s: f32, value: f32) -> ParamPoint {
    ParamPoint { time_s, value, ramp: Ramp::Linear }
}

const fn exp(time_s: f32, value: f32) -> ParamPoint {
    ParamPoint { time_s, value, ramp: Ramp::Exponential }
}

/// One oscillator voice of an effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    /// Frequency curve (Hz)
    pub frequency: &'static [ParamPoint],
    /// Amplitude envelope (linear gain)
    pub gain: &'static [ParamPoint],
    pub start_s: f32,
    pub stop_s: f32,
}

/// Full description of an effect: tones plus the haptic pattern that goes with it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    pub tones: &'static [Tone],
    /// Vibration pattern in milliseconds (on, off, on, ...); empty = none
    pub haptic_ms: &'static [u32],
}

impl EffectSpec {
    /// Time until the last tone stops (seconds)
    pub fn duration_s(&self) -> f32 {
        self.tones.iter().map(|t| t.stop_s).fold(0.0, f32::max)
    }
}

// Metallic click: three bright partials plus a low thump
static CLICK: EffectSpec = EffectSpec {
    tones: &[
        Tone {
            waveform: Waveform::Square,
            frequency: &[set(0.0, 800.0)],
            gain: &[set(0.0, 0.1), exp(0.15, 0.001)],
            start_s: 0.0,
            stop_s: 0.15,
        },
        Tone {
            waveform: Waveform::Sine,
            frequency: &[set(0.0, 1200.0)],
            gain: &[set(0.0, 0.05), exp(0.15, 0.001)],
            start_s: 0.0,
            stop_s: 0.15,
        },
        Tone {
            waveform: Waveform::Sine,
            frequency: &[set(0.0, 2400.0)],
            gain: &[set(0.0, 0.1 / 3.0), exp(0.15, 0.001)],
            start_s: 0.0,
            stop_s: 0.15,
        },
        Tone {
            waveform: Waveform::Triangle,
            frequency: &[set(0.0, 100.0), exp(0.1, 40.0)],
            gain: &[set(0.0, 0.5), exp(0.1, 0.001)],
            start_s: 0.0,
            stop_s: 0.1,
        },
    ],
    haptic_ms: &[50],
};

static UNLOCK: EffectSpec = EffectSpec {
    tones: &[Tone {
        waveform: Waveform::Square,
        frequency: &[set(0.0, 60.0)],
        gain: &[set(0.0, 0.1), lin(0.5, 0.0)],
        start_s: 0.0,
        stop_s: 0.5,
    }],
    haptic_ms: &[30, 50, 30],
};

static SLAM: EffectSpec = EffectSpec {
    tones: &[Tone {
        waveform: Waveform::Square,
        frequency: &[set(0.0, 50.0), exp(0.6, 10.0)],
        gain: &[set(0.0, 0.8), exp(0.6, 0.001)],
        start_s: 0.0,
        stop_s: 0.6,
    }],
    haptic_ms: &[200],
};

static GRIND: EffectSpec = EffectSpec {
    tones: &[Tone {
        waveform: Waveform::Sawtooth,
        frequency: &[set(0.0, 40.0)],
        gain: &[set(0.0, 0.05), lin(3.0, 0.0)],
        start_s: 0.0,
        stop_s: 3.0,
    }],
    haptic_ms: &[100],
};

static DROP: EffectSpec = EffectSpec {
    tones: &[Tone {
        waveform: Waveform::Sawtooth,
        frequency: &[set(0.0, 800.0), exp(0.15, 100.0)],
        gain: &[set(0.0, 0.3), exp(0.15, 0.001)],
        start_s: 0.0,
        stop_s: 0.15,
    }],
    haptic_ms: &[],
};

// Glass clink: fundamental, harmonic and a short impact
static CLINK: EffectSpec = EffectSpec {
    tones: &[
        Tone {
            waveform: Waveform::Sine,
            frequency: &[set(0.0, 2200.0)],
            gain: &[set(0.0, 0.0), lin(0.005, 0.6), exp(2.5, 0.001)],
            start_s: 0.0,
            stop_s: 2.5,
        },
        Tone {
            waveform: Waveform::Sine,
            frequency: &[set(0.0, 3600.0)],
            gain: &[set(0.0, 0.0), lin(0.005, 0.3), exp(2.0, 0.001)],
            start_s: 0.0,
            stop_s: 2.5,
        },
        Tone {
            waveform: Waveform::Triangle,
            frequency: &[set(0.0, 500.0)],
            gain: &[set(0.0, 0.0), lin(0.001, 0.4), exp(0.05, 0.001)],
            start_s: 0.0,
            stop_s: 0.05,
        },
    ],
    haptic_ms: &[30],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_names_round_trip() {
        for effect in Effect::ALL {
            assert_eq!(effect.name().parse::<Effect>().unwrap(), effect);
        }
        assert!("kaboom".parse::<Effect>().is_err());
        assert_eq!("CLINK".parse::<Effect>().unwrap(), Effect::Clink);
    }

    #[test]
    fn test_effect_durations() {
        assert!(Effect::Click.spec().duration_s() <= 0.15);
        assert_eq!(Effect::Unlock.spec().duration_s(), 0.5);
        assert_eq!(Effect::Slam.spec().duration_s(), 0.6);
        assert_eq!(Effect::Grind.spec().duration_s(), 3.0);
        assert_eq!(Effect::Drop.spec().duration_s(), 0.15);
        assert_eq!(Effect::Clink.spec().duration_s(), 2.5);
    }

    #[test]
    fn test_catalog_shapes() {
        assert_eq!(Effect::Click.spec().tones.len(), 4);
        assert_eq!(Effect::Clink.spec().tones.len(), 3);
        assert_eq!(Effect::Unlock.spec().haptic_ms, &[30, 50, 30]);
        assert!(Effect::Drop.spec().haptic_ms.is_empty());

        // Every tone stops after it starts and its automation is time ordered
        for effect in Effect::ALL {
            for tone in effect.spec().tones {
                assert!(tone.stop_s > tone.start_s, "{effect}");
                for curve in [tone.frequency, tone.gain] {
                    assert!(curve.windows(2).all(|w| w[0].time_s <= w[1].time_s));
                }
            }
        }
    }
}
