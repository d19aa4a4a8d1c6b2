//! Best-effort vibration feedback tied to sound effects.

/// Something that can play a vibration pattern (milliseconds on/off/on...)
pub trait HapticSink {
    fn vibrate(&mut self, pattern_ms: &[u32]);
}

/// Hosts without a vibration motor: the pattern is only logged
#[derive(Debug, Default)]
pub struct LogHaptics;

impl HapticSink for LogHaptics {
    fn vibrate(&mut self, pattern_ms: &[u32]) {
        log::debug!("Haptic pulse {:?}", pattern_ms);
    }
}
