//! Choreography delays (all in milliseconds).

use serde::{Deserialize, Serialize};

use crate::timeline::Millis;

/// Delays for every scheduled step of the experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Cross-fade between two stages
    pub transition_ms: Millis,

    /// Correct numeric answer -> next step
    pub step_advance_ms: Millis,

    /// How long a wrong answer keeps the error flag
    pub error_flash_ms: Millis,

    /// Final code accepted -> unlock tone
    pub unlock_tone_ms: Millis,

    /// Unlock tone -> slam tone + advance
    pub unlock_slam_ms: Millis,

    /// Tag clicked -> clip paused
    pub tag_pause_ms: Millis,

    /// Final stage activated -> door slams
    pub door_slam_ms: Millis,

    /// Slam -> handle spins
    pub door_unlock_ms: Millis,

    /// Handle spins -> door opens
    pub door_open_ms: Millis,

    /// Door opens -> confetti + audio panel
    pub door_celebrate_ms: Millis,

    /// Bump animation after a cheers click
    pub bump_ms: Millis,

    /// Toast display after a cheers click
    pub toast_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            transition_ms: 200,
            step_advance_ms: 500,
            error_flash_ms: 300,
            unlock_tone_ms: 300,
            unlock_slam_ms: 1000,
            tag_pause_ms: 500,
            door_slam_ms: 300,
            door_unlock_ms: 1000,
            door_open_ms: 1000,
            door_celebrate_ms: 1000,
            bump_ms: 400,
            toast_ms: 2000,
        }
    }
}
