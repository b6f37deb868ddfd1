//! Domain entities: participants and the shared session state.

use super::value_object::{Color, DisplayName, ParticipantId, Timestamp};

/// A connected client.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: DisplayName,
    pub color: Color,
    pub connected_at: Timestamp,
    /// Refreshed by every inbound intent, heartbeats included.
    pub last_active_at: Timestamp,
}

impl Participant {
    pub fn new(id: ParticipantId, name: DisplayName, color: Color, now: Timestamp) -> Self {
        Self {
            id,
            name,
            color,
            connected_at: now,
            last_active_at: now,
        }
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.last_active_at = now;
    }

    /// Whether the participant has been silent for strictly longer than
    /// `threshold_ms` at `now`.
    pub fn is_idle(&self, threshold_ms: i64, now: Timestamp) -> bool {
        self.last_active_at.millis_until(now) > threshold_ms
    }
}

/// Audio player transport shared by every participant.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTransport {
    pub is_playing: bool,
    /// Playback position in seconds, never negative.
    pub current_time: f64,
    /// Volume in `[0, 100]`.
    pub volume: u8,
    /// Playback rate, strictly positive.
    pub speed: f64,
    pub pitch: f64,
}

impl Default for AudioTransport {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            volume: 50,
            speed: 1.0,
            pitch: 0.0,
        }
    }
}

/// The single piece of state every participant observes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Calculator display. Never empty.
    pub display: String,
    pub audio: AudioTransport,
    pub party_mode: bool,
}

impl SessionState {
    pub const INITIAL_DISPLAY: &'static str = "0";
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            display: Self::INITIAL_DISPLAY.to_string(),
            audio: AudioTransport::default(),
            party_mode: false,
        }
    }
}
