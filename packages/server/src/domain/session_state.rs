//! Shared state store.
//!
//! Holds the one authoritative [`SessionState`]. Readers get copies; writes
//! go through the typed setters, which validate and normalize their input
//! so that the value stored is always the value broadcast.

use super::{entity::SessionState, error::DomainError};

#[derive(Debug, Clone, Default)]
pub struct SharedStateStore {
    state: SessionState,
}

impl SharedStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy of the current state.
    pub fn get(&self) -> SessionState {
        self.state.clone()
    }

    pub fn display(&self) -> &str {
        &self.state.display
    }

    pub fn set_display(&mut self, display: String) -> Result<&str, DomainError> {
        if display.is_empty() {
            return Err(DomainError::malformed("display", "display must not be empty"));
        }
        self.state.display = display;
        Ok(&self.state.display)
    }

    /// Start or stop playback. `current_time` of `None` keeps the position.
    pub fn set_audio_transport(
        &mut self,
        is_playing: bool,
        current_time: Option<f64>,
    ) -> Result<(), DomainError> {
        let current_time = current_time
            .map(|t| normalize_position("audio.transport", t))
            .transpose()?;
        self.state.audio.is_playing = is_playing;
        if let Some(t) = current_time {
            self.state.audio.current_time = t;
        }
        Ok(())
    }

    /// Clamp to `[0, 100]` and round to the nearest integer.
    pub fn set_audio_volume(&mut self, volume: f64) -> Result<u8, DomainError> {
        if volume.is_nan() {
            return Err(DomainError::malformed("audio.volume", "volume is not a number"));
        }
        let volume = volume.clamp(0.0, 100.0).round() as u8;
        self.state.audio.volume = volume;
        Ok(volume)
    }

    pub fn set_audio_progress(&mut self, current_time: f64) -> Result<f64, DomainError> {
        let current_time = normalize_position("audio.progress", current_time)?;
        self.state.audio.current_time = current_time;
        Ok(current_time)
    }

    pub fn set_audio_speed(&mut self, speed: f64) -> Result<f64, DomainError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(DomainError::malformed(
                "audio.speed",
                format!("speed must be a positive number, got {speed}"),
            ));
        }
        self.state.audio.speed = speed;
        Ok(speed)
    }

    pub fn set_audio_pitch(&mut self, pitch: f64) -> Result<f64, DomainError> {
        if !pitch.is_finite() {
            return Err(DomainError::malformed("audio.pitch", "pitch must be finite"));
        }
        self.state.audio.pitch = pitch;
        Ok(pitch)
    }

    pub fn set_party_mode(&mut self, enabled: bool) -> bool {
        self.state.party_mode = enabled;
        enabled
    }
}

/// Playback positions must be finite; negatives clamp to the start.
fn normalize_position(intent: &'static str, value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() {
        return Err(DomainError::malformed(intent, "position must be finite"));
    }
    Ok(value.max(0.0))
}
