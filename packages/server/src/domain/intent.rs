//! Inbound intents, after boundary decoding.
//!
//! Payload fields stay optional here: a missing or mistyped value is a
//! rule-level concern (default substituted or intent dropped), not a
//! transport failure.

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Input { token: Option<String> },
    Evaluate { expression: Option<String> },
    Clear,
    AudioPlay { current_time: Option<f64> },
    AudioPause,
    AudioVolume { value: Option<f64> },
    AudioProgress { value: Option<f64> },
    AudioSpeed { value: Option<f64> },
    AudioPitch { value: Option<f64> },
    PartyToggle { value: Option<bool> },
    ChatBroadcast { message: Option<String> },
    ChatPrivate {
        to: Option<String>,
        message: Option<String>,
    },
    Heartbeat,
}

impl Intent {
    /// Wire topic the intent arrived on.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Evaluate { .. } => "evaluate",
            Self::Clear => "clear",
            Self::AudioPlay { .. } => "audio.play",
            Self::AudioPause => "audio.pause",
            Self::AudioVolume { .. } => "audio.volume",
            Self::AudioProgress { .. } => "audio.progress",
            Self::AudioSpeed { .. } => "audio.speed",
            Self::AudioPitch { .. } => "audio.pitch",
            Self::PartyToggle { .. } => "party.toggle",
            Self::ChatBroadcast { .. } => "chat.broadcast",
            Self::ChatPrivate { .. } => "chat.private",
            Self::Heartbeat => "heartbeat",
        }
    }
}
