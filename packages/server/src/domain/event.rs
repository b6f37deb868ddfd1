//! Events pushed from the session to participants.

use super::{
    entity::{Participant, SessionState},
    value_object::{Color, DisplayName, MessageContent, ParticipantId, Timestamp},
};

/// Who caused a state change.
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub id: ParticipantId,
    pub color: Color,
}

impl From<&Participant> for Origin {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id.clone(),
            color: participant.color.clone(),
        }
    }
}

/// Single-field change to the audio transport.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioChange {
    Play { current_time: f64 },
    Pause,
    Volume(u8),
    Progress(f64),
    Speed(f64),
    Pitch(f64),
}

impl AudioChange {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Pause => "pause",
            Self::Volume(_) => "volume",
            Self::Progress(_) => "progress",
            Self::Speed(_) => "speed",
            Self::Pitch(_) => "pitch",
        }
    }
}

/// Everything the server can tell a participant.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Sent once to a participant right after it joins.
    FullSync {
        /// The participant receiving the snapshot.
        recipient: ParticipantId,
        state: SessionState,
        participants: Vec<Participant>,
    },
    ParticipantJoined {
        participant: Participant,
        participants: Vec<Participant>,
    },
    ParticipantLeft {
        id: ParticipantId,
        participants: Vec<Participant>,
    },
    CalcUpdate {
        display: String,
        origin: Origin,
        /// Set when the display holds a freshly evaluated result.
        is_result: bool,
    },
    AudioSync {
        change: AudioChange,
        origin: Origin,
    },
    PartySync {
        value: bool,
        origin: Origin,
    },
    ChatBroadcast {
        origin: Origin,
        name: DisplayName,
        message: MessageContent,
        timestamp: Timestamp,
    },
    ChatPrivate {
        from: ParticipantId,
        from_name: DisplayName,
        from_color: Color,
        message: MessageContent,
        timestamp: Timestamp,
        /// True on the copy echoed back to the sender.
        is_me: bool,
    },
}

impl ServerEvent {
    /// Wire topic of the event.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::FullSync { .. } => "sync.full",
            Self::ParticipantJoined { .. } => "participant.joined",
            Self::ParticipantLeft { .. } => "participant.left",
            Self::CalcUpdate { .. } => "calc.update",
            Self::AudioSync { .. } => "audio.sync",
            Self::PartySync { .. } => "party.sync",
            Self::ChatBroadcast { .. } => "chat.broadcast",
            Self::ChatPrivate { .. } => "chat.private",
        }
    }
}
