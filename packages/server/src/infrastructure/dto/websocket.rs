//! WebSocket message DTOs.
//!
//! Every frame is a JSON object whose `type` field names the topic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Topic names of outbound frames.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageType {
    #[serde(rename = "sync.full")]
    SyncFull,
    #[serde(rename = "participant.joined")]
    ParticipantJoined,
    #[serde(rename = "participant.left")]
    ParticipantLeft,
    #[serde(rename = "calc.update")]
    CalcUpdate,
    #[serde(rename = "audio.sync")]
    AudioSync,
    #[serde(rename = "party.sync")]
    PartySync,
    #[serde(rename = "chat.broadcast")]
    ChatBroadcast,
    #[serde(rename = "chat.private")]
    ChatPrivate,
}

/// Client → server frames.
///
/// Payload fields are kept as raw JSON values; they are validated when
/// converted to domain intents so that a mistyped field never drops the
/// connection.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "input")]
    Input {
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "evaluate")]
    Evaluate {
        #[serde(default)]
        expression: Value,
    },
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "audio.play")]
    AudioPlay {
        #[serde(default, rename = "currentTime")]
        current_time: Value,
    },
    #[serde(rename = "audio.pause")]
    AudioPause,
    #[serde(rename = "audio.volume")]
    AudioVolume {
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "audio.progress")]
    AudioProgress {
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "audio.speed")]
    AudioSpeed {
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "audio.pitch")]
    AudioPitch {
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "party.toggle")]
    PartyToggle {
        #[serde(default)]
        value: Value,
    },
    #[serde(rename = "chat.broadcast")]
    ChatBroadcast {
        #[serde(default)]
        message: Value,
    },
    #[serde(rename = "chat.private")]
    ChatPrivate {
        #[serde(default)]
        to: Value,
        #[serde(default)]
        message: Value,
    },
    #[serde(rename = "heartbeat")]
    Heartbeat,
}

/// Participant as seen by clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub id: String,
    pub name: String,
    pub color: String,
    pub connected_at: i64,
    pub last_active_at: i64,
}

/// Participants keyed by id.
pub type ParticipantMap = BTreeMap<String, ParticipantInfo>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioInfo {
    pub is_playing: bool,
    pub current_time: f64,
    pub volume: u8,
    pub speed: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStateInfo {
    pub display: String,
    pub audio: AudioInfo,
    pub party_mode: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncFullMessage {
    pub r#type: MessageType,
    /// Id assigned to the receiving connection.
    pub self_id: String,
    pub session_state: SessionStateInfo,
    pub participants: ParticipantMap,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParticipantJoinedMessage {
    pub r#type: MessageType,
    pub id: String,
    pub name: String,
    pub color: String,
    pub participants: ParticipantMap,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParticipantLeftMessage {
    pub r#type: MessageType,
    pub id: String,
    pub participants: ParticipantMap,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalcUpdateMessage {
    pub r#type: MessageType,
    pub display: String,
    pub origin_id: String,
    pub origin_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_result: Option<bool>,
}

/// Field carried by an `audio.sync` frame, tagged by `action`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AudioAction {
    Play {
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
    Pause,
    Volume {
        volume: u8,
    },
    Progress {
        #[serde(rename = "currentTime")]
        current_time: f64,
    },
    Speed {
        speed: f64,
    },
    Pitch {
        pitch: f64,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioSyncMessage {
    pub r#type: MessageType,
    #[serde(flatten)]
    pub action: AudioAction,
    pub origin_id: String,
    pub origin_color: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartySyncMessage {
    pub r#type: MessageType,
    pub value: bool,
    pub origin_id: String,
    pub origin_color: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatBroadcastMessage {
    pub r#type: MessageType,
    pub origin_id: String,
    pub name: String,
    pub color: String,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatPrivateMessage {
    pub r#type: MessageType,
    pub from: String,
    pub from_name: String,
    pub from_color: String,
    pub message: String,
    pub timestamp: i64,
    pub is_me: bool,
}

/// Any server → client frame.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum OutboundMessage {
    SyncFull(SyncFullMessage),
    ParticipantJoined(ParticipantJoinedMessage),
    ParticipantLeft(ParticipantLeftMessage),
    CalcUpdate(CalcUpdateMessage),
    AudioSync(AudioSyncMessage),
    PartySync(PartySyncMessage),
    ChatBroadcast(ChatBroadcastMessage),
    ChatPrivate(ChatPrivateMessage),
}
