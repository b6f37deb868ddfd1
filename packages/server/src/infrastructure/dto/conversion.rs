//! Conversion logic between DTOs and domain types.

use serde_json::Value;

use tandem_shared::time::timestamp_to_rfc3339;

use crate::domain::{AudioChange, Intent, Participant, ServerEvent, SessionState};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

/// Numbers are accepted as JSON numbers or numeric strings; anything
/// non-finite counts as missing.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(value: &Value) -> Option<bool> {
    value.as_bool()
}

impl From<dto::InboundMessage> for Intent {
    fn from(message: dto::InboundMessage) -> Self {
        use dto::InboundMessage as M;

        match message {
            M::Input { value } => Intent::Input {
                token: text(&value),
            },
            M::Evaluate { expression } => Intent::Evaluate {
                expression: text(&expression),
            },
            M::Clear => Intent::Clear,
            M::AudioPlay { current_time } => Intent::AudioPlay {
                current_time: number(&current_time),
            },
            M::AudioPause => Intent::AudioPause,
            M::AudioVolume { value } => Intent::AudioVolume {
                value: number(&value),
            },
            M::AudioProgress { value } => Intent::AudioProgress {
                value: number(&value),
            },
            M::AudioSpeed { value } => Intent::AudioSpeed {
                value: number(&value),
            },
            M::AudioPitch { value } => Intent::AudioPitch {
                value: number(&value),
            },
            M::PartyToggle { value } => Intent::PartyToggle {
                value: flag(&value),
            },
            M::ChatBroadcast { message } => Intent::ChatBroadcast {
                message: text(&message),
            },
            M::ChatPrivate { to, message } => Intent::ChatPrivate {
                to: text(&to),
                message: text(&message),
            },
            M::Heartbeat => Intent::Heartbeat,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Participant> for dto::ParticipantInfo {
    fn from(model: &Participant) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            name: model.name.as_str().to_string(),
            color: model.color.as_str().to_string(),
            connected_at: model.connected_at.value(),
            last_active_at: model.last_active_at.value(),
        }
    }
}

impl From<&SessionState> for dto::SessionStateInfo {
    fn from(model: &SessionState) -> Self {
        Self {
            display: model.display.clone(),
            audio: dto::AudioInfo {
                is_playing: model.audio.is_playing,
                current_time: model.audio.current_time,
                volume: model.audio.volume,
                speed: model.audio.speed,
                pitch: model.audio.pitch,
            },
            party_mode: model.party_mode,
        }
    }
}

impl From<&AudioChange> for dto::AudioAction {
    fn from(model: &AudioChange) -> Self {
        match *model {
            AudioChange::Play { current_time } => Self::Play { current_time },
            AudioChange::Pause => Self::Pause,
            AudioChange::Volume(volume) => Self::Volume { volume },
            AudioChange::Progress(current_time) => Self::Progress { current_time },
            AudioChange::Speed(speed) => Self::Speed { speed },
            AudioChange::Pitch(pitch) => Self::Pitch { pitch },
        }
    }
}

pub fn participant_map(participants: &[Participant]) -> dto::ParticipantMap {
    participants
        .iter()
        .map(|p| (p.id.as_str().to_string(), dto::ParticipantInfo::from(p)))
        .collect()
}

impl From<&ServerEvent> for dto::OutboundMessage {
    fn from(event: &ServerEvent) -> Self {
        use dto::{MessageType, OutboundMessage as O};

        match event {
            ServerEvent::FullSync {
                recipient,
                state,
                participants,
            } => O::SyncFull(dto::SyncFullMessage {
                r#type: MessageType::SyncFull,
                self_id: recipient.as_str().to_string(),
                session_state: state.into(),
                participants: participant_map(participants),
            }),
            ServerEvent::ParticipantJoined {
                participant,
                participants,
            } => O::ParticipantJoined(dto::ParticipantJoinedMessage {
                r#type: MessageType::ParticipantJoined,
                id: participant.id.as_str().to_string(),
                name: participant.name.as_str().to_string(),
                color: participant.color.as_str().to_string(),
                participants: participant_map(participants),
            }),
            ServerEvent::ParticipantLeft { id, participants } => {
                O::ParticipantLeft(dto::ParticipantLeftMessage {
                    r#type: MessageType::ParticipantLeft,
                    id: id.as_str().to_string(),
                    participants: participant_map(participants),
                })
            }
            ServerEvent::CalcUpdate {
                display,
                origin,
                is_result,
            } => O::CalcUpdate(dto::CalcUpdateMessage {
                r#type: MessageType::CalcUpdate,
                display: display.clone(),
                origin_id: origin.id.as_str().to_string(),
                origin_color: origin.color.as_str().to_string(),
                is_result: is_result.then_some(true),
            }),
            ServerEvent::AudioSync { change, origin } => O::AudioSync(dto::AudioSyncMessage {
                r#type: MessageType::AudioSync,
                action: change.into(),
                origin_id: origin.id.as_str().to_string(),
                origin_color: origin.color.as_str().to_string(),
            }),
            ServerEvent::PartySync { value, origin } => O::PartySync(dto::PartySyncMessage {
                r#type: MessageType::PartySync,
                value: *value,
                origin_id: origin.id.as_str().to_string(),
                origin_color: origin.color.as_str().to_string(),
            }),
            ServerEvent::ChatBroadcast {
                origin,
                name,
                message,
                timestamp,
            } => O::ChatBroadcast(dto::ChatBroadcastMessage {
                r#type: MessageType::ChatBroadcast,
                origin_id: origin.id.as_str().to_string(),
                name: name.as_str().to_string(),
                color: origin.color.as_str().to_string(),
                message: message.as_str().to_string(),
                timestamp: timestamp.value(),
            }),
            ServerEvent::ChatPrivate {
                from,
                from_name,
                from_color,
                message,
                timestamp,
                is_me,
            } => O::ChatPrivate(dto::ChatPrivateMessage {
                r#type: MessageType::ChatPrivate,
                from: from.as_str().to_string(),
                from_name: from_name.as_str().to_string(),
                from_color: from_color.as_str().to_string(),
                message: message.as_str().to_string(),
                timestamp: timestamp.value(),
                is_me: *is_me,
            }),
        }
    }
}

// ========================================
// Domain → HTTP DTO
// ========================================

impl From<&Participant> for http::ParticipantDetailDto {
    fn from(model: &Participant) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            name: model.name.as_str().to_string(),
            color: model.color.as_str().to_string(),
            connected_at: timestamp_to_rfc3339(model.connected_at.value()),
            last_active_at: timestamp_to_rfc3339(model.last_active_at.value()),
        }
    }
}

pub fn session_detail(state: &SessionState, participants: &[Participant]) -> http::SessionDetailDto {
    http::SessionDetailDto {
        session_state: dto::SessionStateInfo::from(state),
        participants: participants
            .iter()
            .map(http::ParticipantDetailDto::from)
            .collect(),
    }
}

/// Encode an event as a JSON text frame.
pub fn encode_event(event: &ServerEvent) -> serde_json::Result<String> {
    serde_json::to_string(&dto::OutboundMessage::from(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Color, DisplayName, MessageContent, Origin, ParticipantId, Timestamp};
    use serde_json::json;

    fn participant(id: &str) -> Participant {
        Participant::new(
            ParticipantId::new(id.to_string()).unwrap(),
            DisplayName::new("User_7"),
            Color::new("hsl(10, 100%, 60%)"),
            Timestamp::new(1_000),
        )
    }

    fn decode(frame: &str) -> Intent {
        serde_json::from_str::<dto::InboundMessage>(frame)
            .expect("frame should decode")
            .into()
    }

    fn encode(event: &ServerEvent) -> Value {
        serde_json::from_str(&encode_event(event).unwrap()).unwrap()
    }

    #[test]
    fn test_inbound_topics_decode() {
        // テスト項目: 各トピックがドメインの Intent に変換される
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert_eq!(
            decode(r#"{"type":"input","value":"7"}"#),
            Intent::Input {
                token: Some("7".to_string())
            }
        );
        assert_eq!(decode(r#"{"type":"clear"}"#), Intent::Clear);
        assert_eq!(decode(r#"{"type":"heartbeat"}"#), Intent::Heartbeat);
        assert_eq!(
            decode(r#"{"type":"audio.play","currentTime":3.5}"#),
            Intent::AudioPlay {
                current_time: Some(3.5)
            }
        );
        assert_eq!(
            decode(r#"{"type":"audio.play"}"#),
            Intent::AudioPlay { current_time: None }
        );
        assert_eq!(
            decode(r#"{"type":"party.toggle","value":true}"#),
            Intent::PartyToggle { value: Some(true) }
        );
        assert_eq!(
            decode(r#"{"type":"chat.private","to":"bob","message":"hi"}"#),
            Intent::ChatPrivate {
                to: Some("bob".to_string()),
                message: Some("hi".to_string()),
            }
        );
    }

    #[test]
    fn test_inbound_lenient_values() {
        // テスト項目: 型の違う値は None になり、数値文字列は数値として扱われる
        // given (前提条件):

        // when (操作) / then (期待する結果):
        assert_eq!(
            decode(r#"{"type":"audio.volume","value":"80"}"#),
            Intent::AudioVolume { value: Some(80.0) }
        );
        assert_eq!(
            decode(r#"{"type":"audio.progress","value":"abc"}"#),
            Intent::AudioProgress { value: None }
        );
        assert_eq!(
            decode(r#"{"type":"audio.speed","value":null}"#),
            Intent::AudioSpeed { value: None }
        );
        assert_eq!(
            decode(r#"{"type":"party.toggle","value":"yes"}"#),
            Intent::PartyToggle { value: None }
        );
        assert_eq!(
            decode(r#"{"type":"input","value":5}"#),
            Intent::Input {
                token: Some("5".to_string())
            }
        );
    }

    #[test]
    fn test_inbound_unknown_topic_fails() {
        // テスト項目: 未知のトピックはデコードエラーになる
        // given (前提条件):
        let frame = r#"{"type":"calc:input","value":"1"}"#;

        // when (操作):
        let result = serde_json::from_str::<dto::InboundMessage>(frame);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_calc_update_omits_is_result_when_false() {
        // テスト項目: 編集中の calc.update には isResult が含まれない
        // given (前提条件):
        let origin = Origin::from(&participant("alice"));

        // when (操作):
        let editing = encode(&ServerEvent::CalcUpdate {
            display: "12".to_string(),
            origin: origin.clone(),
            is_result: false,
        });
        let result = encode(&ServerEvent::CalcUpdate {
            display: "4".to_string(),
            origin,
            is_result: true,
        });

        // then (期待する結果):
        assert_eq!(
            editing,
            json!({
                "type": "calc.update",
                "display": "12",
                "originId": "alice",
                "originColor": "hsl(10, 100%, 60%)"
            })
        );
        assert_eq!(result["isResult"], json!(true));
    }

    #[test]
    fn test_encode_audio_sync_flattens_action() {
        // テスト項目: audio.sync は action と対応するフィールドを持つ
        // given (前提条件):
        let origin = Origin::from(&participant("alice"));

        // when (操作):
        let volume = encode(&ServerEvent::AudioSync {
            change: AudioChange::Volume(80),
            origin: origin.clone(),
        });
        let pause = encode(&ServerEvent::AudioSync {
            change: AudioChange::Pause,
            origin,
        });

        // then (期待する結果):
        assert_eq!(
            volume,
            json!({
                "type": "audio.sync",
                "action": "volume",
                "volume": 80,
                "originId": "alice",
                "originColor": "hsl(10, 100%, 60%)"
            })
        );
        assert_eq!(pause["action"], json!("pause"));
        assert!(pause.get("volume").is_none());
    }

    #[test]
    fn test_encode_sync_full() {
        // テスト項目: sync.full に状態と参加者マップが含まれる
        // given (前提条件):
        let alice = participant("alice");

        // when (操作):
        let frame = encode(&ServerEvent::FullSync {
            recipient: alice.id.clone(),
            state: SessionState::default(),
            participants: vec![alice],
        });

        // then (期待する結果):
        assert_eq!(frame["type"], json!("sync.full"));
        assert_eq!(frame["selfId"], json!("alice"));
        assert_eq!(frame["sessionState"]["display"], json!("0"));
        assert_eq!(frame["sessionState"]["audio"]["volume"], json!(50));
        assert_eq!(frame["sessionState"]["partyMode"], json!(false));
        assert_eq!(frame["participants"]["alice"]["name"], json!("User_7"));
        assert_eq!(frame["participants"]["alice"]["lastActiveAt"], json!(1_000));
    }

    #[test]
    fn test_encode_chat_private() {
        // テスト項目: chat.private のフィールド名がクライアントの期待通り
        // given (前提条件):
        let alice = participant("alice");

        // when (操作):
        let frame = encode(&ServerEvent::ChatPrivate {
            from: alice.id.clone(),
            from_name: alice.name.clone(),
            from_color: alice.color.clone(),
            message: MessageContent::new("psst".to_string()).unwrap(),
            timestamp: Timestamp::new(42),
            is_me: true,
        });

        // then (期待する結果):
        assert_eq!(
            frame,
            json!({
                "type": "chat.private",
                "from": "alice",
                "fromName": "User_7",
                "fromColor": "hsl(10, 100%, 60%)",
                "message": "psst",
                "timestamp": 42,
                "isMe": true
            })
        );
    }

    #[test]
    fn test_session_detail_renders_rfc3339_timestamps() {
        // テスト項目: HTTP 用 DTO ではタイムスタンプが RFC 3339 で表現される
        // given (前提条件):
        let state = SessionState::default();
        let participants = vec![participant("alice")];

        // when (操作):
        let detail = session_detail(&state, &participants);
        let json = serde_json::to_value(&detail).unwrap();

        // then (期待する結果):
        assert_eq!(json["sessionState"]["display"], "0");
        assert_eq!(json["participants"][0]["id"], "alice");
        assert_eq!(
            json["participants"][0]["connectedAt"],
            "1970-01-01T00:00:01+00:00"
        );
    }
}
