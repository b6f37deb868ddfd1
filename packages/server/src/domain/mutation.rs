//! Mutation handlers.
//!
//! Pure functions: given the store, the issuing participant and an intent,
//! validate the payload, apply it and describe what must be delivered.
//! Liveness is refreshed by the caller before a handler runs.

use super::{
    calculator,
    entity::{Participant, SessionState},
    error::DomainError,
    event::{AudioChange, Origin, ServerEvent},
    intent::Intent,
    session_state::SharedStateStore,
    value_object::{MessageContent, ParticipantId, Timestamp},
};

/// What a handled intent asks the router to deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Deliver to every participant, the origin included.
    Broadcast(ServerEvent),
    /// Deliver to one recipient and echo to the sender.
    Private {
        from: Participant,
        to: ParticipantId,
        message: MessageContent,
        timestamp: Timestamp,
    },
    /// Nothing to deliver (heartbeat).
    Silent,
}

/// Apply one intent from `origin` to the store.
///
/// # Errors
///
/// [`DomainError::MalformedIntent`] when the payload cannot be used; the
/// store is left untouched in that case.
pub fn apply(
    store: &mut SharedStateStore,
    origin: &Participant,
    intent: Intent,
    now: Timestamp,
) -> Result<Dispatch, DomainError> {
    match intent {
        Intent::Input { token } => input(store, origin, token),
        Intent::Evaluate { expression } => Ok(evaluate(store, origin, expression)),
        Intent::Clear => Ok(clear(store, origin)),
        Intent::AudioPlay { current_time } => audio_play(store, origin, current_time),
        Intent::AudioPause => {
            store.set_audio_transport(false, None)?;
            Ok(audio_sync(origin, AudioChange::Pause))
        }
        Intent::AudioVolume { value } => {
            let value = require("audio.volume", value)?;
            let volume = store.set_audio_volume(value)?;
            Ok(audio_sync(origin, AudioChange::Volume(volume)))
        }
        Intent::AudioProgress { value } => {
            let value = require("audio.progress", value)?;
            let current_time = store.set_audio_progress(value)?;
            Ok(audio_sync(origin, AudioChange::Progress(current_time)))
        }
        Intent::AudioSpeed { value } => {
            let value = require("audio.speed", value)?;
            let speed = store.set_audio_speed(value)?;
            Ok(audio_sync(origin, AudioChange::Speed(speed)))
        }
        Intent::AudioPitch { value } => {
            let value = require("audio.pitch", value)?;
            let pitch = store.set_audio_pitch(value)?;
            Ok(audio_sync(origin, AudioChange::Pitch(pitch)))
        }
        Intent::PartyToggle { value } => {
            let value = require("party.toggle", value)?;
            Ok(Dispatch::Broadcast(ServerEvent::PartySync {
                value: store.set_party_mode(value),
                origin: origin.into(),
            }))
        }
        Intent::ChatBroadcast { message } => {
            let message = chat_message("chat.broadcast", message)?;
            Ok(Dispatch::Broadcast(ServerEvent::ChatBroadcast {
                origin: origin.into(),
                name: origin.name.clone(),
                message,
                timestamp: now,
            }))
        }
        Intent::ChatPrivate { to, message } => {
            let to = to
                .and_then(|to| ParticipantId::new(to).ok())
                .ok_or_else(|| DomainError::malformed("chat.private", "missing recipient"))?;
            let message = chat_message("chat.private", message)?;
            Ok(Dispatch::Private {
                from: origin.clone(),
                to,
                message,
                timestamp: now,
            })
        }
        Intent::Heartbeat => Ok(Dispatch::Silent),
    }
}

fn require<T>(intent: &'static str, value: Option<T>) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::malformed(intent, "missing or invalid value"))
}

fn calc_update(store: &SharedStateStore, origin: &Participant, is_result: bool) -> Dispatch {
    Dispatch::Broadcast(ServerEvent::CalcUpdate {
        display: store.display().to_string(),
        origin: origin.into(),
        is_result,
    })
}

fn audio_sync(origin: &Participant, change: AudioChange) -> Dispatch {
    Dispatch::Broadcast(ServerEvent::AudioSync {
        change,
        origin: Origin::from(origin),
    })
}

fn input(
    store: &mut SharedStateStore,
    origin: &Participant,
    token: Option<String>,
) -> Result<Dispatch, DomainError> {
    let token = require("input", token)?;
    if !calculator::is_valid_token(&token) {
        return Err(DomainError::malformed(
            "input",
            format!("'{token}' is not a digit or operator"),
        ));
    }
    let next = calculator::append_token(store.display(), &token);
    store.set_display(next)?;
    Ok(calc_update(store, origin, false))
}

/// Evaluation never fails the intent: a bad expression shows "Error".
fn evaluate(store: &mut SharedStateStore, origin: &Participant, expression: Option<String>) -> Dispatch {
    let result = calculator::compute(expression.as_deref().unwrap_or_default());
    // compute() never returns an empty string.
    if let Err(e) = store.set_display(result) {
        tracing::warn!("Evaluation produced an unusable display: {}", e);
    }
    calc_update(store, origin, true)
}

fn clear(store: &mut SharedStateStore, origin: &Participant) -> Dispatch {
    if let Err(e) = store.set_display(SessionState::INITIAL_DISPLAY.to_string()) {
        tracing::warn!("Failed to clear display: {}", e);
    }
    calc_update(store, origin, false)
}

/// Missing or invalid start positions fall back to 0.
fn audio_play(
    store: &mut SharedStateStore,
    origin: &Participant,
    current_time: Option<f64>,
) -> Result<Dispatch, DomainError> {
    let current_time = current_time
        .filter(|t| t.is_finite())
        .map(|t| t.max(0.0))
        .unwrap_or(0.0);
    store.set_audio_transport(true, Some(current_time))?;
    Ok(audio_sync(origin, AudioChange::Play { current_time }))
}

fn chat_message(
    intent: &'static str,
    message: Option<String>,
) -> Result<MessageContent, DomainError> {
    let message = require(intent, message)?;
    MessageContent::new(message).map_err(|e| DomainError::malformed(intent, e.to_string()))
}
