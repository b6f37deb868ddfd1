//! Domain error types.

use thiserror::Error;

/// Errors raised while constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("participant id must not be empty")]
    ParticipantIdEmpty,

    #[error("message content must not be empty")]
    MessageContentEmpty,

    #[error("message content is too long ({actual} > {max} characters)")]
    MessageContentTooLong { actual: usize, max: usize },
}

/// Reasons an arithmetic expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
}

/// Errors produced by the session rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A participant id was registered twice. The transport never reuses ids,
    /// so this indicates a broken invariant.
    #[error("participant '{0}' is already registered")]
    DuplicateRegistration(String),

    /// The intent's payload was missing or had the wrong type.
    #[error("malformed '{intent}' intent: {reason}")]
    MalformedIntent {
        intent: &'static str,
        reason: String,
    },

    /// A private message named a recipient that is not connected.
    #[error("recipient '{0}' is not connected")]
    UnknownRecipient(String),

    /// An intent arrived for a participant that already left.
    #[error("participant '{0}' is not registered")]
    UnknownParticipant(String),
}

impl DomainError {
    pub fn malformed(intent: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedIntent {
            intent,
            reason: reason.into(),
        }
    }
}

/// Errors raised while pushing events to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not registered to the pusher")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    EncodeFailed(String),
}
