//! UseCase layer errors.

use thiserror::Error;

/// Reasons a connection is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("participant '{0}' is already connected")]
    DuplicateParticipant(String),
}

/// Errors returned by [`SessionHandle`](super::SessionHandle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,

    #[error(transparent)]
    Connect(#[from] ConnectError),
}
