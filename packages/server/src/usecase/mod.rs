//! UseCase layer: the session lifecycle and intent handling.
//!
//! All use cases operate on a [`SessionContext`] owned by the
//! [`SessionActor`], which runs them one command at a time.

mod apply_intent;
mod broadcast;
mod connect_participant;
mod context;
mod disconnect_participant;
mod error;
mod session_actor;
mod sweep_idle;

#[cfg(test)]
pub(crate) mod test_support;

pub use apply_intent::ApplyIntentUseCase;
pub use broadcast::BroadcastRouter;
pub use connect_participant::ConnectParticipantUseCase;
pub use context::SessionContext;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, SessionError};
pub use session_actor::{SessionActor, SessionCommand, SessionHandle, SessionSnapshot};
pub use sweep_idle::SweepIdleUseCase;
