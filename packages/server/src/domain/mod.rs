//! Domain layer: session state, presence and the rules that mutate them.
//!
//! Nothing in here performs I/O. Delivery of events is abstracted behind
//! [`MessagePusher`], implemented by the infrastructure layer.

pub mod calculator;
pub mod entity;
pub mod error;
pub mod event;
pub mod intent;
pub mod message_pusher;
pub mod mutation;
pub mod presence;
pub mod session_state;
pub mod value_object;

pub use entity::{AudioTransport, Participant, SessionState};
pub use error::{DomainError, EvaluationError, MessagePushError, ValueObjectError};
pub use event::{AudioChange, Origin, ServerEvent};
pub use intent::Intent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use mutation::Dispatch;
pub use presence::PresenceRegistry;
pub use session_state::SharedStateStore;
pub use value_object::{Color, DisplayName, MessageContent, ParticipantId, Timestamp};
