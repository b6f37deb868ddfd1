//! MessagePusher trait 定義
//!
//! 参加者へのイベント配信のインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, event::ServerEvent, value_object::ParticipantId};

/// Outbound channel of one connection. Carries encoded frames.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Delivers events to connected participants.
///
/// Implementations must not block: the session processes one command at a
/// time and waits on every push.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Attach the outbound channel of a participant.
    async fn register_client(&self, id: ParticipantId, sender: PusherChannel);

    /// Detach a participant. Dropping the channel ends its writer task.
    async fn unregister_client(&self, id: &ParticipantId);

    /// Push to one participant.
    async fn push_to(&self, id: &ParticipantId, event: &ServerEvent)
    -> Result<(), MessagePushError>;

    /// Push to every target. Individual failures are logged and skipped.
    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError>;
}
