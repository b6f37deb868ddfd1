//! Broadcast router: fan-out to the room and point-to-point routing.

use std::sync::Arc;

use crate::domain::{
    Dispatch, DomainError, MessageContent, MessagePushError, MessagePusher, Participant, ParticipantId,
    PresenceRegistry, PusherChannel, ServerEvent, Timestamp,
};

/// Routes events to participants through a [`MessagePusher`].
///
/// Targets are always read from the registry passed in, so a participant
/// receives an event only if it was registered when the event was routed.
#[derive(Clone)]
pub struct BroadcastRouter {
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastRouter {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub async fn attach(&self, id: ParticipantId, sender: PusherChannel) {
        self.message_pusher.register_client(id, sender).await;
    }

    pub async fn detach(&self, id: &ParticipantId) {
        self.message_pusher.unregister_client(id).await;
    }

    pub async fn send_to(
        &self,
        id: &ParticipantId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(id, event).await
    }

    /// Deliver to every registered participant, the originator included.
    pub async fn broadcast_to_all(&self, registry: &PresenceRegistry, event: &ServerEvent) {
        self.broadcast(registry.ids(), event).await;
    }

    pub async fn broadcast_except(
        &self,
        registry: &PresenceRegistry,
        exclude: &ParticipantId,
        event: &ServerEvent,
    ) {
        let targets = registry
            .ids()
            .into_iter()
            .filter(|id| id != exclude)
            .collect();
        self.broadcast(targets, event).await;
    }

    /// Deliver a private message to `to` and echo it to the sender.
    ///
    /// The sender gets its echo even when the recipient is not connected; in
    /// that case [`DomainError::UnknownRecipient`] is returned for logging and
    /// nothing is reported to the client.
    pub async fn route_private(
        &self,
        registry: &PresenceRegistry,
        from: &Participant,
        to: &ParticipantId,
        message: MessageContent,
        timestamp: Timestamp,
    ) -> Result<(), DomainError> {
        let private = |is_me| ServerEvent::ChatPrivate {
            from: from.id.clone(),
            from_name: from.name.clone(),
            from_color: from.color.clone(),
            message: message.clone(),
            timestamp,
            is_me,
        };

        let delivered = registry.contains(to);
        if delivered {
            if let Err(e) = self.send_to(to, &private(false)).await {
                tracing::warn!("Failed to deliver private message to '{}': {}", to, e);
            }
        }

        if let Err(e) = self.send_to(&from.id, &private(true)).await {
            tracing::warn!("Failed to echo private message to '{}': {}", from.id, e);
        }

        if delivered {
            Ok(())
        } else {
            Err(DomainError::UnknownRecipient(to.as_str().to_string()))
        }
    }

    /// # Errors
    ///
    /// [`DomainError::UnknownRecipient`] from [`Self::route_private`].
    pub async fn dispatch(
        &self,
        registry: &PresenceRegistry,
        dispatch: Dispatch,
    ) -> Result<(), DomainError> {
        match dispatch {
            Dispatch::Broadcast(event) => self.broadcast_to_all(registry, &event).await,
            Dispatch::Private {
                from,
                to,
                message,
                timestamp,
            } => {
                return self
                    .route_private(registry, &from, &to, message, timestamp)
                    .await;
            }
            Dispatch::Silent => {}
        }
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ParticipantId>, event: &ServerEvent) {
        if targets.is_empty() {
            return;
        }
        if let Err(e) = self.message_pusher.broadcast(targets, event).await {
            tracing::warn!("Failed to broadcast '{}': {}", event.topic(), e);
        }
    }
}
