//! UseCase: idle participant expiry

use std::time::Duration;

use crate::domain::{ParticipantId, ServerEvent};

use super::{broadcast::BroadcastRouter, context::SessionContext};

/// Removes participants whose last intent is older than the threshold and
/// treats each of them as a disconnect.
pub struct SweepIdleUseCase {
    router: BroadcastRouter,
    threshold_ms: i64,
}

impl SweepIdleUseCase {
    pub fn new(router: BroadcastRouter, idle_threshold: Duration) -> Self {
        Self {
            router,
            threshold_ms: i64::try_from(idle_threshold.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Returns the expired ids in registry order.
    pub async fn execute(&self, ctx: &mut SessionContext) -> Vec<ParticipantId> {
        let now = ctx.now();
        let expired = ctx.registry.sweep_idle(self.threshold_ms, now);

        for id in &expired {
            tracing::info!("Participant '{}' expired after inactivity", id);
            self.router.detach(id).await;
            let left = ServerEvent::ParticipantLeft {
                id: id.clone(),
                participants: ctx.registry.snapshot(),
            };
            self.router.broadcast_to_all(&ctx.registry, &left).await;
        }
        expired
    }
}
