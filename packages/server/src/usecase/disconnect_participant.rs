//! UseCase: 参加者切断処理

use crate::domain::{ParticipantId, ServerEvent};

use super::{broadcast::BroadcastRouter, context::SessionContext};

/// 参加者切断のユースケース
///
/// 冪等: 未登録の ID に対しては何も配信しません。
pub struct DisconnectParticipantUseCase {
    router: BroadcastRouter,
}

impl DisconnectParticipantUseCase {
    pub fn new(router: BroadcastRouter) -> Self {
        Self { router }
    }

    /// 参加者切断を実行
    ///
    /// Returns whether the participant was registered.
    pub async fn execute(&self, ctx: &mut SessionContext, id: &ParticipantId) -> bool {
        // 送信チャンネルは常に破棄する（書き込みタスクを終了させる）
        self.router.detach(id).await;

        if !ctx.registry.remove(id) {
            tracing::debug!("Disconnect of unknown participant '{}' ignored", id);
            return false;
        }

        let left = ServerEvent::ParticipantLeft {
            id: id.clone(),
            participants: ctx.registry.snapshot(),
        };
        self.router.broadcast_to_all(&ctx.registry, &left).await;

        tracing::info!(
            "Participant '{}' left ({} connected)",
            id,
            ctx.registry.len()
        );
        true
    }
}
