//! UseCase: 参加者接続処理
//!
//! 参加者を登録し、本人には `sync.full` を、他の参加者には
//! `participant.joined` を送ります。

use crate::domain::{
    Color, DisplayName, Participant, ParticipantId, PusherChannel, ServerEvent,
};

use super::{broadcast::BroadcastRouter, context::SessionContext, error::ConnectError};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    router: BroadcastRouter,
}

impl ConnectParticipantUseCase {
    pub fn new(router: BroadcastRouter) -> Self {
        Self { router }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `id` - 接続時に割り当てられた参加者 ID
    /// * `sender` - 参加者へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Participant)` - 登録された参加者
    /// * `Err(ConnectError)` - 同じ ID が既に登録されている
    pub async fn execute(
        &self,
        ctx: &mut SessionContext,
        id: ParticipantId,
        sender: PusherChannel,
    ) -> Result<Participant, ConnectError> {
        let participant = Participant::new(
            id.clone(),
            DisplayName::generate(),
            Color::random(),
            ctx.now(),
        );

        // 1. Registry に登録（重複なら拒否）
        ctx.registry
            .register(participant.clone())
            .map_err(|_| ConnectError::DuplicateParticipant(id.as_str().to_string()))?;

        // 2. 送信チャンネルを登録
        self.router.attach(id.clone(), sender).await;

        // 3. 本人に現在の状態を送信
        let sync = ServerEvent::FullSync {
            recipient: id.clone(),
            state: ctx.store.get(),
            participants: ctx.registry.snapshot(),
        };
        if let Err(e) = self.router.send_to(&id, &sync).await {
            tracing::warn!("Failed to send full sync to '{}': {}", id, e);
        }

        // 4. 他の参加者に通知
        let joined = ServerEvent::ParticipantJoined {
            participant: participant.clone(),
            participants: ctx.registry.snapshot(),
        };
        self.router
            .broadcast_except(&ctx.registry, &id, &joined)
            .await;

        tracing::info!(
            "Participant '{}' joined as {} ({} connected)",
            id,
            participant.name.as_str(),
            ctx.registry.len()
        );
        Ok(participant)
    }
}
