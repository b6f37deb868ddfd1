//! UseCase: 参加者からの操作 (intent) を適用する

use crate::domain::{DomainError, Intent, ParticipantId, mutation};

use super::{broadcast::BroadcastRouter, context::SessionContext};

/// Intent 適用のユースケース
///
/// 1. 発信者の `lastActiveAt` を更新
/// 2. ペイロードを検証して状態を更新
/// 3. 生成されたイベントを配信
pub struct ApplyIntentUseCase {
    router: BroadcastRouter,
}

impl ApplyIntentUseCase {
    pub fn new(router: BroadcastRouter) -> Self {
        Self { router }
    }

    /// # Errors
    ///
    /// * [`DomainError::UnknownParticipant`] - 発信者が登録されていない（破棄）
    /// * [`DomainError::MalformedIntent`] - ペイロード不正（状態は変更されない）
    /// * [`DomainError::UnknownRecipient`] - 宛先が未接続（送信者へのエコーは配信済み）
    pub async fn execute(
        &self,
        ctx: &mut SessionContext,
        id: &ParticipantId,
        intent: Intent,
    ) -> Result<(), DomainError> {
        let now = ctx.now();
        let origin = ctx
            .registry
            .touch(id, now)
            .cloned()
            .ok_or_else(|| DomainError::UnknownParticipant(id.as_str().to_string()))?;

        let topic = intent.topic();
        let dispatch = mutation::apply(&mut ctx.store, &origin, intent, now)?;
        tracing::debug!("Applied '{}' from '{}'", topic, id);

        self.router.dispatch(&ctx.registry, dispatch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Color, DisplayName, Participant, Timestamp, message_pusher::MockMessagePusher},
        usecase::test_support::{PusherHarness, id},
    };
    use std::sync::Arc;
    use tandem_shared::time::ManualClock;

    async fn setup(
        harness: &mut PusherHarness,
        clock: Arc<ManualClock>,
        names: &[&str],
    ) -> SessionContext {
        let mut ctx = SessionContext::new(clock);
        let now = ctx.now();
        for name in names {
            ctx.registry
                .register(Participant::new(
                    id(name),
                    DisplayName::new(format!("User_{name}")),
                    Color::new(format!("color-{name}")),
                    now,
                ))
                .unwrap();
            harness.attach(name).await;
        }
        ctx
    }

    #[tokio::test]
    async fn test_input_is_broadcast_to_everyone_with_origin() {
        // テスト項目: 入力は発信者を含む全員に calc.update として届く
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let clock = Arc::new(ManualClock::new(0));
        let mut ctx = setup(&mut harness, clock, &["alice", "bob"]).await;
        let usecase = ApplyIntentUseCase::new(BroadcastRouter::new(harness.pusher()));

        // when (操作):
        let intent = Intent::Input {
            token: Some("7".to_string()),
        };
        usecase.execute(&mut ctx, &id("alice"), intent).await.unwrap();

        // then (期待する結果):
        assert_eq!(ctx.store.display(), "7");
        for name in ["alice", "bob"] {
            let frames = harness.drain(name);
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0]["type"], "calc.update");
            assert_eq!(frames[0]["display"], "7");
            assert_eq!(frames[0]["originId"], "alice");
            assert_eq!(frames[0]["originColor"], "color-alice");
        }
    }

    #[tokio::test]
    async fn test_heartbeat_touches_without_delivery() {
        // テスト項目: heartbeat は lastActiveAt だけを更新し、何も配信しない
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let clock = Arc::new(ManualClock::new(1_000));
        let mut ctx = setup(&mut harness, clock.clone(), &["alice", "bob"]).await;
        let usecase = ApplyIntentUseCase::new(BroadcastRouter::new(harness.pusher()));
        clock.advance(5_000);

        // when (操作):
        usecase
            .execute(&mut ctx, &id("alice"), Intent::Heartbeat)
            .await
            .unwrap();

        // then (期待する結果):
        let alice = ctx.registry.get(&id("alice")).unwrap();
        assert_eq!(alice.last_active_at, Timestamp::new(6_000));
        assert_eq!(alice.connected_at, Timestamp::new(1_000));
        assert!(harness.drain("alice").is_empty());
        assert!(harness.drain("bob").is_empty());
    }

    #[tokio::test]
    async fn test_intent_from_unknown_participant_is_dropped() {
        // テスト項目: 未登録の参加者からの intent は破棄され、状態は変わらない
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let mut ctx = SessionContext::new(clock);
        let mut mock = MockMessagePusher::new();
        mock.expect_broadcast().times(0);
        mock.expect_push_to().times(0);
        let usecase = ApplyIntentUseCase::new(BroadcastRouter::new(Arc::new(mock)));

        // when (操作):
        let result = usecase
            .execute(&mut ctx, &id("ghost"), Intent::PartyToggle { value: Some(true) })
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(DomainError::UnknownParticipant("ghost".to_string()))
        );
        assert!(!ctx.store.get().party_mode);
    }

    #[tokio::test]
    async fn test_malformed_intent_still_refreshes_liveness() {
        // テスト項目: ペイロード不正でも発信者の lastActiveAt は更新され、何も配信されない
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let clock = Arc::new(ManualClock::new(0));
        let mut ctx = setup(&mut harness, clock.clone(), &["alice"]).await;
        let usecase = ApplyIntentUseCase::new(BroadcastRouter::new(harness.pusher()));
        clock.advance(10);

        // when (操作):
        let result = usecase
            .execute(&mut ctx, &id("alice"), Intent::AudioSpeed { value: Some(0.0) })
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(DomainError::MalformedIntent { .. })));
        assert_eq!(ctx.store.get().audio.speed, 1.0);
        assert_eq!(
            ctx.registry.get(&id("alice")).unwrap().last_active_at,
            Timestamp::new(10)
        );
        assert!(harness.drain("alice").is_empty());
    }

    #[tokio::test]
    async fn test_private_chat_reaches_recipient_and_sender_only() {
        // テスト項目: chat.private は宛先と送信者だけに届く
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let clock = Arc::new(ManualClock::new(500));
        let mut ctx = setup(&mut harness, clock, &["alice", "bob", "carol"]).await;
        let usecase = ApplyIntentUseCase::new(BroadcastRouter::new(harness.pusher()));

        // when (操作):
        let intent = Intent::ChatPrivate {
            to: Some("bob".to_string()),
            message: Some("hi bob".to_string()),
        };
        usecase.execute(&mut ctx, &id("alice"), intent).await.unwrap();

        // then (期待する結果):
        let bob = harness.drain("bob");
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0]["isMe"], false);
        assert_eq!(bob[0]["fromName"], "User_alice");
        assert_eq!(bob[0]["timestamp"], 500);
        let alice = harness.drain("alice");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0]["isMe"], true);
        assert!(harness.drain("carol").is_empty());
    }
}
