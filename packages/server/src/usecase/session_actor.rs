//! Session actor: the single consumer that owns the [`SessionContext`].
//!
//! Every connect, disconnect, intent and snapshot request is a
//! [`SessionCommand`] processed one at a time, and the idle sweep runs as a
//! branch of the same loop. A join therefore never interleaves with a
//! broadcast: the joiner's `sync.full` reflects either all or none of a
//! concurrent mutation.

use std::{sync::Arc, time::Duration};

use tandem_shared::time::Clock;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::{
    config::PresenceConfig,
    domain::{
        DomainError, Intent, MessagePusher, Participant, ParticipantId, PusherChannel,
        SessionState,
    },
};

use super::{
    apply_intent::ApplyIntentUseCase,
    broadcast::BroadcastRouter,
    connect_participant::ConnectParticipantUseCase,
    context::SessionContext,
    disconnect_participant::DisconnectParticipantUseCase,
    error::{ConnectError, SessionError},
    sweep_idle::SweepIdleUseCase,
};

#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        participant_id: ParticipantId,
        sender: PusherChannel,
        reply: oneshot::Sender<Result<Participant, ConnectError>>,
    },
    Disconnect {
        participant_id: ParticipantId,
    },
    Intent {
        participant_id: ParticipantId,
        intent: Intent,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Point-in-time copy of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub participants: Vec<Participant>,
}

/// Handle for sending commands to the [`SessionActor`].
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Registers a participant and attaches its outbound channel.
    pub async fn connect(
        &self,
        participant_id: ParticipantId,
        sender: PusherChannel,
    ) -> Result<Participant, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Connect {
                participant_id,
                sender,
                reply,
            })
            .map_err(|_| SessionError::Closed)?;
        Ok(rx.await.map_err(|_| SessionError::Closed)??)
    }

    pub fn disconnect(&self, participant_id: ParticipantId) -> Result<(), SessionError> {
        self.tx
            .send(SessionCommand::Disconnect { participant_id })
            .map_err(|_| SessionError::Closed)
    }

    /// Queues an intent. Rejections are logged by the actor, not returned.
    pub fn submit(&self, participant_id: ParticipantId, intent: Intent) -> Result<(), SessionError> {
        self.tx
            .send(SessionCommand::Intent {
                participant_id,
                intent,
            })
            .map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Snapshot { reply })
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.tx
            .send(SessionCommand::Shutdown)
            .map_err(|_| SessionError::Closed)
    }
}

pub struct SessionActor {
    rx: mpsc::UnboundedReceiver<SessionCommand>,
    context: SessionContext,
    router: BroadcastRouter,
    connect: ConnectParticipantUseCase,
    disconnect: DisconnectParticipantUseCase,
    apply_intent: ApplyIntentUseCase,
    sweep_idle: SweepIdleUseCase,
    sweep_interval: Duration,
}

impl SessionActor {
    /// Creates the session context and spawns the actor task.
    pub fn spawn(
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        presence: PresenceConfig,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = BroadcastRouter::new(message_pusher);
        let actor = Self {
            rx,
            context: SessionContext::new(clock),
            connect: ConnectParticipantUseCase::new(router.clone()),
            disconnect: DisconnectParticipantUseCase::new(router.clone()),
            apply_intent: ApplyIntentUseCase::new(router.clone()),
            sweep_idle: SweepIdleUseCase::new(router.clone(), presence.idle_threshold),
            router,
            sweep_interval: presence.sweep_period(),
        };

        let task = tokio::spawn(actor.run());
        (SessionHandle { tx }, task)
    }

    async fn run(mut self) {
        let period = self.sweep_interval;
        let mut sweep_tick = interval_at(Instant::now() + period, period);
        sweep_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Session started (idle sweep every {:?})", period);

        loop {
            tokio::select! {
                cmd = self.rx.recv() => {
                    let Some(cmd) = cmd else {
                        break;
                    };
                    if !self.handle(cmd).await {
                        break;
                    }
                }
                _ = sweep_tick.tick() => {
                    self.sweep_idle.execute(&mut self.context).await;
                }
            }
        }

        self.teardown().await;
    }

    /// Returns `false` when the actor should stop.
    async fn handle(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::Connect {
                participant_id,
                sender,
                reply,
            } => {
                let result = self
                    .connect
                    .execute(&mut self.context, participant_id, sender)
                    .await;
                if let Err(e) = &result {
                    tracing::warn!("Connection refused: {}", e);
                }
                // The caller gave up (e.g. the upgrade request was aborted):
                // nobody will ever drive this participant's socket.
                if let Err(Ok(participant)) = reply.send(result) {
                    tracing::info!(
                        "Participant '{}' abandoned before the reply, disconnecting",
                        participant.id
                    );
                    self.disconnect
                        .execute(&mut self.context, &participant.id)
                        .await;
                }
            }
            SessionCommand::Disconnect { participant_id } => {
                self.disconnect
                    .execute(&mut self.context, &participant_id)
                    .await;
            }
            SessionCommand::Intent {
                participant_id,
                intent,
            } => {
                let topic = intent.topic();
                match self
                    .apply_intent
                    .execute(&mut self.context, &participant_id, intent)
                    .await
                {
                    Ok(()) => {}
                    Err(DomainError::UnknownParticipant(id)) => {
                        tracing::debug!("Dropped '{}' from unregistered participant '{}'", topic, id);
                    }
                    Err(DomainError::UnknownRecipient(to)) => {
                        tracing::debug!(
                            "Private message from '{}' to unknown recipient '{}' dropped",
                            participant_id,
                            to
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Rejected '{}' from '{}': {}", topic, participant_id, e);
                    }
                }
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(SessionSnapshot {
                    state: self.context.store.get(),
                    participants: self.context.registry.snapshot(),
                });
            }
            SessionCommand::Shutdown => {
                tracing::info!("Session shutdown requested");
                return false;
            }
        }
        true
    }

    async fn teardown(&mut self) {
        let ids = self.context.registry.ids();
        for id in &ids {
            self.router.detach(id).await;
        }
        tracing::info!("Session torn down ({} participants dropped)", ids.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{PusherHarness, id};
    use futures_util::FutureExt;
    use tandem_shared::time::{ManualClock, SystemClock};

    fn presence(idle_ms: u64, sweep_ms: u64) -> PresenceConfig {
        PresenceConfig {
            idle_threshold: Duration::from_millis(idle_ms),
            sweep_interval: Duration::from_millis(sweep_ms),
        }
    }

    #[tokio::test]
    async fn test_connect_and_snapshot() {
        // テスト項目: 接続した参加者がスナップショットに含まれる
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, _task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), PresenceConfig::default());

        // when (操作):
        let tx = harness.channel("alice");
        let participant = handle.connect(id("alice"), tx).await.unwrap();
        let snapshot = handle.snapshot().await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.participants, vec![participant]);
        assert_eq!(snapshot.state, SessionState::default());
    }

    #[tokio::test]
    async fn test_duplicate_connect_returns_error() {
        // テスト項目: 同じ ID での二重接続はエラーになる
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, _task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), PresenceConfig::default());
        let tx = harness.channel("alice");
        handle.connect(id("alice"), tx).await.unwrap();

        // when (操作):
        let tx = harness.channel("alice-2");
        let result = handle.connect(id("alice"), tx).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SessionError::Connect(ConnectError::DuplicateParticipant(
                "alice".to_string()
            )))
        );
    }

    #[tokio::test]
    async fn test_joiner_sync_reflects_mutations_queued_before_join() {
        // テスト項目: 参加前に受け付けた変更は sync.full に反映され、個別には届かない
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, _task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), PresenceConfig::default());
        let tx = harness.channel("alice");
        handle.connect(id("alice"), tx).await.unwrap();

        // when (操作):
        handle
            .submit(id("alice"), Intent::Input { token: Some("5".to_string()) })
            .unwrap();
        let tx = harness.channel("bob");
        handle.connect(id("bob"), tx).await.unwrap();
        handle
            .submit(id("alice"), Intent::Input { token: Some("3".to_string()) })
            .unwrap();
        handle.snapshot().await.unwrap();

        // then (期待する結果):
        let bob = harness.drain("bob");
        assert_eq!(bob.len(), 2);
        assert_eq!(bob[0]["type"], "sync.full");
        assert_eq!(bob[0]["sessionState"]["display"], "5");
        assert_eq!(bob[1]["type"], "calc.update");
        assert_eq!(bob[1]["display"], "53");
    }

    #[tokio::test]
    async fn test_disconnect_notifies_room() {
        // テスト項目: 切断が participant.left として通知される
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, _task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), PresenceConfig::default());
        for name in ["alice", "bob"] {
            let tx = harness.channel(name);
            handle.connect(id(name), tx).await.unwrap();
        }
        harness.drain("alice");

        // when (操作):
        handle.disconnect(id("bob")).unwrap();
        handle.disconnect(id("bob")).unwrap();
        let snapshot = handle.snapshot().await.unwrap();

        // then (期待する結果):
        assert_eq!(snapshot.participants.len(), 1);
        let alice = harness.drain("alice");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0]["type"], "participant.left");
        assert_eq!(alice[0]["id"], "bob");
    }

    #[tokio::test]
    async fn test_idle_sweep_runs_on_timer() {
        // テスト項目: タイマーで idle sweep が実行され、無操作の参加者が除去される
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let clock = Arc::new(ManualClock::new(0));
        let (handle, _task) =
            SessionActor::spawn(harness.pusher(), clock.clone(), presence(120_000, 10));
        for name in ["alice", "bob"] {
            let tx = harness.channel(name);
            handle.connect(id(name), tx).await.unwrap();
        }
        clock.advance(100_000);
        handle.submit(id("alice"), Intent::Heartbeat).unwrap();
        handle.snapshot().await.unwrap();
        harness.drain("alice");

        // when (操作):
        clock.advance(30_000);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let snapshot = handle.snapshot().await.unwrap();

        // then (期待する結果):
        let ids: Vec<_> = snapshot.participants.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![id("alice")]);
        let left: Vec<_> = harness
            .drain("alice")
            .into_iter()
            .filter(|frame| frame["type"] == "participant.left")
            .collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0]["id"], "bob");
        assert!(harness.is_closed("bob"));
    }

    #[tokio::test]
    async fn test_abandoned_connect_is_rolled_back() {
        // テスト項目: 応答を待たずに破棄された接続は登録されたまま残らず、participant.left が届く
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, _task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), PresenceConfig::default());
        let tx = harness.channel("alice");
        handle.connect(id("alice"), tx).await.unwrap();
        harness.drain("alice");

        // when (操作):
        let tx = harness.channel("ghost");
        // 一度だけ poll してから破棄する
        let abandoned = handle.connect(id("ghost"), tx).now_or_never();
        let snapshot = handle.snapshot().await.unwrap();

        // then (期待する結果):
        assert!(abandoned.is_none());
        let ids: Vec<_> = snapshot.participants.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![id("alice")]);
        let types: Vec<_> = harness
            .drain("alice")
            .into_iter()
            .map(|frame| frame["type"].clone())
            .collect();
        assert_eq!(types, vec!["participant.joined", "participant.left"]);
        assert!(harness.is_closed("ghost"));
    }

    #[tokio::test]
    async fn test_zero_sweep_interval_keeps_actor_alive() {
        // テスト項目: sweep 間隔 0 でも actor は停止せず、コマンドを処理し続ける
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), presence(120_000, 0));

        // when (操作):
        tokio::time::sleep(Duration::from_millis(20)).await;
        let tx = harness.channel("alice");
        let connected = handle.connect(id("alice"), tx).await;
        let snapshot = handle.snapshot().await;

        // then (期待する結果):
        assert!(connected.is_ok());
        assert_eq!(snapshot.unwrap().participants.len(), 1);
        assert!(!task.is_finished());
    }

    #[tokio::test]
    async fn test_shutdown_tears_down_session() {
        // テスト項目: shutdown で actor が停止し、全チャンネルが閉じられる
        // given (前提条件):
        let mut harness = PusherHarness::new();
        let (handle, task) =
            SessionActor::spawn(harness.pusher(), Arc::new(SystemClock), PresenceConfig::default());
        let tx = harness.channel("alice");
        handle.connect(id("alice"), tx).await.unwrap();

        // when (操作):
        handle.shutdown().unwrap();
        task.await.unwrap();

        // then (期待する結果):
        assert!(harness.is_closed("alice"));
        assert_eq!(handle.snapshot().await, Err(SessionError::Closed));
        let tx = harness.channel("bob");
        assert_eq!(
            handle.connect(id("bob"), tx).await,
            Err(SessionError::Closed)
        );
    }
}
