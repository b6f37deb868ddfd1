//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - ドメインイベントを JSON フレームにエンコードして送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! `unregister_client` で sender を破棄すると、UI 層の送信タスクが終了し
//! ソケットが閉じられます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePushError, MessagePusher, ParticipantId, PusherChannel, ServerEvent},
    infrastructure::dto::conversion::encode_event,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let clients = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(clients.clone());
///
/// pusher.push_to(&participant_id, &event).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: participant id
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<String, PusherChannel>>>) -> Self {
        Self { clients }
    }

    fn encode(event: &ServerEvent) -> Result<String, MessagePushError> {
        encode_event(event).map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, id: ParticipantId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", id);
        clients.insert(id.into_string(), sender);
    }

    async fn unregister_client(&self, id: &ParticipantId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(id.as_str()).is_some() {
            tracing::debug!("Client '{}' unregistered from MessagePusher", id);
        }
    }

    async fn push_to(&self, id: &ParticipantId, event: &ServerEvent) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(id.as_str()) {
            sender
                .send(content)
                .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed '{}' to client '{}'", event.topic(), id);
            Ok(())
        } else {
            Err(MessagePushError::ClientNotFound(id.as_str().to_string()))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ParticipantId>,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let content = Self::encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(target.as_str()) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(content.clone()) {
                    tracing::warn!("Failed to push '{}' to client '{}': {}", event.topic(), target, e);
                } else {
                    tracing::debug!("Broadcasted '{}' to client '{}'", event.topic(), target);
                }
            } else {
                tracing::warn!(
                    "Client '{}' not found during broadcast, skipping",
                    target
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Color, Origin};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定のクライアントへの送信（JSON エンコード込み）
    // - broadcast: 複数クライアントへの送信
    // - unregister_client: sender 破棄で受信側が閉じる
    // ========================================

    fn create_test_pusher() -> (
        WebSocketMessagePusher,
        Arc<Mutex<HashMap<String, PusherChannel>>>,
    ) {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let pusher = WebSocketMessagePusher::new(clients.clone());
        (pusher, clients)
    }

    fn id(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    fn party_event() -> ServerEvent {
        ServerEvent::PartySync {
            value: true,
            origin: Origin {
                id: id("alice"),
                color: Color::new("red"),
            },
        }
    }

    const PARTY_JSON: &str =
        r#"{"type":"party.sync","value":true,"originId":"alice","originColor":"red"}"#;

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のクライアントにエンコード済みイベントを送信できる
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(id("alice"), tx).await;

        // when (操作):
        let result = pusher.push_to(&id("alice"), &party_event()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some(PARTY_JSON.to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        // given (前提条件):
        let (pusher, _clients) = create_test_pusher();

        // when (操作):
        let result = pusher.push_to(&id("nonexistent"), &party_event()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("nonexistent".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: ブロードキャスト時、一部のクライアントが存在しなくても成功する
        // given (前提条件):
        let (pusher, clients) = create_test_pusher();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        {
            let mut clients_lock = clients.lock().await;
            clients_lock.insert("alice".to_string(), tx1);
            clients_lock.insert("bob".to_string(), tx2);
        }

        // when (操作):
        let targets = vec![id("alice"), id("bob"), id("nonexistent")];
        let result = pusher.broadcast(targets, &party_event()).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some(PARTY_JSON.to_string()));
        assert_eq!(rx2.recv().await, Some(PARTY_JSON.to_string()));
    }

    #[tokio::test]
    async fn test_unregister_closes_channel() {
        // テスト項目: 登録解除すると受信側のチャンネルが閉じる
        // given (前提条件):
        let (pusher, clients) = create_test_pusher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(id("alice"), tx).await;

        // when (操作):
        pusher.unregister_client(&id("alice")).await;

        // then (期待する結果):
        assert!(clients.lock().await.is_empty());
        assert_eq!(rx.recv().await, None);
    }
}
