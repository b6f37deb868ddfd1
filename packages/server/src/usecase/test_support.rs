//! Shared fixtures for use-case tests.

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;
use tokio::sync::{
    Mutex,
    mpsc::{self, UnboundedReceiver, error::TryRecvError},
};

use crate::{
    domain::{MessagePusher, ParticipantId, PusherChannel},
    infrastructure::message_pusher::WebSocketMessagePusher,
};

pub(crate) fn id(value: &str) -> ParticipantId {
    ParticipantId::new(value.to_string()).unwrap()
}

/// A real [`WebSocketMessagePusher`] whose client channels are kept here
/// so tests can read what each participant received.
pub(crate) struct PusherHarness {
    pusher: Arc<WebSocketMessagePusher>,
    receivers: HashMap<String, UnboundedReceiver<String>>,
}

impl PusherHarness {
    pub(crate) fn new() -> Self {
        let clients = Arc::new(Mutex::new(HashMap::new()));
        Self {
            pusher: Arc::new(WebSocketMessagePusher::new(clients)),
            receivers: HashMap::new(),
        }
    }

    pub(crate) fn pusher(&self) -> Arc<dyn MessagePusher> {
        self.pusher.clone()
    }

    /// Create a channel for `name` without registering it.
    pub(crate) fn channel(&mut self, name: &str) -> PusherChannel {
        let (tx, rx) = mpsc::unbounded_channel();
        self.receivers.insert(name.to_string(), rx);
        tx
    }

    /// Create a channel for `name` and register it with the pusher.
    pub(crate) async fn attach(&mut self, name: &str) {
        let tx = self.channel(name);
        self.pusher.register_client(id(name), tx).await;
    }

    /// Every frame received by `name` so far, decoded.
    pub(crate) fn drain(&mut self, name: &str) -> Vec<Value> {
        let rx = self.receivers.get_mut(name).unwrap();
        let mut frames = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            frames.push(serde_json::from_str(&raw).unwrap());
        }
        frames
    }

    /// Whether the pusher dropped its side of the channel of `name`.
    /// Pending frames are discarded.
    pub(crate) fn is_closed(&mut self, name: &str) -> bool {
        let rx = self.receivers.get_mut(name).unwrap();
        loop {
            match rx.try_recv() {
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => return true,
            }
        }
    }
}
