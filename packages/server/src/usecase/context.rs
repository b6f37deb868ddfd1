//! Session context: the state every use case works on.

use std::sync::Arc;

use tandem_shared::time::Clock;

use crate::domain::{PresenceRegistry, SharedStateStore, Timestamp};

/// Registry and state store of the one session this process hosts.
///
/// Created at process start and owned by the session actor; dropped when
/// the actor stops.
pub struct SessionContext {
    pub registry: PresenceRegistry,
    pub store: SharedStateStore,
    clock: Arc<dyn Clock>,
}

impl SessionContext {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: PresenceRegistry::new(),
            store: SharedStateStore::new(),
            clock,
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
