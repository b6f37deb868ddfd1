//! Presence registry: who is connected and when they were last heard from.

use super::{
    entity::Participant,
    error::DomainError,
    value_object::{ParticipantId, Timestamp},
};

/// Connected participants in insertion order.
///
/// Iteration order is the join order, which keeps idle sweeps and
/// participant lists deterministic.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    participants: Vec<Participant>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new participant.
    ///
    /// # Errors
    ///
    /// [`DomainError::DuplicateRegistration`] if the id is already present.
    pub fn register(&mut self, participant: Participant) -> Result<(), DomainError> {
        if self.contains(&participant.id) {
            return Err(DomainError::DuplicateRegistration(
                participant.id.into_string(),
            ));
        }
        self.participants.push(participant);
        Ok(())
    }

    /// Refresh `last_active_at`. Returns the updated record, or `None` when
    /// the participant is gone (a removal raced the intent).
    pub fn touch(&mut self, id: &ParticipantId, now: Timestamp) -> Option<&Participant> {
        let participant = self.participants.iter_mut().find(|p| &p.id == id)?;
        participant.touch(now);
        Some(participant)
    }

    /// Remove a participant. Returns whether it was present.
    pub fn remove(&mut self, id: &ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| &p.id != id);
        self.participants.len() != before
    }

    /// Remove and return every participant idle for longer than
    /// `threshold_ms` at `now`, in registry order.
    pub fn sweep_idle(&mut self, threshold_ms: i64, now: Timestamp) -> Vec<ParticipantId> {
        let (idle, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.participants)
            .into_iter()
            .partition(|p| p.is_idle(threshold_ms, now));
        self.participants = active;
        idle.into_iter().map(|p| p.id).collect()
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.get(id).is_some()
    }

    /// Copy of every participant record.
    pub fn snapshot(&self) -> Vec<Participant> {
        self.participants.clone()
    }

    pub fn ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
