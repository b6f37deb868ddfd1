//! HTTP API response DTOs.

use serde::Serialize;

use super::websocket::SessionStateInfo;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub id: String,
    pub name: String,
    pub color: String,
    /// RFC 3339
    pub connected_at: String,
    /// RFC 3339
    pub last_active_at: String,
}

/// Response of `GET /api/session`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailDto {
    pub session_state: SessionStateInfo,
    pub participants: Vec<ParticipantDetailDto>,
}
