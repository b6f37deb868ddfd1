//! Infrastructure layer: wire formats and the WebSocket pusher.

pub mod dto;
pub mod message_pusher;
