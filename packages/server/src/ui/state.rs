//! Shared application state.

use crate::{config::KeepAliveConfig, usecase::SessionHandle};

/// State handed to every handler.
pub struct AppState {
    /// Session actor（全ての状態変更はここを経由する）
    pub session: SessionHandle,
    /// WebSocket keep-alive の設定
    pub keep_alive: KeepAliveConfig,
}
