//! Shared real-time session server.
//!
//! Connected participants jointly drive a calculator display, an audio
//! transport and a party-mode flag, and chat with each other. Every change
//! is fanned out to the whole room over WebSocket.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
