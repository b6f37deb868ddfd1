//! Utilities shared by the Tandem binaries: logging setup and clocks.

pub mod logger;
pub mod time;
