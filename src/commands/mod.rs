//! Application command handlers for dicto.
//!
//! This module organizes command handling into separate submodules, each
//! responsible for a specific application command.
//!
//! # Commands
//! - `transcribe`: Send a recorded audio asset to a transcription backend
//! - `health`: Probe the relay endpoint
//! - `auth`: API key management and default backend selection
//! - `config`: Open configuration file in user's preferred editor

pub mod auth;
pub mod config;
pub mod health;
pub mod transcribe;

pub use auth::handle_auth;
pub use config::handle_config;
pub use health::handle_health;
pub use transcribe::{handle_transcribe, TranscribeOptions};
