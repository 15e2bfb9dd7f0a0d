//! Backend credential management command.
//!
//! Stores the API key for a backend (relay `X-API-KEY` or OpenAI bearer
//! token) and optionally marks that backend as the default for transcription.

use crate::config;
use crate::transcription::Backend;

/// Saves, clears or promotes a backend credential.
///
/// # Arguments
/// * `backend_id` - "relay" or "openai"
/// * `key` - API key to store; omit together with `clear` to only change the default
/// * `make_default` - use this backend when none is given on the command line
/// * `clear` - remove the stored key instead of saving one
pub fn handle_auth(
    backend_id: String,
    key: Option<String>,
    make_default: bool,
    clear: bool,
) -> anyhow::Result<()> {
    let backend = Backend::from_id(&backend_id).ok_or_else(|| {
        let valid: Vec<_> = Backend::all().iter().map(|b| b.id()).collect();
        anyhow::anyhow!("Unknown backend: {backend_id}. Valid backends: {}", valid.join(", "))
    })?;

    if clear {
        config::clear_api_key(backend.id())?;
        println!("API key cleared for {}", backend.name());
        return Ok(());
    }

    if let Some(key) = key {
        if key.trim().is_empty() {
            return Err(anyhow::anyhow!("API key must not be empty"));
        }
        config::save_api_key(backend.id(), key.trim())?;
        println!("API key saved for {}", backend.name());
    }

    if make_default {
        config::save_default_backend(backend.id())?;
        println!("{} is now the default backend", backend.name());
    }

    Ok(())
}
