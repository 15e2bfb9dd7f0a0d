//! Transcription API client with backend-specific implementations.
//!
//! Routes a request to the relay or the vendor implementation based on the
//! configured backend. Credentials and endpoints are explicit parameters on
//! every call; the client holds no global state.

mod relay;
mod vendor;

pub use relay::probe_relay_health;

use tokio_util::sync::CancellationToken;

use super::backend::Backend;
use super::error::TranscribeError;
use super::model::RelayModelTier;
use super::retry::RetryPolicy;
use super::Transcript;
use crate::audio::AudioPayload;

/// Configuration for one transcription call.
///
/// Built by the caller from the settings store plus the resolved credential;
/// nothing here outlives the call.
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// Which backend receives the audio
    pub backend: Backend,
    /// API key for the selected backend (relay `X-API-KEY` or vendor bearer token)
    pub api_key: String,
    /// Relay endpoint URL (POST transcribes, GET probes health)
    pub relay_url: String,
    /// Model tier sent to the relay
    pub relay_tier: RelayModelTier,
    /// Whether to probe the relay with a GET before uploading
    pub relay_health_check: bool,
    /// Vendor transcription endpoint URL
    pub vendor_url: String,
    /// Transcription language hint (vendor backend)
    pub language: String,
    /// Sampling temperature (vendor backend)
    pub temperature: f32,
    /// Attempt and backoff bounds for this call
    pub policy: RetryPolicy,
}

/// Transcribes a normalized audio payload using the configured backend.
///
/// The payload has already passed size/validity checks; from here on failures
/// are network or service classified. Cancellation is observed between
/// attempts and during backoff.
///
/// # Errors
/// Returns a classified [`TranscribeError`]; transient classes have already
/// been retried up to the configured attempt cap.
pub async fn transcribe(
    config: &TranscriptionConfig,
    payload: &AudioPayload,
    cancel: &CancellationToken,
) -> Result<Transcript, TranscribeError> {
    tracing::info!(
        "Transcribing {} bytes with {} backend",
        payload.len(),
        config.backend.name()
    );

    match config.backend {
        Backend::RemoteRelay => relay::transcribe(config, payload, cancel).await,
        Backend::VendorDirect => vendor::transcribe(config, payload, cancel).await,
    }
}
