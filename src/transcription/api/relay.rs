//! Self-hosted Whisper relay implementation.
//!
//! The relay accepts a multipart upload `{file, model: small|medium}` with an
//! `X-API-KEY` header and answers `{"transcription": "..."}`. Before the first
//! upload an optional GET probe checks that the endpoint is reachable at all;
//! a 405 from the probe means the route exists (it only serves POST) and
//! counts as healthy.

use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::TranscriptionConfig;
use crate::audio::AudioPayload;
use crate::transcription::error::TranscribeError;
use crate::transcription::model::RelayModelTier;
use crate::transcription::retry::{run_with_retry, AttemptOutcome};
use crate::transcription::Transcript;

const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay API response wrapper
#[derive(Debug, Deserialize)]
struct RelayResponse {
    transcription: String,
}

/// Transcribes an audio payload through the relay, inside the retry loop.
pub async fn transcribe(
    config: &TranscriptionConfig,
    payload: &AudioPayload,
    cancel: &CancellationToken,
) -> Result<Transcript, TranscribeError> {
    let client = reqwest::Client::new();

    if config.relay_health_check {
        probe_health(&client, &config.relay_url).await?;
    }

    let url = config.relay_url.clone();
    let api_key = config.api_key.clone();
    let tier = config.relay_tier;
    let timeout = config.policy.attempt_timeout;
    let payload = payload.clone();

    run_with_retry(&config.policy, cancel, move |_attempt| {
        let client = client.clone();
        let url = url.clone();
        let api_key = api_key.clone();
        let payload = payload.clone();
        async move {
            match send_once(&client, &url, &api_key, tier, timeout, payload).await {
                Ok(transcript) => AttemptOutcome::Success(transcript),
                Err(err) => AttemptOutcome::from_error(err),
            }
        }
    })
    .await
}

/// One upload attempt. The request carries the per-attempt timeout, so expiry
/// cancels the transfer rather than leaking it.
async fn send_once(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    tier: RelayModelTier,
    timeout: Duration,
    payload: AudioPayload,
) -> Result<Transcript, TranscribeError> {
    let file_part = reqwest::multipart::Part::bytes(payload.data)
        .file_name(payload.file_name)
        .mime_str(&payload.mime_type)
        .map_err(|e| TranscribeError::InvalidAudio(format!("invalid content type: {e}")))?;

    let form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("model", tier.id());

    tracing::debug!(
        "Relay API Call:\n  URL: {url}\n  Method: POST\n  Headers:\n    X-API-KEY: <redacted>\n    Content-Type: multipart/form-data\n  Body parameters: model={}",
        tier.id()
    );

    let response = client
        .post(url)
        .header("X-API-KEY", api_key)
        .multipart(form)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| TranscribeError::from_request_error(&e))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Relay error response ({status}): {body}");
        return Err(TranscribeError::from_status(status, &body));
    }

    let parsed: RelayResponse = response
        .json()
        .await
        .map_err(|e| TranscribeError::Unknown(format!("unreadable relay response: {e}")))?;

    tracing::debug!(
        "Relay API Response: success, {} characters",
        parsed.transcription.len()
    );

    Ok(Transcript {
        text: parsed.transcription.trim().to_string(),
        words: Vec::new(),
    })
}

/// Probes the relay endpoint with a GET before committing to an upload.
///
/// Any reachable answer that is success or 405 (the route is POST-only) means
/// the relay is up. Everything else short-circuits to `ServiceUnavailable`
/// without consuming the retry budget.
pub async fn probe_relay_health(relay_url: &str) -> Result<(), TranscribeError> {
    probe_health(&reqwest::Client::new(), relay_url).await
}

async fn probe_health(client: &reqwest::Client, url: &str) -> Result<(), TranscribeError> {
    tracing::debug!("Probing relay health: GET {url}");
    let response = client
        .get(url)
        .timeout(HEALTH_PROBE_TIMEOUT)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("Relay health probe failed: {e}");
            TranscribeError::ServiceUnavailable
        })?;

    let status = response.status();
    if status.is_success() || status.as_u16() == 405 {
        tracing::debug!("Relay healthy (probe status {status})");
        Ok(())
    } else {
        tracing::warn!("Relay health probe returned {status}");
        Err(TranscribeError::ServiceUnavailable)
    }
}
