//! OpenAI Whisper API implementation.
//!
//! Uploads multipart form data with bearer token authentication and asks for
//! `verbose_json` with word-level timestamps, so post-processing can derive
//! speaker tags from the gaps between words.

use std::time::Duration;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::TranscriptionConfig;
use crate::audio::AudioPayload;
use crate::transcription::error::TranscribeError;
use crate::transcription::retry::{run_with_retry, AttemptOutcome};
use crate::transcription::{Transcript, WordTiming};

const VENDOR_MODEL: &str = "whisper-1";

/// Verbose response from the vendor API
#[derive(Debug, Deserialize)]
struct VerboseResponse {
    text: String,
    #[serde(default)]
    words: Vec<VerboseWord>,
}

#[derive(Debug, Deserialize)]
struct VerboseWord {
    #[serde(alias = "text")]
    word: String,
    start: f64,
    end: f64,
}

/// Transcribes an audio payload through the vendor API, inside the retry loop.
pub async fn transcribe(
    config: &TranscriptionConfig,
    payload: &AudioPayload,
    cancel: &CancellationToken,
) -> Result<Transcript, TranscribeError> {
    let client = reqwest::Client::new();

    let url = config.vendor_url.clone();
    let api_key = config.api_key.clone();
    let language = config.language.clone();
    let temperature = config.temperature;
    let timeout = config.policy.attempt_timeout;
    let payload = payload.clone();

    run_with_retry(&config.policy, cancel, move |_attempt| {
        let client = client.clone();
        let url = url.clone();
        let api_key = api_key.clone();
        let language = language.clone();
        let payload = payload.clone();
        async move {
            match send_once(&client, &url, &api_key, &language, temperature, timeout, payload)
                .await
            {
                Ok(transcript) => AttemptOutcome::Success(transcript),
                Err(err) => AttemptOutcome::from_error(err),
            }
        }
    })
    .await
}

async fn send_once(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    language: &str,
    temperature: f32,
    timeout: Duration,
    payload: AudioPayload,
) -> Result<Transcript, TranscribeError> {
    let file_part = reqwest::multipart::Part::bytes(payload.data)
        .file_name(payload.file_name)
        .mime_str(&payload.mime_type)
        .map_err(|e| TranscribeError::InvalidAudio(format!("invalid content type: {e}")))?;

    let form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("model", VENDOR_MODEL)
        .text("response_format", "verbose_json")
        .text("temperature", temperature.to_string())
        .text("language", language.to_string())
        .text("timestamp_granularities[]", "word");

    tracing::debug!(
        "OpenAI API Call:\n  URL: {url}\n  Method: POST\n  Headers:\n    Authorization: Bearer <redacted>\n    Content-Type: multipart/form-data\n  Body parameters: model={VENDOR_MODEL}, response_format=verbose_json, temperature={temperature}, language={language}"
    );

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .multipart(form)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| TranscribeError::from_request_error(&e))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("OpenAI error response ({status}): {body}");
        return Err(TranscribeError::from_status(status, &body));
    }

    let parsed: VerboseResponse = response
        .json()
        .await
        .map_err(|e| TranscribeError::Unknown(format!("unreadable OpenAI response: {e}")))?;

    tracing::debug!(
        "OpenAI API Response: success, {} characters, {} timed words",
        parsed.text.len(),
        parsed.words.len()
    );

    Ok(Transcript {
        text: parsed.text.trim().to_string(),
        words: parsed
            .words
            .into_iter()
            .map(|w| WordTiming {
                text: w.word,
                start: w.start,
                end: w.end,
                speaker: None,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::api::test_server;
    use crate::transcription::model::RelayModelTier;
    use crate::transcription::retry::RetryPolicy;
    use crate::transcription::Backend;

    fn test_config(url: &str) -> TranscriptionConfig {
        TranscriptionConfig {
            backend: Backend::VendorDirect,
            api_key: "sk-test".to_string(),
            relay_url: String::new(),
            relay_tier: RelayModelTier::Small,
            relay_health_check: false,
            vendor_url: url.to_string(),
            language: "fr".to_string(),
            temperature: 0.2,
            policy: RetryPolicy {
                max_attempts: 2,
                attempt_timeout: Duration::from_millis(300),
                backoff_base: Duration::from_millis(1),
                backoff_cap: Duration::from_millis(4),
            },
        }
    }

    fn small_payload() -> AudioPayload {
        AudioPayload {
            data: vec![0u8; 1024],
            file_name: "recording.webm".to_string(),
            mime_type: "audio/webm".to_string(),
        }
    }

    #[tokio::test]
    async fn test_verbose_response_parses_word_timings() {
        let body = r#"{"text":"bonjour le monde","words":[
            {"word":"bonjour","start":0.0,"end":0.4},
            {"word":"le","start":0.5,"end":0.6},
            {"word":"monde","start":0.7,"end":1.1}
        ]}"#;
        let server = test_server::serve_fixed(200, body).await;
        let config = test_config(&server.url);
        let transcript = transcribe(&config, &small_payload(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(transcript.text, "bonjour le monde");
        assert_eq!(transcript.words.len(), 3);
        assert_eq!(transcript.words[0].text, "bonjour");
        assert!(transcript.words.iter().all(|w| w.speaker.is_none()));
    }

    #[tokio::test]
    async fn test_response_without_words_still_succeeds() {
        let server = test_server::serve_fixed(200, r#"{"text":"bonjour"}"#).await;
        let config = test_config(&server.url);
        let transcript = transcribe(&config, &small_payload(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(transcript.text, "bonjour");
        assert!(transcript.words.is_empty());
    }

    #[tokio::test]
    async fn test_quota_exhaustion_is_terminal() {
        let body = r#"{"error":{"message":"You exceeded your current quota","code":"insufficient_quota"}}"#;
        let server = test_server::serve_fixed(429, body).await;
        let config = test_config(&server.url);
        let err = transcribe(&config, &small_payload(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, TranscribeError::QuotaExceeded);
        assert_eq!(server.hit_count(), 1);
    }
}
