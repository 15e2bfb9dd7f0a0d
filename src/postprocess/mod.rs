//! Transcript post-processing through the vendor chat API.
//!
//! Raw Whisper output tends to lack punctuation and paragraph breaks. This
//! module sends the transcript through a chat-completion call that corrects
//! both without shortening the content, and can produce a short summary on
//! request. A failed cleanup falls back to the raw text at the call site;
//! post-processing never fails the transcription itself.

pub mod speakers;

pub use speakers::{assign_speakers, SPEAKER_GAP_SECONDS};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::time::Duration;

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat completion response shape shared by cleanup and summary calls
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

fn cleanup_prompt(language: &str) -> String {
    format!(
        "You correct transcripts in {language}. Fix punctuation and paragraph \
         breaks. Do not shorten, summarize or reword the content. Output only \
         the corrected transcript."
    )
}

fn summary_prompt(language: &str) -> String {
    format!(
        "Summarize the following transcript in {language}, in a few short \
         sentences. Output only the summary."
    )
}

/// Runs the punctuation/paragraphing cleanup pass over a raw transcript.
///
/// # Errors
/// - If the chat request fails or returns a non-success status
/// - If the response carries no choices
pub async fn cleanup(
    chat_url: &str,
    api_key: &str,
    model: &str,
    language: &str,
    text: &str,
) -> Result<String> {
    chat(chat_url, api_key, model, &cleanup_prompt(language), text).await
}

/// Produces a short summary of the transcript.
pub async fn summarize(
    chat_url: &str,
    api_key: &str,
    model: &str,
    language: &str,
    text: &str,
) -> Result<String> {
    chat(chat_url, api_key, model, &summary_prompt(language), text).await
}

async fn chat(
    chat_url: &str,
    api_key: &str,
    model: &str,
    system_prompt: &str,
    text: &str,
) -> Result<String> {
    let client = reqwest::Client::new();
    let response = client
        .post(chat_url)
        .bearer_auth(api_key)
        .json(&serde_json::json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": text}
            ]
        }))
        .timeout(CHAT_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("chat completion failed ({status}): {body}"));
    }

    let chat_response: ChatResponse = response.json().await?;
    chat_response
        .choices
        .first()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| anyhow!("chat completion returned no choices"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::api::test_server;

    #[tokio::test]
    async fn test_cleanup_returns_model_output() {
        let body = r#"{"choices":[{"message":{"content":"Bonjour, le monde."}}]}"#;
        let server = test_server::serve_fixed(200, body).await;
        let cleaned = cleanup(&server.url, "sk-test", "gpt-4o-mini", "French", "bonjour le monde")
            .await
            .unwrap();
        assert_eq!(cleaned, "Bonjour, le monde.");
    }

    #[tokio::test]
    async fn test_cleanup_failure_is_an_error_for_the_caller_to_absorb() {
        let server = test_server::serve_fixed(500, r#"{"error":"boom"}"#).await;
        let result = cleanup(&server.url, "sk-test", "gpt-4o-mini", "French", "bonjour").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = test_server::serve_fixed(200, r#"{"choices":[]}"#).await;
        let result = summarize(&server.url, "sk-test", "gpt-4o-mini", "French", "bonjour").await;
        assert!(result.is_err());
    }
}
