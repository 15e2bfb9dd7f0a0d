//! Transcribe a recorded audio file (or embedded data URI).
//!
//! Loads configuration, resolves the backend and its credential, normalizes
//! the audio into a payload, runs the transcription client and routes the
//! resulting text to stdout, a file or the clipboard.

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::audio::{AudioHandle, BrowserCapture, NativeCapture, PayloadBuilder};
use crate::clipboard::copy_to_clipboard;
use crate::config::{self, DictoConfig};
use crate::postprocess;
use crate::transcription::{self, Backend, RelayModelTier, TranscriptionConfig, WordTiming};

/// Options collected from the command line for one transcription run.
pub struct TranscribeOptions {
    /// Path to the audio file to transcribe
    pub file: Option<PathBuf>,
    /// Audio embedded as a `data:` URI (browser capture exports)
    pub data_uri: Option<String>,
    /// Backend override: "relay" or "openai"
    pub backend: Option<String>,
    /// Relay model tier override: "small" or "medium"
    pub tier: Option<String>,
    /// Skip the cleanup pass, output the raw transcript
    pub raw: bool,
    /// Append a short summary after the transcript (vendor backend)
    pub summary: bool,
    /// Comma-separated speaker names for the gap-tagging heuristic
    pub speakers: Option<String>,
    /// Copy transcription to clipboard instead of stdout
    pub clipboard: bool,
    /// Write transcription to file instead of stdout
    pub output: Option<String>,
}

/// Handles transcription of a recorded audio asset.
pub async fn handle_transcribe(options: TranscribeOptions) -> anyhow::Result<()> {
    tracing::info!("=== dicto Transcribe Command ===");

    let handle = build_handle(&options)?;

    let config = DictoConfig::load().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow::anyhow!("Configuration error: {err}")
    })?;

    let backend = resolve_backend(&options, &config)?;
    let tier = resolve_tier(&options, &config)?;

    let api_key = config::get_api_key(backend.id())?.ok_or_else(|| {
        anyhow::anyhow!(
            "No API key for {}. Run 'dicto auth {} <key>'",
            backend.name(),
            backend.id()
        )
    })?;

    // The capture source decides the default container: data URIs come from
    // browser recorders, files from native ones.
    let payload = match &handle {
        AudioHandle::DataUri(_) => BrowserCapture.build(&handle)?,
        _ => NativeCapture.build(&handle)?,
    };

    let transcription_config = TranscriptionConfig {
        backend,
        api_key: api_key.clone(),
        relay_url: config.relay.url.clone(),
        relay_tier: tier,
        relay_health_check: config.relay.health_check,
        vendor_url: config.vendor.url.clone(),
        language: config.vendor.language.clone(),
        temperature: config.vendor.temperature,
        policy: config.retry_policy(backend),
    };

    // Ctrl-C aborts between attempts rather than killing the process mid-upload.
    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling transcription");
            cancel_on_signal.cancel();
        }
    });

    let mut transcript = transcription::transcribe(&transcription_config, &payload, &cancel)
        .await
        .map_err(|e| {
            tracing::error!("Transcription failed: {e}");
            anyhow::anyhow!("{e}")
        })?;

    let mut text = transcript.text.clone();

    if backend == Backend::VendorDirect {
        if config.vendor.cleanup && !options.raw {
            match postprocess::cleanup(
                &config.vendor.chat_url,
                &api_key,
                &config.vendor.cleanup_model,
                &config.vendor.language,
                &text,
            )
            .await
            {
                Ok(cleaned) => text = cleaned,
                Err(e) => {
                    tracing::warn!("Cleanup pass failed, keeping raw transcript: {e}");
                }
            }
        }

        if !transcript.words.is_empty() {
            let roster = speaker_roster(&options, &config);
            postprocess::assign_speakers(&mut transcript.words, &roster);
            if options.speakers.is_some() {
                text = format_tagged(&transcript.words);
            }
        }

        if options.summary {
            match postprocess::summarize(
                &config.vendor.chat_url,
                &api_key,
                &config.vendor.cleanup_model,
                &config.vendor.language,
                &transcript.text,
            )
            .await
            {
                Ok(summary) => text = format!("{text}\n\n{summary}"),
                Err(e) => tracing::warn!("Summary generation failed: {e}"),
            }
        }
    }

    write_output(&text, &options)
}

fn build_handle(options: &TranscribeOptions) -> anyhow::Result<AudioHandle> {
    match (&options.file, &options.data_uri) {
        (Some(path), None) => Ok(AudioHandle::File(path.clone())),
        (None, Some(uri)) => Ok(AudioHandle::DataUri(uri.clone())),
        (Some(_), Some(_)) => Err(anyhow::anyhow!(
            "Give either an audio file or --data-uri, not both"
        )),
        (None, None) => Err(anyhow::anyhow!(
            "No audio given. Pass an audio file path or --data-uri"
        )),
    }
}

/// Backend precedence: command-line flag, then the auth default, then the
/// config file, then the relay.
fn resolve_backend(options: &TranscribeOptions, config: &DictoConfig) -> anyhow::Result<Backend> {
    if let Some(id) = &options.backend {
        return Backend::from_id(id)
            .ok_or_else(|| anyhow::anyhow!("Unknown backend: {id}. Use 'relay' or 'openai'"));
    }
    if let Some(id) = config::get_default_backend()? {
        if let Some(backend) = Backend::from_id(&id) {
            return Ok(backend);
        }
        tracing::warn!("Ignoring unknown default backend '{id}' from credentials store");
    }
    Ok(config.backend.unwrap_or(Backend::RemoteRelay))
}

fn resolve_tier(options: &TranscribeOptions, config: &DictoConfig) -> anyhow::Result<RelayModelTier> {
    match &options.tier {
        Some(id) => RelayModelTier::from_id(id).ok_or_else(|| {
            let available: Vec<_> = RelayModelTier::all()
                .iter()
                .map(|t| format!("{}: {}", t.id(), t.description()))
                .collect();
            anyhow::anyhow!("Unknown model tier: {id}. Available tiers: {}", available.join(", "))
        }),
        None => Ok(config.relay.model_tier),
    }
}

fn speaker_roster(options: &TranscribeOptions, config: &DictoConfig) -> Vec<String> {
    match &options.speakers {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => config.speakers.clone(),
    }
}

/// Renders tagged words as dialogue, one line per speaker turn.
fn format_tagged(words: &[WordTiming]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_speaker: Option<&str> = None;

    for word in words {
        let speaker = word.speaker.as_deref().unwrap_or("?");
        if current_speaker != Some(speaker) {
            lines.push(format!("{speaker}: {}", word.text));
            current_speaker = Some(speaker);
        } else if let Some(last) = lines.last_mut() {
            last.push(' ');
            last.push_str(&word.text);
        }
    }

    lines.join("\n")
}

/// Routes the final text: file > clipboard > stdout (default).
fn write_output(text: &str, options: &TranscribeOptions) -> anyhow::Result<()> {
    if let Some(file_path) = &options.output {
        std::fs::write(file_path, text)
            .map_err(|e| anyhow::anyhow!("Failed to write to file '{file_path}': {e}"))?;
        tracing::debug!("Transcribed text written to file: {file_path}");
    } else if options.clipboard {
        if let Err(e) = copy_to_clipboard(text) {
            tracing::warn!("Failed to copy to clipboard: {e}");
        } else {
            tracing::debug!("Transcription copied to clipboard");
        }
    } else {
        println!("{text}");
        tracing::debug!("Transcribed text printed to stdout");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_word(text: &str, speaker: &str) -> WordTiming {
        WordTiming {
            text: text.to_string(),
            start: 0.0,
            end: 0.0,
            speaker: Some(speaker.to_string()),
        }
    }

    #[test]
    fn test_format_tagged_groups_consecutive_words_by_speaker() {
        let words = vec![
            tagged_word("bonjour", "Alice"),
            tagged_word("le", "Alice"),
            tagged_word("monde", "Alice"),
            tagged_word("salut", "Bob"),
        ];
        assert_eq!(
            format_tagged(&words),
            "Alice: bonjour le monde\nBob: salut"
        );
    }

    #[test]
    fn test_build_handle_requires_exactly_one_source() {
        let mut options = TranscribeOptions {
            file: None,
            data_uri: None,
            backend: None,
            tier: None,
            raw: false,
            summary: false,
            speakers: None,
            clipboard: false,
            output: None,
        };
        assert!(build_handle(&options).is_err());

        options.file = Some(PathBuf::from("a.m4a"));
        options.data_uri = Some("data:audio/webm;base64,AA==".to_string());
        assert!(build_handle(&options).is_err());

        options.data_uri = None;
        assert!(matches!(
            build_handle(&options).unwrap(),
            AudioHandle::File(_)
        ));
    }
}
