//! Transcription service for audio-to-text conversion.
//!
//! This module turns a normalized audio payload into a transcript by talking
//! to one of two backends: a self-hosted Whisper relay or the direct OpenAI
//! API. Each call runs through a bounded retry loop with capped exponential
//! backoff; failures surface as a closed set of classified errors.

pub mod api;
pub mod backend;
pub mod error;
pub mod model;
pub mod retry;

pub use api::{transcribe, TranscriptionConfig};
pub use backend::Backend;
pub use error::TranscribeError;
pub use model::RelayModelTier;
pub use retry::{run_with_retry, AttemptOutcome, RetryPolicy};

/// A successful transcription.
///
/// `words` is populated only by the vendor backend (verbose responses carry
/// per-word timings); the relay returns plain text.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// The transcribed text.
    pub text: String,
    /// Per-word timings, when the backend provides them.
    pub words: Vec<WordTiming>,
}

/// A single word with its time offsets and, after post-processing, a speaker tag.
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    pub text: String,
    /// Offset of the word start from the beginning of the audio, in seconds.
    pub start: f64,
    /// Offset of the word end, in seconds.
    pub end: f64,
    /// Heuristic speaker attribution; `None` until tagging runs.
    pub speaker: Option<String>,
}
