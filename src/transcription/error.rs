//! Transcription error taxonomy and classification.
//!
//! Maps raw failure signals (HTTP status codes, network exceptions, error
//! response bodies) into a closed set of user-facing error categories.
//! Classification is deterministic: the same raw signal always yields the same
//! category, and the category alone decides whether an attempt is retried.

use serde::Deserialize;
use thiserror::Error;

/// Closed set of failures the transcription pipeline can surface.
///
/// Every variant carries a human-readable message suitable for direct display.
/// Raw status codes, response bodies and stack traces never reach the caller;
/// they are logged at debug level where classification happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscribeError {
    /// The audio handle was empty, missing or unreadable. Raised before any
    /// network activity and never retried.
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// The audio exceeds the upload size limit. Raised locally before any
    /// network activity (or by the server via HTTP 413) and never retried.
    #[error("Audio file is too large. The upload limit is 25 MiB.")]
    PayloadTooLarge,

    /// The API key was rejected (HTTP 401/403). Run 'dicto auth' to update it.
    #[error("API key is invalid or expired. Run 'dicto auth' to update it.")]
    AuthenticationError,

    /// The endpoint does not exist (HTTP 404). Usually a misconfigured relay URL.
    #[error("Transcription endpoint not found. Check the relay URL in your configuration.")]
    ServiceNotFound,

    /// The endpoint rejected the HTTP method (HTTP 405). The configured URL
    /// points at something that is not a transcription endpoint.
    #[error("The configured endpoint does not accept transcription requests (method not allowed).")]
    MethodNotAllowed,

    /// The service is down or failing (HTTP 5xx, or a failed health probe).
    #[error("Transcription service is unavailable. Try again later.")]
    ServiceUnavailable,

    /// Too many requests (HTTP 429 without a quota indication).
    #[error("Rate limit reached. Wait a moment and try again.")]
    RateLimited,

    /// The attempt exceeded its time budget. The in-flight request is cancelled.
    #[error("Transcription request timed out.")]
    Timeout,

    /// A connection-level failure (DNS, refused connection, dropped socket).
    #[error("Could not reach the transcription service. Check your internet connection.")]
    NetworkUnreachable,

    /// The vendor account is out of credit (429 with an insufficient_quota body).
    #[error("API quota exceeded. Check your account billing.")]
    QuotaExceeded,

    /// Anything that does not fit the taxonomy. Carries the server's own
    /// message when one could be extracted.
    #[error("Transcription failed: {0}")]
    Unknown(String),

    /// Caller-initiated abort, checked between attempts. Never produced by
    /// classification of a backend response.
    #[error("Transcription cancelled.")]
    Cancelled,
}

/// Error body shape shared by the relay and the vendor API:
/// either `{"error": "..."}` or `{"error": {"message": "...", "code": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Message(String),
    Detail {
        message: String,
        #[serde(default)]
        code: Option<String>,
    },
}

impl TranscribeError {
    /// Classifies a non-success HTTP response by status code, falling back to
    /// the JSON error body for quota detection and unknown-status messages.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => TranscribeError::AuthenticationError,
            404 => TranscribeError::ServiceNotFound,
            405 => TranscribeError::MethodNotAllowed,
            413 => TranscribeError::PayloadTooLarge,
            429 => {
                if body_mentions_quota(body) {
                    TranscribeError::QuotaExceeded
                } else {
                    TranscribeError::RateLimited
                }
            }
            0 => TranscribeError::ServiceUnavailable,
            s if s >= 500 => TranscribeError::ServiceUnavailable,
            s => TranscribeError::Unknown(
                extract_error_message(body).unwrap_or_else(|| format!("HTTP {s}")),
            ),
        }
    }

    /// Classifies a transport-level failure from reqwest.
    ///
    /// Timeouts become `Timeout`; everything else at the connection level
    /// becomes `NetworkUnreachable`. Response decode failures (the request
    /// itself succeeded) fall into `Unknown`.
    pub fn from_request_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TranscribeError::Timeout
        } else if err.is_decode() {
            TranscribeError::Unknown(format!("unreadable response: {err}"))
        } else {
            TranscribeError::NetworkUnreachable
        }
    }

    /// Whether the retry loop may make another attempt after this failure.
    ///
    /// Only transient classes are retryable; validation and credential
    /// failures surface immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranscribeError::ServiceUnavailable
                | TranscribeError::Timeout
                | TranscribeError::NetworkUnreachable
        )
    }
}

/// Whether a 429 body indicates exhausted account credit rather than a
/// transient rate limit. OpenAI reports this as code `insufficient_quota`.
fn body_mentions_quota(body: &str) -> bool {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let ErrorField::Detail { code: Some(code), message } = &parsed.error {
            return code == "insufficient_quota" || message.contains("quota");
        }
    }
    body.contains("insufficient_quota")
}

/// Pulls the human message out of a JSON error body, if there is one.
fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    Some(match parsed.error {
        ErrorField::Message(m) => m,
        ErrorField::Detail { message, .. } => message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_are_terminal() {
        for status in [401, 403] {
            let err = TranscribeError::from_status(status, "");
            assert_eq!(err, TranscribeError::AuthenticationError);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        for status in [0, 500, 502, 503, 504] {
            let err = TranscribeError::from_status(status, "");
            assert_eq!(err, TranscribeError::ServiceUnavailable);
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert_eq!(
            TranscribeError::from_status(404, ""),
            TranscribeError::ServiceNotFound
        );
        assert_eq!(
            TranscribeError::from_status(405, ""),
            TranscribeError::MethodNotAllowed
        );
        assert_eq!(
            TranscribeError::from_status(413, ""),
            TranscribeError::PayloadTooLarge
        );
        assert!(!TranscribeError::from_status(404, "").is_retryable());
    }

    #[test]
    fn test_429_splits_on_quota() {
        let quota_body =
            r#"{"error":{"message":"You exceeded your current quota","code":"insufficient_quota"}}"#;
        assert_eq!(
            TranscribeError::from_status(429, quota_body),
            TranscribeError::QuotaExceeded
        );
        assert_eq!(
            TranscribeError::from_status(429, r#"{"error":"slow down"}"#),
            TranscribeError::RateLimited
        );
    }

    #[test]
    fn test_unknown_status_uses_body_message() {
        let err = TranscribeError::from_status(418, r#"{"error":"je suis une théière"}"#);
        assert_eq!(
            err,
            TranscribeError::Unknown("je suis une théière".to_string())
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = TranscribeError::from_status(503, "whatever");
        let b = TranscribeError::from_status(503, "whatever");
        assert_eq!(a, b);
        assert_eq!(a.is_retryable(), b.is_retryable());
    }
}
