//! Audio payload normalization.
//!
//! Turns an [`AudioHandle`] (file path, in-memory buffer or embedded data URI)
//! into a validated, transfer-ready [`AudioPayload`]. All size and existence
//! checks happen here, before any network activity: an empty or missing handle
//! is `InvalidAudio`, anything over 25 MiB is `PayloadTooLarge`, and neither
//! is ever retried.

use base64::Engine;
use std::path::PathBuf;

use crate::transcription::TranscribeError;

/// Upload size limit enforced before transmission.
pub const MAX_PAYLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// A reference to recorded audio, produced by the recording/import surface.
///
/// Consumed exactly once by the transcription client; never mutated.
#[derive(Debug, Clone)]
pub enum AudioHandle {
    /// Audio stored on disk.
    File(PathBuf),
    /// Audio held in memory, with an optional MIME hint from the capture layer.
    Buffer {
        data: Vec<u8>,
        mime: Option<String>,
    },
    /// Audio embedded as a `data:<mime>;base64,<payload>` URI.
    DataUri(String),
}

/// A validated, transfer-ready payload: raw bytes plus the filename and
/// content type to attach to the multipart upload.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl AudioPayload {
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Capability interface for turning a handle into a payload.
///
/// The capture surface differs in what container it records to: browser
/// capture produces WebM, native capture produces M4A. Rather than branching
/// on platform throughout the client, the caller picks a builder once at
/// construction time and the defaults follow from it.
pub trait PayloadBuilder {
    /// Content type assumed when the handle carries no MIME hint.
    fn default_mime(&self) -> &'static str;

    /// File extension matching [`PayloadBuilder::default_mime`].
    fn default_extension(&self) -> &'static str;

    /// Normalizes and validates a handle into a transmittable payload.
    ///
    /// # Errors
    /// - `InvalidAudio` if the handle is empty, missing or undecodable
    /// - `PayloadTooLarge` if the audio exceeds [`MAX_PAYLOAD_BYTES`]
    fn build(&self, handle: &AudioHandle) -> Result<AudioPayload, TranscribeError> {
        let (data, mime, file_name) = match handle {
            AudioHandle::File(path) => {
                let metadata = std::fs::metadata(path).map_err(|e| {
                    TranscribeError::InvalidAudio(format!(
                        "audio file not found: {} ({e})",
                        path.display()
                    ))
                })?;
                if metadata.len() == 0 {
                    return Err(TranscribeError::InvalidAudio(format!(
                        "audio file is empty: {}",
                        path.display()
                    )));
                }
                if metadata.len() > MAX_PAYLOAD_BYTES {
                    return Err(TranscribeError::PayloadTooLarge);
                }
                let data = std::fs::read(path).map_err(|e| {
                    TranscribeError::InvalidAudio(format!(
                        "failed to read audio file {}: {e}",
                        path.display()
                    ))
                })?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| format!("audio.{}", self.default_extension()));
                let mime = mime_from_extension(path).map(str::to_string);
                (data, mime, file_name)
            }
            AudioHandle::Buffer { data, mime } => {
                (data.clone(), mime.clone(), default_file_name(self))
            }
            AudioHandle::DataUri(uri) => {
                let (data, mime) = decode_data_uri(uri)?;
                (data, mime, default_file_name(self))
            }
        };

        if data.is_empty() {
            return Err(TranscribeError::InvalidAudio(
                "audio is empty (zero bytes)".to_string(),
            ));
        }
        if data.len() as u64 > MAX_PAYLOAD_BYTES {
            return Err(TranscribeError::PayloadTooLarge);
        }

        let mime_type = mime.unwrap_or_else(|| self.default_mime().to_string());
        tracing::debug!(
            "Normalized audio payload: {} bytes, {} ({})",
            data.len(),
            file_name,
            mime_type
        );

        Ok(AudioPayload {
            data,
            file_name,
            mime_type,
        })
    }
}

/// Builder for audio captured in a browser (MediaRecorder output).
pub struct BrowserCapture;

impl PayloadBuilder for BrowserCapture {
    fn default_mime(&self) -> &'static str {
        "audio/webm"
    }

    fn default_extension(&self) -> &'static str {
        "webm"
    }
}

/// Builder for audio captured by a native recorder.
pub struct NativeCapture;

impl PayloadBuilder for NativeCapture {
    fn default_mime(&self) -> &'static str {
        "audio/m4a"
    }

    fn default_extension(&self) -> &'static str {
        "m4a"
    }
}

fn default_file_name(builder: &(impl PayloadBuilder + ?Sized)) -> String {
    format!("recording.{}", builder.default_extension())
}

/// Decodes a `data:<mime>;base64,<payload>` URI into raw bytes and its
/// declared content type.
fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, Option<String>), TranscribeError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| TranscribeError::InvalidAudio("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| TranscribeError::InvalidAudio("malformed data URI".to_string()))?;

    let (mime, is_base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    if !is_base64 {
        return Err(TranscribeError::InvalidAudio(
            "data URI is not base64-encoded".to_string(),
        ));
    }

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| TranscribeError::InvalidAudio(format!("invalid base64 audio data: {e}")))?;

    let mime = if mime.is_empty() {
        None
    } else {
        Some(mime.to_string())
    };
    Ok((data, mime))
}

/// Infers the content type from a file extension for the common recording
/// containers. Unknown extensions fall back to the builder default.
fn mime_from_extension(path: &std::path::Path) -> Option<&'static str> {
    match path
        .extension()?
        .to_string_lossy()
        .to_ascii_lowercase()
        .as_str()
    {
        "webm" => Some("audio/webm"),
        "m4a" => Some("audio/m4a"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "ogg" => Some("audio/ogg"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_buffer_is_invalid_audio() {
        let handle = AudioHandle::Buffer {
            data: vec![],
            mime: None,
        };
        let err = NativeCapture.build(&handle).unwrap_err();
        assert!(matches!(err, TranscribeError::InvalidAudio(_)));
    }

    #[test]
    fn test_oversized_buffer_is_rejected_locally() {
        let handle = AudioHandle::Buffer {
            data: vec![0u8; (MAX_PAYLOAD_BYTES + 1) as usize],
            mime: None,
        };
        let err = NativeCapture.build(&handle).unwrap_err();
        assert_eq!(err, TranscribeError::PayloadTooLarge);
    }

    #[test]
    fn test_missing_file_is_invalid_audio() {
        let dir = tempfile::tempdir().unwrap();
        let handle = AudioHandle::File(dir.path().join("does-not-exist.m4a"));
        let err = NativeCapture.build(&handle).unwrap_err();
        assert!(matches!(err, TranscribeError::InvalidAudio(_)));
    }

    #[test]
    fn test_zero_length_file_is_invalid_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.m4a");
        std::fs::File::create(&path).unwrap();
        let err = NativeCapture.build(&AudioHandle::File(path)).unwrap_err();
        assert!(matches!(err, TranscribeError::InvalidAudio(_)));
    }

    #[test]
    fn test_file_payload_keeps_name_and_infers_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meeting.wav");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"RIFF....WAVE").unwrap();
        let payload = NativeCapture.build(&AudioHandle::File(path)).unwrap();
        assert_eq!(payload.file_name, "meeting.wav");
        assert_eq!(payload.mime_type, "audio/wav");
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_data_uri_roundtrip() {
        let bytes = b"fake webm bytes";
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        let uri = format!("data:audio/webm;base64,{encoded}");
        let payload = BrowserCapture.build(&AudioHandle::DataUri(uri)).unwrap();
        assert_eq!(payload.data, bytes);
        assert_eq!(payload.mime_type, "audio/webm");
        assert_eq!(payload.file_name, "recording.webm");
    }

    #[test]
    fn test_malformed_data_uri_is_invalid_audio() {
        for uri in ["data:audio/webm;base64", "audio/webm;base64,AAAA", "data:audio/webm,plain"] {
            let err = BrowserCapture
                .build(&AudioHandle::DataUri(uri.to_string()))
                .unwrap_err();
            assert!(matches!(err, TranscribeError::InvalidAudio(_)), "{uri}");
        }
    }

    #[test]
    fn test_builder_defaults_differ_by_capture_source() {
        let handle = AudioHandle::Buffer {
            data: vec![1, 2, 3],
            mime: None,
        };
        assert_eq!(BrowserCapture.build(&handle).unwrap().mime_type, "audio/webm");
        assert_eq!(NativeCapture.build(&handle).unwrap().mime_type, "audio/m4a");
    }

    #[test]
    fn test_explicit_mime_hint_wins_over_default() {
        let handle = AudioHandle::Buffer {
            data: vec![1, 2, 3],
            mime: Some("audio/ogg".to_string()),
        };
        assert_eq!(NativeCapture.build(&handle).unwrap().mime_type, "audio/ogg");
    }
}
