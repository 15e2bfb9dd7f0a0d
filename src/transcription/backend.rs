//! Transcription backend definitions and methods.
//!
//! Defines the two supported backends: the self-hosted Whisper relay and the
//! direct OpenAI (vendor) API. The selection determines endpoint, credential
//! header and request shape.

use serde::{Deserialize, Serialize};

/// Represents a supported transcription backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Self-hosted proxy forwarding audio to a Whisper engine
    #[serde(rename = "relay")]
    RemoteRelay,
    /// Direct OpenAI Whisper API
    #[serde(rename = "openai")]
    VendorDirect,
}

impl Backend {
    pub fn id(&self) -> &'static str {
        match self {
            Backend::RemoteRelay => "relay",
            Backend::VendorDirect => "openai",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::RemoteRelay => "Whisper relay",
            Backend::VendorDirect => "OpenAI",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "relay" => Some(Backend::RemoteRelay),
            "openai" => Some(Backend::VendorDirect),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Backend::RemoteRelay, Backend::VendorDirect]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_id_roundtrip() {
        for backend in Backend::all() {
            assert_eq!(Backend::from_id(backend.id()), Some(*backend));
        }
        assert_eq!(Backend::from_id("deepgram"), None);
    }
}
