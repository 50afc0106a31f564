//! Generative service boundary.
//!
//! Script extraction and speech synthesis are external collaborators. The
//! orchestrator only sees the traits defined here; `gemini` provides the
//! REST-backed implementation.
//!
//! Each call is a single suspension point. No retries or timeouts are
//! applied at this layer.

pub mod gemini;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::audio::PcmBuffer;
use crate::models::{ScriptResult, VideoFrame};
use crate::voice::VoiceIdentity;

pub use gemini::{GeminiClient, GeminiConfig};

/// Errors from an external service call.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("Request to {service} failed: {message}")]
    Transport { service: String, message: String },

    /// The service answered with a non-success status.
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    /// The response could not be understood.
    #[error("Malformed response from {service}: {message}")]
    Malformed { service: String, message: String },

    /// The response was well formed but carried nothing usable.
    #[error("{service} returned no {what}")]
    Empty { service: String, what: String },
}

impl ServiceError {
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn status(service: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            service: service.into(),
            status,
            body: body.into(),
        }
    }

    pub fn malformed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn empty(service: impl Into<String>, what: impl Into<String>) -> Self {
        Self::Empty {
            service: service.into(),
            what: what.into(),
        }
    }
}

/// Result type for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Inputs for script/timing extraction.
#[derive(Debug, Clone, Copy)]
pub struct ScriptRequest<'a> {
    pub frames: &'a [VideoFrame],
    /// Mono 16 kHz speech, absent when the video's audio could not be decoded.
    pub audio: Option<&'a PcmBuffer>,
    pub target_language: &'a str,
    pub total_duration: f64,
}

/// Audio returned by the synthesizer, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechPayload {
    pub data_base64: String,
    pub mime_type: Option<String>,
}

impl SpeechPayload {
    /// Sample rate declared in the MIME type (`audio/L16;rate=24000`), if any.
    pub fn declared_sample_rate(&self) -> Option<u32> {
        let mime = self.mime_type.as_deref()?;
        mime.split(';')
            .filter_map(|param| param.trim().strip_prefix("rate="))
            .find_map(|rate| rate.trim().parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.data_base64.trim().is_empty()
    }

    /// Decode to 16-bit little-endian PCM.
    ///
    /// Uses the declared rate when present, otherwise `fallback_rate`.
    pub fn decode_pcm(&self, fallback_rate: u32) -> ServiceResult<PcmBuffer> {
        let bytes = BASE64
            .decode(self.data_base64.trim())
            .map_err(|e| ServiceError::malformed("speech payload", e.to_string()))?;
        let rate = self.declared_sample_rate().unwrap_or(fallback_rate);
        let pcm = PcmBuffer::from_le_bytes(&bytes, rate);
        if pcm.is_empty() {
            return Err(ServiceError::empty("speech payload", "PCM samples"));
        }
        Ok(pcm)
    }
}

/// Extracts a timed, translated script from sampled video.
#[async_trait]
pub trait ScriptExtractor: Send + Sync {
    /// Service name for logs and errors.
    fn name(&self) -> &str;

    async fn extract_script(&self, request: ScriptRequest<'_>) -> ServiceResult<ScriptResult>;
}

/// Synthesizes speech from instruction text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Service name for logs and errors.
    fn name(&self) -> &str;

    /// Returns `None` when the service produced no audio.
    async fn synthesize(
        &self,
        instructions: &str,
        voice: &VoiceIdentity,
    ) -> ServiceResult<Option<SpeechPayload>>;
}
