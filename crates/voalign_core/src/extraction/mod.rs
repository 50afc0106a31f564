//! Media extraction from the source video.
//!
//! Produces the evenly spaced still frames and the optional mono 16 kHz
//! audio extract that script extraction works from. Audio that cannot be
//! decoded is not an error: the extract is `None` and script extraction
//! proceeds on frames alone.

mod ffmpeg;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ExtractedMedia;

pub use ffmpeg::{frame_times_ms, FfmpegExtractor};

/// Error types for extraction operations.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Source file not found.
    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    /// FFmpeg or FFprobe could not be run or failed.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// Container metadata was unusable.
    #[error("Failed to read duration of {path}: {message}")]
    MetadataFailed { path: String, message: String },

    /// A frame could not be extracted or re-encoded.
    #[error("Failed to extract frame at {time_ms}ms: {message}")]
    FrameFailed { time_ms: u64, message: String },

    /// Audio could not be decoded. Recovered by the caller.
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for extraction operations.
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Samples frames and audio from a video.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Extractor name for logs.
    fn name(&self) -> &str;

    /// Extract frames, optional audio, and the duration of `video`.
    ///
    /// Must return `Ok` with `audio: None` when only the audio decode fails.
    async fn extract(&self, video: &Path) -> ExtractionResult<ExtractedMedia>;
}
