//! Media sampled from the source video.

use crate::audio::PcmBuffer;

/// A still frame sampled from the video, JPEG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Position of the frame in milliseconds.
    pub time_ms: u64,
    pub jpeg_bytes: Vec<u8>,
}

impl VideoFrame {
    pub fn time_secs(&self) -> f64 {
        self.time_ms as f64 / 1000.0
    }
}

/// Everything extracted from the source video for script extraction.
#[derive(Debug, Clone)]
pub struct ExtractedMedia {
    /// Evenly spaced frames in time order.
    pub frames: Vec<VideoFrame>,
    /// Mono 16 kHz speech track, if it could be decoded.
    pub audio: Option<PcmBuffer>,
    /// Container duration in seconds.
    pub duration_secs: f64,
}

impl ExtractedMedia {
    pub fn has_audio(&self) -> bool {
        self.audio.as_ref().is_some_and(|a| !a.is_empty())
    }
}
