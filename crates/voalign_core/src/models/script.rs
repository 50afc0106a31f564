//! Script structures returned by script/timing extraction.

use serde::{Deserialize, Serialize};

/// One unit of narration bound to a time range in the source video.
///
/// `start_time`/`end_time` are seconds from the start of the video. They
/// annotate where the narration should land; overlapping segments are
/// accepted as produced by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSegment {
    /// 1-based position in narration order.
    pub index: u32,
    pub start_time: f64,
    pub end_time: f64,
    /// Translated narration to speak in this slot.
    pub narration_text: String,
    /// Words to stress, in narration order.
    #[serde(default)]
    pub emphasis_markers: Vec<String>,
    #[serde(default)]
    pub emotion_tag: String,
    /// What is on screen during this segment.
    #[serde(default)]
    pub visual_cue_text: String,
}

impl TimedSegment {
    /// Create a segment with only timing and text.
    pub fn new(index: u32, start_time: f64, end_time: f64, narration_text: impl Into<String>) -> Self {
        Self {
            index,
            start_time,
            end_time,
            narration_text: narration_text.into(),
            emphasis_markers: Vec::new(),
            emotion_tag: String::new(),
            visual_cue_text: String::new(),
        }
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion_tag = emotion.into();
        self
    }

    pub fn with_emphasis<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emphasis_markers = words.into_iter().map(Into::into).collect();
        self
    }

    /// Length of the slot in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Check the segment's own invariants.
    pub fn check(&self) -> Result<(), SegmentIssue> {
        if self.index == 0 {
            return Err(SegmentIssue::ZeroIndex);
        }
        if !self.start_time.is_finite() || !self.end_time.is_finite() || self.start_time < 0.0 {
            return Err(SegmentIssue::InvalidTime {
                index: self.index,
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.end_time <= self.start_time {
            return Err(SegmentIssue::EmptyRange {
                index: self.index,
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.narration_text.trim().is_empty() {
            return Err(SegmentIssue::NoNarration { index: self.index });
        }
        Ok(())
    }
}

/// Why a segment was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentIssue {
    #[error("segment index must start at 1")]
    ZeroIndex,

    #[error("segment {index} has invalid times {start}..{end}")]
    InvalidTime { index: u32, start: f64, end: f64 },

    #[error("segment {index} ends at {end} before it starts at {start}")]
    EmptyRange { index: u32, start: f64, end: f64 },

    #[error("segment {index} has no narration text")]
    NoNarration { index: u32 },
}

/// Delivery descriptors for the whole narration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    /// Overall speaking pace (e.g. "brisk", "relaxed").
    #[serde(default)]
    pub pacing: String,
    /// Energy level (e.g. "high", "subdued").
    #[serde(default)]
    pub energy: String,
    /// Free-form delivery notes.
    #[serde(default)]
    pub delivery_notes: Vec<String>,
}

/// Full result of script/timing extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResult {
    /// Tone of the original speech.
    pub detected_tone: String,
    #[serde(default)]
    pub performance_profile: PerformanceProfile,
    /// Segments in narration order.
    pub segments: Vec<TimedSegment>,
}

impl ScriptResult {
    /// Check that the script is usable: at least one segment, all well formed.
    ///
    /// Overlaps and gaps between segments are not checked.
    pub fn check(&self) -> Result<(), String> {
        if self.segments.is_empty() {
            return Err("script contains no segments".to_string());
        }
        for segment in &self.segments {
            segment.check().map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// End time of the last-ending segment.
    pub fn narration_end(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end_time)
            .fold(0.0, f64::max)
    }
}
