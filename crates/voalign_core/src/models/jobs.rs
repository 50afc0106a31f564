//! Alignment request structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::voice::{Gender, Persona};

/// What the narration should sound like and how long it must be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Language to translate the narration into (e.g. "French").
    pub language: String,
    pub gender: Gender,
    /// Requested persona; replaced by the gender default if inconsistent.
    pub persona: Persona,
    /// Exact output duration in seconds. Defaults to the video duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
}

impl TargetConfig {
    pub fn new(language: impl Into<String>, gender: Gender, persona: Persona) -> Self {
        Self {
            language: language.into(),
            gender,
            persona,
            total_duration: None,
        }
    }

    pub fn with_total_duration(mut self, seconds: f64) -> Self {
        self.total_duration = Some(seconds);
        self
    }
}

/// One generation request: a source video and the target configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    pub video_path: PathBuf,
    pub target: TargetConfig,
}

impl AlignmentRequest {
    pub fn new(video_path: impl Into<PathBuf>, target: TargetConfig) -> Self {
        Self {
            video_path: video_path.into(),
            target,
        }
    }

    /// File stem of the source video, used to name the artifact.
    pub fn video_stem(&self) -> String {
        self.video_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "narration".to_string())
    }
}
