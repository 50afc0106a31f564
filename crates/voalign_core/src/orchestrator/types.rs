//! Core types for the alignment pipeline.

use std::sync::Arc;

use super::errors::{StepError, StepResult, TransitionError};
use super::state::RunPhase;
use crate::audio::{target_sample_count, AudioArtifact, PcmBuffer, MAX_WAV_SAMPLES};
use crate::config::Settings;
use crate::extraction::MediaExtractor;
use crate::logging::RunLogger;
use crate::models::{AlignmentRequest, ExtractedMedia, ScriptResult};
use crate::services::{ScriptExtractor, SpeechPayload, SpeechSynthesizer};
use crate::voice::{select_voice, VoiceIdentity};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// The external collaborators a run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub media: Arc<dyn MediaExtractor>,
    pub scripts: Arc<dyn ScriptExtractor>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Collaborators {
    pub fn new(
        media: Arc<dyn MediaExtractor>,
        scripts: Arc<dyn ScriptExtractor>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            media,
            scripts,
            speech,
        }
    }
}

/// Read-only context passed to pipeline steps.
///
/// Contains the request and shared resources that steps can read but not
/// modify. Mutable state goes in `RunState`.
pub struct Context {
    /// What to narrate and how.
    pub request: AlignmentRequest,
    /// Application settings.
    pub settings: Settings,
    /// Run name/identifier.
    pub run_name: String,
    /// External collaborators.
    pub collaborators: Collaborators,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(
        request: AlignmentRequest,
        settings: Settings,
        run_name: impl Into<String>,
        collaborators: Collaborators,
        logger: Arc<RunLogger>,
    ) -> Self {
        Self {
            request,
            settings,
            run_name: run_name.into(),
            collaborators,
            logger,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set) and the run log.
    pub fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        self.logger.progress(percent);
        if let Some(ref callback) = self.progress_callback {
            callback(step_name, percent, message);
        }
    }

    /// Advance the run's phase and record the transition in the run log.
    pub fn advance(&self, state: &mut RunState, next: RunPhase) -> Result<(), TransitionError> {
        let from = state.phase();
        state.advance(next)?;
        self.logger.transition(from.name(), next.name());
        Ok(())
    }

    /// Voice for this run, with persona fallback applied.
    pub fn voice(&self) -> VoiceIdentity {
        select_voice(self.request.target.gender, self.request.target.persona)
    }

    /// Check the request before anything runs.
    pub fn validate_request(&self) -> Result<(), String> {
        let target = &self.request.target;
        if target.language.trim().is_empty() {
            return Err("target language is empty".to_string());
        }
        if let Some(duration) = target.total_duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(format!("total duration must be positive, got {}", duration));
            }
            let rate = self.settings.synthesis.sample_rate;
            if target_sample_count(duration, rate) > MAX_WAV_SAMPLES {
                return Err(format!(
                    "total duration {}s does not fit a WAV file at {} Hz",
                    duration, rate
                ));
            }
        }
        if self.request.video_path.as_os_str().is_empty() {
            return Err("no video given".to_string());
        }
        Ok(())
    }
}

/// Media sampled in the first step, with the resolved output length.
#[derive(Debug, Clone)]
pub struct MediaOutput {
    pub media: ExtractedMedia,
    /// Requested duration, or the video's own when none was requested.
    pub total_duration: f64,
}

/// Synthesized speech and the instruction that produced it.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub voice: VoiceIdentity,
    pub instructions: String,
    pub payload: SpeechPayload,
}

/// Mutable run state that accumulates results from pipeline steps.
///
/// Steps add new data but do not overwrite existing values. Each step's
/// output is stored in its own section. The phase only moves through
/// `advance`/`fail`.
#[derive(Debug, Default)]
pub struct RunState {
    /// Unique run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Option<String>,
    phase: RunPhase,
    /// Sampled media (from Media step).
    pub media: Option<MediaOutput>,
    /// Timed script (from Script step).
    pub script: Option<ScriptResult>,
    /// Raw synthesized speech (from Synthesis step).
    pub synthesis: Option<SynthesisOutput>,
    /// Exact-length PCM (from Resample step).
    pub aligned: Option<PcmBuffer>,
    /// Finished artifact (from Encode step).
    artifact: Option<AudioArtifact>,
}

impl RunState {
    /// Create a new run state with the given ID.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Move to `next`, rejecting transitions the state machine forbids.
    pub fn advance(&mut self, next: RunPhase) -> Result<(), TransitionError> {
        self.phase = self.phase.transition(next)?;
        Ok(())
    }

    /// Move to `Failed` and drop everything produced so far.
    pub(crate) fn fail(&mut self) -> Result<(), TransitionError> {
        self.phase = self.phase.transition(RunPhase::Failed)?;
        self.aligned = None;
        self.artifact = None;
        Ok(())
    }

    /// Check that the run is in `expected` before a step starts.
    pub fn expect_phase(&self, expected: RunPhase) -> StepResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(StepError::invalid_input(format!(
                "expected phase {}, run is in {}",
                expected, self.phase
            )))
        }
    }

    /// Resolved total duration, once media has been sampled.
    pub fn total_duration(&self) -> Option<f64> {
        self.media.as_ref().map(|m| m.total_duration)
    }

    pub(crate) fn set_artifact(&mut self, artifact: AudioArtifact) {
        self.artifact = Some(artifact);
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// Hand the artifact to the caller. Only a finished run has one.
    pub fn take_artifact(&mut self) -> Option<AudioArtifact> {
        if self.phase == RunPhase::Done {
            self.artifact.take()
        } else {
            None
        }
    }
}
