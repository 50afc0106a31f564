//! Media step - samples frames and audio from the source video.
//!
//! Moves the run from Idle to ScriptPending. A video whose audio cannot be
//! decoded still proceeds: script extraction then works from frames alone.

use async_trait::async_trait;

use crate::orchestrator::errors::{FailureKind, StepError, StepResult};
use crate::orchestrator::state::RunPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, MediaOutput, RunState};

/// Media step for sampling the source video.
pub struct MediaStep;

impl MediaStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MediaStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for MediaStep {
    fn name(&self) -> &str {
        "Media"
    }

    fn description(&self) -> &str {
        "Sample frames and audio from the source video"
    }

    fn failure_kind(&self) -> FailureKind {
        FailureKind::MediaExtractionFailed
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.expect_phase(RunPhase::Idle)
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        ctx.advance(state, RunPhase::ScriptPending)?;

        let video = &ctx.request.video_path;
        let extractor = &ctx.collaborators.media;
        ctx.logger.info(&format!(
            "Sampling {} with {}",
            video.display(),
            extractor.name()
        ));

        let media = extractor.extract(video).await?;

        if media.has_audio() {
            ctx.logger.info(&format!(
                "Extracted {} frames and {:.2}s of audio",
                media.frames.len(),
                media.audio.as_ref().map_or(0.0, |a| a.duration_secs())
            ));
        } else {
            ctx.logger.warn(&format!(
                "[{}] No audio context; script extraction will use {} frames only",
                FailureKind::DecodeFailed,
                media.frames.len()
            ));
        }

        let total_duration = match ctx.request.target.total_duration {
            Some(requested) => requested,
            None => {
                ctx.logger.info(&format!(
                    "No duration requested, using video duration {:.3}s",
                    media.duration_secs
                ));
                media.duration_secs
            }
        };

        state.media = Some(MediaOutput {
            media,
            total_duration,
        });

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let output = state
            .media
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("Media not recorded"))?;

        if output.media.frames.is_empty() {
            return Err(StepError::invalid_output("No frames were sampled"));
        }
        if !output.total_duration.is_finite() || output.total_duration <= 0.0 {
            return Err(StepError::invalid_output(format!(
                "Unusable total duration {}",
                output.total_duration
            )));
        }
        Ok(())
    }
}
