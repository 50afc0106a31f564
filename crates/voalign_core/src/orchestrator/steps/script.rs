//! Script step - asks the script extractor for a timed, translated script.
//!
//! Moves the run from ScriptPending to ScriptReady. An empty or malformed
//! script fails the run before any synthesis is attempted.

use async_trait::async_trait;

use crate::orchestrator::errors::{FailureKind, StepError, StepResult};
use crate::orchestrator::state::RunPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState};
use crate::services::ScriptRequest;

/// Script step for timed script extraction.
pub struct ScriptStep;

impl ScriptStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScriptStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ScriptStep {
    fn name(&self) -> &str {
        "Script"
    }

    fn description(&self) -> &str {
        "Extract timed narration script"
    }

    fn failure_kind(&self) -> FailureKind {
        FailureKind::ScriptExtractionFailed
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.expect_phase(RunPhase::ScriptPending)?;
        if state.media.is_none() {
            return Err(StepError::invalid_input("Media step has not run"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let output = state
            .media
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("Media step has not run"))?;

        let request = ScriptRequest {
            frames: &output.media.frames,
            audio: output.media.audio.as_ref(),
            target_language: &ctx.request.target.language,
            total_duration: output.total_duration,
        };

        let extractor = &ctx.collaborators.scripts;
        ctx.logger.info(&format!(
            "Requesting {} script from {} ({} frames, audio: {})",
            request.target_language,
            extractor.name(),
            request.frames.len(),
            if request.audio.is_some() { "yes" } else { "no" }
        ));

        let script = extractor
            .extract_script(request)
            .await
            .map_err(|e| StepError::service("Script extraction", e))?;

        script.check().map_err(StepError::no_result)?;

        let narration_end = script.narration_end();
        if narration_end > output.total_duration {
            ctx.logger.warn(&format!(
                "Script runs to {:.3}s, past the {:.3}s target; narration will be compressed",
                narration_end, output.total_duration
            ));
        }

        ctx.logger.info(&format!(
            "Script ready: {} segments, tone '{}'",
            script.segments.len(),
            script.detected_tone
        ));
        for segment in &script.segments {
            ctx.logger.debug(&format!(
                "  #{} [{:.3}-{:.3}] {}",
                segment.index, segment.start_time, segment.end_time, segment.narration_text
            ));
        }

        state.script = Some(script);
        ctx.advance(state, RunPhase::ScriptReady)?;

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.script {
            Some(script) if !script.segments.is_empty() => Ok(()),
            Some(_) => Err(StepError::invalid_output("Script has no segments")),
            None => Err(StepError::invalid_output("Script not recorded")),
        }
    }
}
