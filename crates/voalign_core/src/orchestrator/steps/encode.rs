//! Encode step - wraps the aligned PCM in a WAV container.
//!
//! Moves the run from Resampling to Done.

use async_trait::async_trait;

use crate::audio::AudioArtifact;
use crate::orchestrator::errors::{FailureKind, StepError, StepResult};
use crate::orchestrator::state::RunPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState};

/// Encode step producing the final artifact.
pub struct EncodeStep;

impl EncodeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EncodeStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for EncodeStep {
    fn name(&self) -> &str {
        "Encode"
    }

    fn description(&self) -> &str {
        "Encode narration as WAV"
    }

    fn failure_kind(&self) -> FailureKind {
        FailureKind::SynthesisFailed
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.expect_phase(RunPhase::Resampling)?;
        if state.aligned.is_none() {
            return Err(StepError::invalid_input("Resample step has not run"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let aligned = state
            .aligned
            .take()
            .ok_or_else(|| StepError::invalid_input("Resample step has not run"))?;

        let artifact = AudioArtifact::from_pcm(aligned);
        ctx.logger.info(&format!(
            "Encoded {:.3}s WAV ({} bytes)",
            artifact.actual_duration_seconds(),
            artifact.container_bytes().len()
        ));

        state.set_artifact(artifact);
        ctx.advance(state, RunPhase::Done)?;

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.artifact().is_none() {
            return Err(StepError::invalid_output("Artifact not recorded"));
        }
        Ok(())
    }
}
