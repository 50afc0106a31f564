//! Resample step - decodes synthesized speech and forces its length.
//!
//! Moves the run from SynthReady to Resampling. Whatever rate the payload
//! arrived at, the output is at the configured synthesis rate and holds
//! exactly `round(total_duration * rate)` samples.

use async_trait::async_trait;

use crate::audio::{target_sample_count, MAX_WAV_SAMPLES};
use crate::orchestrator::errors::{FailureKind, StepError, StepResult};
use crate::orchestrator::state::RunPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState};

/// Resample step for exact-duration alignment.
pub struct ResampleStep;

impl ResampleStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResampleStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for ResampleStep {
    fn name(&self) -> &str {
        "Resample"
    }

    fn description(&self) -> &str {
        "Stretch narration to the target duration"
    }

    fn failure_kind(&self) -> FailureKind {
        FailureKind::SynthesisFailed
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.expect_phase(RunPhase::SynthReady)?;
        if state.synthesis.is_none() {
            return Err(StepError::invalid_input("Synthesis step has not run"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        ctx.advance(state, RunPhase::Resampling)?;

        let synthesis = state
            .synthesis
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("Synthesis step has not run"))?;
        let total_duration = state
            .total_duration()
            .ok_or_else(|| StepError::invalid_input("Total duration unknown"))?;

        let pcm = synthesis
            .payload
            .decode_pcm(ctx.settings.synthesis.sample_rate)
            .map_err(|e| StepError::service("Decoding synthesized audio", e))?;

        let output_rate = ctx.settings.synthesis.sample_rate;
        let target = target_sample_count(total_duration, output_rate);
        if target == 0 {
            return Err(StepError::invalid_input(format!(
                "{:.6}s is shorter than one sample at {} Hz",
                total_duration, output_rate
            )));
        }
        if target > MAX_WAV_SAMPLES {
            return Err(StepError::invalid_input(format!(
                "{:.3}s does not fit a WAV file at {} Hz",
                total_duration, output_rate
            )));
        }

        ctx.logger.info(&format!(
            "Resampling {} samples ({:.3}s at {} Hz) to {} samples ({:.3}s at {} Hz)",
            pcm.len(),
            pcm.duration_secs(),
            pcm.sample_rate(),
            target,
            total_duration,
            output_rate
        ));

        state.aligned = Some(pcm.resampled_to(target, output_rate));

        Ok(())
    }

    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        let (Some(aligned), Some(total)) = (state.aligned.as_ref(), state.total_duration()) else {
            return Err(StepError::invalid_output("Aligned audio not recorded"));
        };
        let rate = ctx.settings.synthesis.sample_rate;
        if aligned.sample_rate() != rate {
            return Err(StepError::invalid_output(format!(
                "Aligned audio is at {} Hz, expected {} Hz",
                aligned.sample_rate(),
                rate
            )));
        }
        let expected = target_sample_count(total, rate);
        if aligned.len() != expected {
            return Err(StepError::invalid_output(format!(
                "Aligned audio has {} samples, expected {}",
                aligned.len(),
                expected
            )));
        }
        Ok(())
    }
}
