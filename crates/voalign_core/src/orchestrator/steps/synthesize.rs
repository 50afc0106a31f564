//! Synthesize step - renders the timing directive and requests speech.
//!
//! Moves the run from ScriptReady through SynthPending to SynthReady.

use async_trait::async_trait;

use crate::directive::build_directive;
use crate::orchestrator::errors::{FailureKind, StepError, StepResult};
use crate::orchestrator::state::RunPhase;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, SynthesisOutput};

/// Synthesis step for the full narration.
pub struct SynthesizeStep;

impl SynthesizeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SynthesizeStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineStep for SynthesizeStep {
    fn name(&self) -> &str {
        "Synthesis"
    }

    fn description(&self) -> &str {
        "Synthesize narration against the timing directive"
    }

    fn failure_kind(&self) -> FailureKind {
        FailureKind::SynthesisFailed
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.expect_phase(RunPhase::ScriptReady)?;
        if state.script.is_none() {
            return Err(StepError::invalid_input("Script step has not run"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()> {
        let script = state
            .script
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("Script step has not run"))?;
        let total_duration = state
            .total_duration()
            .ok_or_else(|| StepError::invalid_input("Total duration unknown"))?;

        let voice = ctx.voice();
        if voice.persona != ctx.request.target.persona {
            ctx.logger.info(&format!(
                "Persona {} does not fit a {} voice, using {}",
                ctx.request.target.persona, voice.gender, voice.persona
            ));
        }

        let instructions = build_directive(&script.segments, &script.detected_tone, total_duration)
            .with_profile(script.performance_profile.clone())
            .with_tolerance_ms(ctx.settings.synthesis.tolerance_ms)
            .render(&voice);

        ctx.advance(state, RunPhase::SynthPending)?;

        let synthesizer = &ctx.collaborators.speech;
        ctx.logger.info(&format!(
            "Requesting {:.3}s narration from {} with voice {} ({})",
            total_duration,
            synthesizer.name(),
            voice.voice_id,
            voice.persona
        ));
        ctx.logger.debug(&instructions);

        let payload = synthesizer
            .synthesize(&instructions, &voice)
            .await
            .map_err(|e| StepError::service("Speech synthesis", e))?
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StepError::no_result("Synthesizer returned no audio payload"))?;

        state.synthesis = Some(SynthesisOutput {
            voice,
            instructions,
            payload,
        });
        ctx.advance(state, RunPhase::SynthReady)?;

        Ok(())
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.synthesis.is_none() {
            return Err(StepError::invalid_output("Synthesis not recorded"));
        }
        Ok(())
    }
}
