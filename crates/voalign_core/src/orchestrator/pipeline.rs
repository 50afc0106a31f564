//! Pipeline runner that executes steps in sequence.

use super::errors::{AlignmentError, AlignmentResult, StepError};
use super::state::RunPhase;
use super::step::PipelineStep;
use super::types::{Context, RunState};

/// Pipeline that runs a sequence of steps.
///
/// The pipeline executes steps in order, running validation before and
/// after each step. Every failure of a run passes through `fail_run`, so
/// the `Failed` transition happens in exactly one place.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run the pipeline with the given context and state.
    ///
    /// Validates the request, then executes each step in order:
    /// 1. Run `validate_input`
    /// 2. Run `execute`
    /// 3. Run `validate_output`
    pub async fn run(
        &self,
        ctx: &Context,
        state: &mut RunState,
    ) -> AlignmentResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
        };

        if let Err(message) = ctx.validate_request() {
            ctx.logger.error(&format!("Invalid request: {}", message));
            return Err(AlignmentError::invalid_request(&ctx.run_name, message));
        }

        let total_steps = self.steps.len().max(1);

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            ctx.logger.phase(step.description());

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.report_progress(step_name, percent, &format!("Starting {}", step_name));

            ctx.logger.debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx, state) {
                return Err(self.fail_run(ctx, state, step.as_ref(), e));
            }

            ctx.logger.debug(&format!("Executing '{}'", step_name));
            if let Err(e) = step.execute(ctx, state).await {
                return Err(self.fail_run(ctx, state, step.as_ref(), e));
            }

            ctx.logger
                .debug(&format!("Validating output for '{}'", step_name));
            if let Err(e) = step.validate_output(ctx, state) {
                return Err(self.fail_run(ctx, state, step.as_ref(), e));
            }

            ctx.logger.success(&format!("{} completed", step_name));
            result.steps_completed.push(step_name.to_string());
        }

        ctx.report_progress("Complete", 100, "Alignment finished");
        ctx.logger.success("Alignment completed successfully");

        Ok(result)
    }

    /// Move the run to `Failed`, dump the log tail and build the terminal error.
    fn fail_run(
        &self,
        ctx: &Context,
        state: &mut RunState,
        step: &dyn PipelineStep,
        error: StepError,
    ) -> AlignmentError {
        let kind = step.failure_kind();
        let from = state.phase();
        ctx.logger
            .error(&format!("{} failed [{}]: {}", step.name(), kind, error));

        match state.fail() {
            Ok(()) => ctx.logger.transition(from.name(), RunPhase::Failed.name()),
            Err(e) => ctx.logger.debug(&format!("Phase left unchanged: {}", e)),
        }
        ctx.logger.show_tail(&ctx.run_name);
        ctx.logger.flush();

        AlignmentError::from_step(kind, &ctx.run_name, error)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    /// Steps that completed, in run order.
    pub steps_completed: Vec<String>,
}
