//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for validation and execution.

use async_trait::async_trait;

use super::errors::{FailureKind, StepResult};
use super::types::{Context, RunState};

/// Trait for pipeline steps.
///
/// Each step in the pipeline implements this trait. The pipeline runner
/// calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work, awaiting at most one collaborator
/// 3. `validate_output` - Verify the step produced valid output
///
/// Any error fails the whole run with the step's `failure_kind`.
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Get the step name (for logging and error context).
    fn name(&self) -> &str;

    /// Kind reported when this step fails the run.
    fn failure_kind(&self) -> FailureKind;

    /// Validate inputs before execution.
    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Execute the step's main work.
    ///
    /// Should perform the step's processing, record results in `state` and
    /// advance the run phase.
    async fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<()>;

    /// Validate outputs after execution.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}
