//! Run state machine.
//!
//! ```text
//! Idle → ScriptPending → ScriptReady → SynthPending → SynthReady → Resampling → Done
//!            └──────────────┴─────────────┴──────────────┴────────────┴──→ Failed
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::TransitionError;

/// Phase of one alignment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    /// Media sampled, waiting on script extraction.
    ScriptPending,
    ScriptReady,
    /// Waiting on speech synthesis.
    SynthPending,
    SynthReady,
    Resampling,
    Done,
    Failed,
}

impl RunPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::ScriptPending => "script_pending",
            RunPhase::ScriptReady => "script_ready",
            RunPhase::SynthPending => "synth_pending",
            RunPhase::SynthReady => "synth_ready",
            RunPhase::Resampling => "resampling",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        }
    }

    /// Done and Failed accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }

    /// The phase a successful run moves to next.
    pub fn successor(&self) -> Option<RunPhase> {
        match self {
            RunPhase::Idle => Some(RunPhase::ScriptPending),
            RunPhase::ScriptPending => Some(RunPhase::ScriptReady),
            RunPhase::ScriptReady => Some(RunPhase::SynthPending),
            RunPhase::SynthPending => Some(RunPhase::SynthReady),
            RunPhase::SynthReady => Some(RunPhase::Resampling),
            RunPhase::Resampling => Some(RunPhase::Done),
            RunPhase::Done | RunPhase::Failed => None,
        }
    }

    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        match next {
            RunPhase::Failed => !matches!(self, RunPhase::Idle) && !self.is_terminal(),
            _ => self.successor() == Some(next),
        }
    }

    /// Checked transition.
    pub fn transition(self, next: RunPhase) -> Result<RunPhase, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
