//! Error types for the alignment pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Step → Collaborator → Detail

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::RunPhase;
use crate::extraction::ExtractionError;
use crate::services::ServiceError;

/// Kind tag carried by every terminal run failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Script extraction returned no usable segment sequence.
    ScriptExtractionFailed,
    /// Speech synthesis returned no usable audio.
    SynthesisFailed,
    /// Same as `SynthesisFailed`, during a single-segment preview.
    PreviewSynthesisFailed,
    /// The source video's audio could not be decoded.
    DecodeFailed,
    /// The source video could not be read or sampled.
    MediaExtractionFailed,
    /// The request itself is unusable.
    InvalidRequest,
}

impl FailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::ScriptExtractionFailed => "ScriptExtractionFailed",
            FailureKind::SynthesisFailed => "SynthesisFailed",
            FailureKind::PreviewSynthesisFailed => "PreviewSynthesisFailed",
            FailureKind::DecodeFailed => "DecodeFailed",
            FailureKind::MediaExtractionFailed => "MediaExtractionFailed",
            FailureKind::InvalidRequest => "InvalidRequest",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal error of an alignment run.
///
/// A run either yields a complete artifact or exactly one of these.
#[derive(Error, Debug)]
#[error("Run '{run}' failed [{kind}]: {message}")]
pub struct AlignmentError {
    pub kind: FailureKind,
    pub run: String,
    pub message: String,
    #[source]
    pub source: Option<StepError>,
}

impl AlignmentError {
    /// Create a failure from a step error.
    pub fn from_step(kind: FailureKind, run: impl Into<String>, source: StepError) -> Self {
        Self {
            kind,
            run: run.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a request validation failure.
    pub fn invalid_request(run: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidRequest,
            run: run.into(),
            message: message.into(),
            source: None,
        }
    }
}

/// A state change the run's state machine does not allow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Illegal transition {from} -> {to}")]
pub struct TransitionError {
    pub from: RunPhase,
    pub to: RunPhase,
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// Sampling the source video failed.
    #[error("Media extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// A collaborator call failed.
    #[error("{operation} failed: {source}")]
    Service {
        operation: String,
        #[source]
        source: ServiceError,
    },

    /// A collaborator answered without a usable result.
    #[error("{0}")]
    NoResult(String),

    /// The state machine rejected a transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl StepError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an invalid output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Create a collaborator failure with context.
    pub fn service(operation: impl Into<String>, source: ServiceError) -> Self {
        Self::Service {
            operation: operation.into(),
            source,
        }
    }

    /// Create an empty-result error.
    pub fn no_result(message: impl Into<String>) -> Self {
        Self::NoResult(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for whole runs.
pub type AlignmentResult<T> = Result<T, AlignmentError>;
