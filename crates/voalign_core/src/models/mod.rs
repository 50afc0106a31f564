//! Data models for VoiceOver Align.
//!
//! This module contains the data structures passed between pipeline stages:
//! - Script structures (timed segments, tone and performance profile)
//! - Media structures (sampled frames, optional audio extract)
//! - Job structures (alignment requests and their target configuration)

mod jobs;
mod media;
mod script;

pub use jobs::{AlignmentRequest, TargetConfig};
pub use media::{ExtractedMedia, VideoFrame};
pub use script::{PerformanceProfile, ScriptResult, SegmentIssue, TimedSegment};
