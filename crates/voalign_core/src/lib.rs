//! VoiceOver Align Core - timing-anchored narration synthesis
//!
//! Turns a source video into a translated voice-over whose total length
//! matches a requested duration to the sample. This crate contains all
//! business logic with zero UI dependencies; it can be driven by the CLI
//! or embedded elsewhere.

pub mod audio;
pub mod config;
pub mod directive;
pub mod extraction;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod services;
pub mod voice;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
