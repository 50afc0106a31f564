//! Alignment orchestrator.
//!
//! Drives one run through its state machine: sample the video, extract a
//! timed script, synthesize against the timing directive, force the
//! narration to the exact target length and encode it. A run either
//! produces a complete [`AudioArtifact`] or fails with one
//! [`AlignmentError`]; nothing partial is ever returned.
//!
//! # Architecture
//!
//! ```text
//! Pipeline                       phase after step
//!     ├── Step: Media            ScriptPending
//!     ├── Step: Script           ScriptReady
//!     ├── Step: Synthesis        SynthReady
//!     ├── Step: Resample         Resampling
//!     └── Step: Encode           Done
//! ```
//!
//! The [`preview`] path is independent of the pipeline and shares no state
//! with it.
//!
//! # Example
//!
//! ```ignore
//! use voalign_core::orchestrator::{align, Collaborators, Context};
//!
//! let ctx = Context::new(request, settings, "clip_fr", collaborators, logger);
//! let artifact = align(&ctx).await?;
//! println!("{:.3}s", artifact.actual_duration_seconds());
//! ```

mod errors;
mod pipeline;
pub mod preview;
mod state;
mod step;
pub mod steps;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use errors::{
    AlignmentError, AlignmentResult, FailureKind, StepError, StepResult, TransitionError,
};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use preview::{preview_segment, AudioSink, PlaybackScope};
pub use state::RunPhase;
pub use step::PipelineStep;
pub use steps::{EncodeStep, MediaStep, ResampleStep, ScriptStep, SynthesizeStep};
pub use types::{
    Collaborators, Context, MediaOutput, ProgressCallback, RunState, SynthesisOutput,
};

use crate::audio::AudioArtifact;

/// Create a standard pipeline with all steps in the correct order.
///
/// 1. Media - sample frames and the optional audio extract
/// 2. Script - timed, translated script
/// 3. Synthesis - speech against the timing directive
/// 4. Resample - force the exact target length
/// 5. Encode - WAV container
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(MediaStep::new())
        .with_step(ScriptStep::new())
        .with_step(SynthesizeStep::new())
        .with_step(ResampleStep::new())
        .with_step(EncodeStep::new())
}

/// Run a full alignment from a fresh state.
pub async fn align(ctx: &Context) -> AlignmentResult<AudioArtifact> {
    let mut state = RunState::new(&ctx.run_name);
    create_standard_pipeline().run(ctx, &mut state).await?;

    state.take_artifact().ok_or_else(|| {
        AlignmentError::from_step(
            FailureKind::SynthesisFailed,
            &ctx.run_name,
            StepError::invalid_output("run finished without an artifact"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{target_sample_count, SYNTHESIS_SAMPLE_RATE, WAV_HEADER_LEN};
    use crate::logging::init_test_tracing;
    use crate::models::ScriptResult;
    use crate::voice::{Gender, Persona};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use super::testing::{context_with, request, two_segment_script, FakeMedia, FakeScripts, FakeSpeech};

    fn long_speech() -> FakeSpeech {
        // ~20.8s of synthesized speech at 24 kHz
        let samples: Vec<i16> = (0..500_000).map(|i| ((i % 400) as i16 - 200) * 50).collect();
        FakeSpeech::with_samples(&samples, Some("audio/L16;codec=pcm;rate=24000"))
    }

    #[tokio::test]
    async fn full_run_converges_on_target_duration() {
        init_test_tracing();
        let scripts = Arc::new(FakeScripts::returning(two_segment_script()));
        let speech = Arc::new(long_speech());
        let ctx = context_with(
            request(Some(12.345)),
            FakeMedia::with_audio(12.5),
            scripts.clone(),
            speech.clone(),
        );

        let artifact = align(&ctx).await.unwrap();

        assert_eq!(artifact.pcm().len(), 296_280);
        assert_eq!(artifact.pcm().sample_rate(), SYNTHESIS_SAMPLE_RATE);
        assert_eq!(artifact.actual_duration_seconds(), 12.345);
        assert_eq!(artifact.container_bytes().len(), WAV_HEADER_LEN + 2 * 296_280);
        assert_eq!(scripts.calls(), 1);
        assert_eq!(speech.calls(), 1);

        let instructions = speech.last_instructions().unwrap();
        assert!(instructions.contains("[0.500–4.000]: \"Au commencement, la vallée dormait.\""));
        assert!(instructions.contains("exactly 12.345 seconds"));
        assert!(instructions.contains("Pacing: measured."));
        assert!(instructions.contains("stress: rivière"));
    }

    #[tokio::test]
    async fn transitions_are_logged_in_order() {
        let ctx = context_with(
            request(Some(2.0)),
            FakeMedia::with_audio(2.0),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(FakeSpeech::with_samples(&[1, 2, 3, 4], None)),
        );
        align(&ctx).await.unwrap();

        let transitions: Vec<String> = ctx
            .logger
            .get_tail()
            .into_iter()
            .filter(|l| l.starts_with("[State]"))
            .collect();
        assert_eq!(
            transitions,
            vec![
                "[State] idle -> script_pending",
                "[State] script_pending -> script_ready",
                "[State] script_ready -> synth_pending",
                "[State] synth_pending -> synth_ready",
                "[State] synth_ready -> resampling",
                "[State] resampling -> done",
            ]
        );
    }

    #[tokio::test]
    async fn empty_script_fails_before_synthesis() {
        let empty = ScriptResult {
            segments: Vec::new(),
            ..two_segment_script()
        };
        let speech = Arc::new(long_speech());
        let ctx = context_with(
            request(Some(12.345)),
            FakeMedia::with_audio(12.5),
            Arc::new(FakeScripts::returning(empty)),
            speech.clone(),
        );

        let err = align(&ctx).await.unwrap_err();

        assert_eq!(err.kind, FailureKind::ScriptExtractionFailed);
        assert_eq!(err.run, "clip_fr");
        assert_eq!(speech.calls(), 0);
    }

    #[tokio::test]
    async fn unparsable_script_fails_run() {
        let speech = Arc::new(long_speech());
        let ctx = context_with(
            request(None),
            FakeMedia::with_audio(12.5),
            Arc::new(FakeScripts::failing()),
            speech.clone(),
        );

        let err = align(&ctx).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::ScriptExtractionFailed);
        assert!(err.message.contains("unparsable JSON"));
        assert_eq!(speech.calls(), 0);
    }

    #[tokio::test]
    async fn missing_audio_still_extracts_script() {
        let scripts = Arc::new(FakeScripts::returning(two_segment_script()));
        let ctx = context_with(
            request(Some(12.345)),
            FakeMedia::without_audio(12.5),
            scripts.clone(),
            Arc::new(long_speech()),
        );

        let artifact = align(&ctx).await.unwrap();

        assert_eq!(scripts.calls(), 1);
        assert_eq!(scripts.saw_audio(), Some(false));
        assert_eq!(artifact.pcm().len(), 296_280);
        assert!(ctx
            .logger
            .get_tail()
            .iter()
            .any(|l| l.contains("DecodeFailed")));
    }

    #[tokio::test]
    async fn missing_speech_payload_fails_run() {
        let ctx = context_with(
            request(Some(12.345)),
            FakeMedia::with_audio(12.5),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(FakeSpeech::silent()),
        );

        let err = align(&ctx).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::SynthesisFailed);
        assert!(err.message.contains("no audio payload"));
    }

    #[tokio::test]
    async fn failed_run_leaves_no_artifact() {
        let ctx = context_with(
            request(Some(12.345)),
            FakeMedia::with_audio(12.5),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(FakeSpeech::with_samples(&[], None)),
        );

        let mut state = RunState::new("clip_fr");
        let err = create_standard_pipeline()
            .run(&ctx, &mut state)
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::SynthesisFailed);
        assert_eq!(state.phase(), RunPhase::Failed);
        assert!(state.artifact().is_none());
        assert!(state.take_artifact().is_none());
    }

    #[tokio::test]
    async fn media_failure_fails_run() {
        let scripts = Arc::new(FakeScripts::returning(two_segment_script()));
        let ctx = context_with(
            request(Some(1.0)),
            FakeMedia::failing(),
            scripts.clone(),
            Arc::new(long_speech()),
        );

        let err = align(&ctx).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::MediaExtractionFailed);
        assert_eq!(scripts.calls(), 0);
    }

    #[tokio::test]
    async fn duration_defaults_to_video_length() {
        let ctx = context_with(
            request(None),
            FakeMedia::with_audio(12.5),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(long_speech()),
        );

        let artifact = align(&ctx).await.unwrap();
        assert_eq!(
            artifact.pcm().len(),
            target_sample_count(12.5, SYNTHESIS_SAMPLE_RATE)
        );
    }

    #[tokio::test]
    async fn declared_rate_drives_target_length() {
        let samples = vec![0i16; 8_000];
        let ctx = context_with(
            request(Some(2.0)),
            FakeMedia::with_audio(2.0),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(FakeSpeech::with_samples(&samples, Some("audio/L16;rate=16000"))),
        );

        let artifact = align(&ctx).await.unwrap();
        assert_eq!(artifact.pcm().sample_rate(), SYNTHESIS_SAMPLE_RATE);
        assert_eq!(artifact.pcm().len(), 48_000);
        assert_eq!(artifact.container_bytes().len(), WAV_HEADER_LEN + 2 * 48_000);
    }

    #[tokio::test]
    async fn oversized_duration_is_rejected_before_extraction() {
        let scripts = Arc::new(FakeScripts::returning(two_segment_script()));
        let speech = Arc::new(long_speech());
        let ctx = context_with(
            request(Some(1e15)),
            FakeMedia::with_audio(12.5),
            scripts.clone(),
            speech.clone(),
        );

        let err = align(&ctx).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidRequest);
        assert!(err.message.contains("does not fit a WAV file"));
        assert_eq!(scripts.calls(), 0);
        assert_eq!(speech.calls(), 0);
    }

    #[tokio::test]
    async fn oversized_video_fallback_fails_without_allocating() {
        let ctx = context_with(
            request(None),
            FakeMedia::with_audio(1e15),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(long_speech()),
        );

        let mut state = RunState::new("clip_fr");
        let err = create_standard_pipeline()
            .run(&ctx, &mut state)
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::SynthesisFailed);
        assert!(err.message.contains("does not fit a WAV file"));
        assert!(state.aligned.is_none());
        assert_eq!(state.phase(), RunPhase::Failed);
    }

    #[tokio::test]
    async fn inconsistent_persona_falls_back() {
        let speech = Arc::new(FakeSpeech::with_samples(&[1, 2], None));
        let mut req = request(Some(1.0));
        req.target.gender = Gender::Woman;
        req.target.persona = Persona::Authoritative;
        let ctx = context_with(
            req,
            FakeMedia::with_audio(1.0),
            Arc::new(FakeScripts::returning(two_segment_script())),
            speech.clone(),
        );

        align(&ctx).await.unwrap();
        let voice = speech.last_voice().unwrap();
        assert_eq!(voice.gender, Gender::Woman);
        assert_eq!(voice.persona, Gender::Woman.default_persona());
    }

    #[tokio::test]
    async fn progress_reaches_completion() {
        let last = Arc::new(AtomicU32::new(0));
        let seen = last.clone();
        let ctx = context_with(
            request(Some(1.0)),
            FakeMedia::with_audio(1.0),
            Arc::new(FakeScripts::returning(two_segment_script())),
            Arc::new(FakeSpeech::with_samples(&[1, 2], None)),
        )
        .with_progress_callback(Box::new(move |_step, percent, _msg| {
            seen.store(percent, Ordering::SeqCst);
        }));

        align(&ctx).await.unwrap();
        assert_eq!(last.load(Ordering::SeqCst), 100);
    }
}
