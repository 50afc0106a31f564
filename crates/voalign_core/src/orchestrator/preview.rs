//! Single-segment preview synthesis.
//!
//! Auditions one segment's narration without running a full alignment:
//! synthesis and decode only, no resampling. Preview is best-effort, so
//! every failure is logged and turned into `None`.
//!
//! Playback goes through a [`PlaybackScope`], a handle over an
//! [`AudioSink`] that releases the sink when dropped.

use std::io;

use super::errors::{FailureKind, StepError, StepResult};
use crate::audio::PcmBuffer;
use crate::config::SynthesisSettings;
use crate::directive::preview_directive;
use crate::logging::RunLogger;
use crate::models::TimedSegment;
use crate::services::SpeechSynthesizer;
use crate::voice::VoiceIdentity;

/// Synthesize one segment for auditioning.
///
/// Returns `None` on any failure; the reason is logged as
/// `PreviewSynthesisFailed`.
pub async fn preview_segment(
    speech: &dyn SpeechSynthesizer,
    segment: &TimedSegment,
    detected_tone: &str,
    voice: VoiceIdentity,
    settings: &SynthesisSettings,
    logger: &RunLogger,
) -> Option<PcmBuffer> {
    match try_preview(speech, segment, detected_tone, voice, settings, logger).await {
        Ok(pcm) => {
            logger.success(&format!(
                "Preview of segment {} ready ({:.3}s)",
                segment.index,
                pcm.duration_secs()
            ));
            Some(pcm)
        }
        Err(e) => {
            logger.warn(&format!(
                "[{}] segment {}: {}",
                FailureKind::PreviewSynthesisFailed,
                segment.index,
                e
            ));
            None
        }
    }
}

async fn try_preview(
    speech: &dyn SpeechSynthesizer,
    segment: &TimedSegment,
    detected_tone: &str,
    voice: VoiceIdentity,
    settings: &SynthesisSettings,
    logger: &RunLogger,
) -> StepResult<PcmBuffer> {
    segment
        .check()
        .map_err(|e| StepError::invalid_input(e.to_string()))?;

    let instructions = preview_directive(segment, detected_tone)
        .with_tolerance_ms(settings.tolerance_ms)
        .render(&voice);

    logger.info(&format!(
        "Previewing segment {} with {} via {}",
        segment.index,
        voice.voice_id,
        speech.name()
    ));

    let payload = speech
        .synthesize(&instructions, &voice)
        .await
        .map_err(|e| StepError::service("Preview synthesis", e))?
        .filter(|p| !p.is_empty())
        .ok_or_else(|| StepError::no_result("Synthesizer returned no audio payload"))?;

    payload
        .decode_pcm(settings.sample_rate)
        .map_err(|e| StepError::service("Decoding preview audio", e))
}

/// Something that can play PCM.
pub trait AudioSink {
    /// Play or queue `pcm`.
    fn play(&mut self, pcm: &PcmBuffer) -> io::Result<()>;

    /// Release whatever the sink holds (device, file handle). Called once
    /// when the owning [`PlaybackScope`] ends.
    fn release(&mut self);
}

/// Scoped access to an [`AudioSink`].
///
/// The sink is released when the scope is dropped, on every path out of
/// the caller's block.
pub struct PlaybackScope<'a, S: AudioSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: AudioSink + ?Sized> PlaybackScope<'a, S> {
    pub fn acquire(sink: &'a mut S) -> Self {
        Self { sink }
    }

    pub fn play(&mut self, pcm: &PcmBuffer) -> io::Result<()> {
        self.sink.play(pcm)
    }
}

impl<S: AudioSink + ?Sized> Drop for PlaybackScope<'_, S> {
    fn drop(&mut self) {
        self.sink.release();
    }
}
