//! In-memory collaborators for orchestrator tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;

use super::types::{Collaborators, Context};
use crate::audio::{PcmBuffer, EXTRACT_SAMPLE_RATE};
use crate::config::Settings;
use crate::extraction::{ExtractionError, ExtractionResult, MediaExtractor};
use crate::logging::{LogConfig, RunLogger};
use crate::models::{
    AlignmentRequest, ExtractedMedia, PerformanceProfile, ScriptResult, TargetConfig,
    TimedSegment, VideoFrame,
};
use crate::services::{
    ScriptExtractor, ScriptRequest, ServiceError, ServiceResult, SpeechPayload, SpeechSynthesizer,
};
use crate::voice::{Gender, Persona, VoiceIdentity};

pub(crate) struct FakeMedia {
    pub(crate) media: Option<ExtractedMedia>,
}

impl FakeMedia {
    pub(crate) fn with_audio(duration_secs: f64) -> Self {
        Self {
            media: Some(ExtractedMedia {
                frames: frames(4, duration_secs),
                audio: Some(PcmBuffer::new(vec![100; 1600], EXTRACT_SAMPLE_RATE)),
                duration_secs,
            }),
        }
    }

    pub(crate) fn without_audio(duration_secs: f64) -> Self {
        let mut fake = Self::with_audio(duration_secs);
        if let Some(media) = fake.media.as_mut() {
            media.audio = None;
        }
        fake
    }

    pub(crate) fn failing() -> Self {
        Self { media: None }
    }
}

fn frames(count: u64, duration_secs: f64) -> Vec<VideoFrame> {
    (0..count)
        .map(|i| VideoFrame {
            time_ms: (duration_secs * 1000.0 * i as f64 / count as f64) as u64,
            jpeg_bytes: vec![0xff, 0xd8, 0xff, 0xd9],
        })
        .collect()
}

#[async_trait]
impl MediaExtractor for FakeMedia {
    fn name(&self) -> &str {
        "fake-media"
    }

    async fn extract(&self, video: &Path) -> ExtractionResult<ExtractedMedia> {
        self.media
            .clone()
            .ok_or_else(|| ExtractionError::SourceNotFound(video.display().to_string()))
    }
}

pub(crate) struct FakeScripts {
    script: Option<ScriptResult>,
    calls: AtomicUsize,
    saw_audio: Mutex<Option<bool>>,
}

impl FakeScripts {
    pub(crate) fn returning(script: ScriptResult) -> Self {
        Self {
            script: Some(script),
            calls: AtomicUsize::new(0),
            saw_audio: Mutex::new(None),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            script: None,
            calls: AtomicUsize::new(0),
            saw_audio: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether the last request carried audio.
    pub(crate) fn saw_audio(&self) -> Option<bool> {
        *self.saw_audio.lock()
    }
}

#[async_trait]
impl ScriptExtractor for FakeScripts {
    fn name(&self) -> &str {
        "fake-script"
    }

    async fn extract_script(&self, request: ScriptRequest<'_>) -> ServiceResult<ScriptResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.saw_audio.lock() = Some(request.audio.is_some());
        self.script
            .clone()
            .ok_or_else(|| ServiceError::malformed("fake-script", "unparsable JSON"))
    }
}

pub(crate) struct FakeSpeech {
    payload: Option<SpeechPayload>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, VoiceIdentity)>>,
}

impl FakeSpeech {
    pub(crate) fn returning(payload: Option<SpeechPayload>) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub(crate) fn with_samples(samples: &[i16], mime_type: Option<&str>) -> Self {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::returning(Some(SpeechPayload {
            data_base64: BASE64.encode(bytes),
            mime_type: mime_type.map(str::to_string),
        }))
    }

    pub(crate) fn silent() -> Self {
        Self::returning(None)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_instructions(&self) -> Option<String> {
        self.last.lock().as_ref().map(|(text, _)| text.clone())
    }

    pub(crate) fn last_voice(&self) -> Option<VoiceIdentity> {
        self.last.lock().as_ref().map(|(_, voice)| *voice)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    fn name(&self) -> &str {
        "fake-speech"
    }

    async fn synthesize(
        &self,
        instructions: &str,
        voice: &VoiceIdentity,
    ) -> ServiceResult<Option<SpeechPayload>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock() = Some((instructions.to_string(), *voice));
        Ok(self.payload.clone())
    }
}

pub(crate) fn two_segment_script() -> ScriptResult {
    ScriptResult {
        detected_tone: "documentary".to_string(),
        performance_profile: PerformanceProfile {
            pacing: "measured".to_string(),
            energy: "calm".to_string(),
            delivery_notes: Vec::new(),
        },
        segments: vec![
            TimedSegment::new(1, 0.5, 4.0, "Au commencement, la vallée dormait."),
            TimedSegment::new(2, 5.25, 11.9, "Puis la rivière a tout changé.")
                .with_emphasis(["rivière"]),
        ],
    }
}

pub(crate) fn request(duration: Option<f64>) -> AlignmentRequest {
    let mut target = TargetConfig::new("French", Gender::Man, Persona::Narrator);
    target.total_duration = duration;
    AlignmentRequest::new("/videos/clip.mp4", target)
}

pub(crate) fn context_with(
    request: AlignmentRequest,
    media: FakeMedia,
    scripts: Arc<FakeScripts>,
    speech: Arc<FakeSpeech>,
) -> Context {
    let collaborators = Collaborators::new(Arc::new(media), scripts, speech);
    Context::new(
        request,
        Settings::default(),
        "clip_fr",
        collaborators,
        Arc::new(RunLogger::in_memory(
            "clip_fr",
            LogConfig {
                error_tail: 500,
                ..LogConfig::debug()
            },
            None,
        )),
    )
}

/// Context whose collaborators all succeed.
pub(crate) fn test_context() -> Context {
    context_with(
        request(Some(12.345)),
        FakeMedia::with_audio(12.5),
        Arc::new(FakeScripts::returning(two_segment_script())),
        Arc::new(FakeSpeech::with_samples(&[0; 16], None)),
    )
}
