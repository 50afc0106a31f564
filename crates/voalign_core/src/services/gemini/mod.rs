//! Gemini REST client for script extraction and speech synthesis.
//!
//! Both calls go through `models/{model}:generateContent`. Script
//! extraction asks for JSON constrained by a response schema; synthesis
//! asks for the `AUDIO` modality with a prebuilt voice.

mod api;

use std::fmt::Write;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, trace, warn};

use self::api::{
    script_schema, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Part, PrebuiltVoiceConfig, ScriptPayload, SpeechConfig, VoiceConfig,
};
use super::{
    ScriptExtractor, ScriptRequest, ServiceError, ServiceResult, SpeechPayload, SpeechSynthesizer,
};
use crate::audio::encode_wav;
use crate::config::SynthesisSettings;
use crate::models::ScriptResult;
use crate::voice::VoiceIdentity;

/// Default Gemini REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Multimodal model used for script extraction.
    pub script_model: String,
    /// Speech generation model.
    pub speech_model: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            script_model: "gemini-2.5-flash".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
        }
    }

    /// Configuration from the `[synthesis]` settings section.
    pub fn from_settings(api_key: impl Into<String>, settings: &SynthesisSettings) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: settings.base_url.clone(),
            script_model: settings.script_model.clone(),
            speech_model: settings.speech_model.clone(),
        }
    }
}

/// Gemini-backed [`ScriptExtractor`] and [`SpeechSynthesizer`].
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> ServiceResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| ServiceError::transport("gemini", format!("invalid API key: {}", e)))?;
        headers.insert("x-goog-api-key", key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ServiceError::transport("gemini", e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    #[instrument(level = "debug", skip(self, request))]
    async fn post<S, T>(&self, model: &str, request: &S) -> ServiceResult<T>
    where
        S: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(model))
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::transport(model, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::transport(model, e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::status(model, status.as_u16(), text));
        }
        trace!(bytes = text.len(), "response received");

        serde_json::from_str(&text).map_err(|e| ServiceError::malformed(model, e.to_string()))
    }
}

/// Instruction text for script extraction.
fn script_prompt(request: &ScriptRequest<'_>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are given {} frames sampled evenly from a {:.3} second video{}.",
        request.frames.len(),
        request.total_duration,
        if request.audio.is_some() {
            " and its original audio track"
        } else {
            " (no audio available; infer speech timing from the visuals)"
        }
    );
    let _ = writeln!(
        prompt,
        "Write a voice-over script in {} that follows the original speech timing.",
        request.target_language
    );
    prompt.push_str(
        "Split it into segments with start_time and end_time in seconds (3 decimals), \
         a short visual_cue, an emotion, the words to emphasise and the translated narration. \
         Segments must lie within the video duration and appear in chronological order. \
         Also describe the overall tone and a performance profile (pacing, energy, delivery notes).\n",
    );
    for frame in request.frames {
        let _ = writeln!(prompt, "Frame at {:.3}s follows.", frame.time_secs());
    }
    prompt
}

#[async_trait]
impl ScriptExtractor for GeminiClient {
    fn name(&self) -> &str {
        &self.config.script_model
    }

    async fn extract_script(&self, request: ScriptRequest<'_>) -> ServiceResult<ScriptResult> {
        let model = self.config.script_model.as_str();

        let mut parts = vec![Part::text(script_prompt(&request))];
        for frame in request.frames {
            parts.push(Part::inline("image/jpeg", BASE64.encode(&frame.jpeg_bytes)));
        }
        if let Some(audio) = request.audio {
            let wav = encode_wav(audio.samples(), audio.sample_rate());
            parts.push(Part::inline("audio/wav", BASE64.encode(wav)));
        }

        let api_request = GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(script_schema()),
                ..Default::default()
            },
        };

        debug!(
            frames = request.frames.len(),
            has_audio = request.audio.is_some(),
            language = request.target_language,
            "requesting script"
        );
        let response: GenerateContentResponse = self.post(model, &api_request).await?;

        let text = response
            .text()
            .ok_or_else(|| ServiceError::empty(model, "script text"))?;
        let payload: ScriptPayload = serde_json::from_str(&text)
            .map_err(|e| ServiceError::malformed(model, format!("script JSON: {}", e)))?;

        Ok(payload.into())
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    fn name(&self) -> &str {
        &self.config.speech_model
    }

    async fn synthesize(
        &self,
        instructions: &str,
        voice: &VoiceIdentity,
    ) -> ServiceResult<Option<SpeechPayload>> {
        let model = self.config.speech_model.as_str();

        let api_request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(instructions)])],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.voice_id.to_string(),
                        },
                    },
                }),
                ..Default::default()
            },
        };

        debug!(voice = voice.voice_id, chars = instructions.len(), "requesting speech");
        let response: GenerateContentResponse = self.post(model, &api_request).await?;

        match response.audio() {
            Some(audio) => Ok(Some(SpeechPayload {
                data_base64: audio.data.clone(),
                mime_type: Some(audio.mime_type.clone()),
            })),
            None => {
                warn!(
                    finish_reason = response.finish_reason().unwrap_or("unknown"),
                    "speech response carried no audio"
                );
                Ok(None)
            }
        }
    }
}
