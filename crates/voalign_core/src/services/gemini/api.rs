use serde::{Deserialize, Serialize};

use crate::models::{PerformanceProfile, ScriptResult, TimedSegment};

/// Gemini inline data for images/audio
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub(crate) mime_type: String,
    pub(crate) data: String, // base64-encoded
}

/// One part of a content turn. Unknown part kinds (thought signatures,
/// function calls) deserialize with both fields empty.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) inline_data: Option<InlineData>,
}

impl Part {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub(crate) fn inline(mime_type: impl Into<String>, data: String) -> Self {
        Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

impl Content {
    pub(crate) fn user(parts: Vec<Part>) -> Self {
        Content {
            role: Some("user".to_string()),
            parts,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrebuiltVoiceConfig {
    pub(crate) voice_name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoiceConfig {
    pub(crate) prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SpeechConfig {
    pub(crate) voice_config: VoiceConfig,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) speech_config: Option<SpeechConfig>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
    pub(crate) generation_config: GenerationConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub(crate) content: Option<Content>,
    pub(crate) finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate's text parts.
    pub(crate) fn text(&self) -> Option<String> {
        let text: String = self
            .parts()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First audio part, if any.
    pub(crate) fn audio(&self) -> Option<&InlineData> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|data| data.mime_type.starts_with("audio/"))
    }

    pub(crate) fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }
}

/// Structured script as requested through the response schema.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ScriptPayload {
    pub(crate) tone: String,
    #[serde(default)]
    pub(crate) performance_profile: Option<ProfilePayload>,
    #[serde(default)]
    pub(crate) segments: Vec<SegmentPayload>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ProfilePayload {
    #[serde(default)]
    pub(crate) pacing: String,
    #[serde(default)]
    pub(crate) energy: String,
    #[serde(default)]
    pub(crate) delivery_notes: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SegmentPayload {
    #[serde(default)]
    pub(crate) index: Option<u32>,
    pub(crate) start_time: f64,
    pub(crate) end_time: f64,
    #[serde(default)]
    pub(crate) visual_cue: String,
    #[serde(default)]
    pub(crate) emotion: String,
    #[serde(default)]
    pub(crate) emphasis: Vec<String>,
    pub(crate) narration: String,
}

impl From<ScriptPayload> for ScriptResult {
    fn from(payload: ScriptPayload) -> Self {
        let segments = payload
            .segments
            .into_iter()
            .enumerate()
            .map(|(i, s)| TimedSegment {
                // Models occasionally omit or zero the index; position is authoritative then.
                index: s.index.filter(|n| *n > 0).unwrap_or(i as u32 + 1),
                start_time: round_ms(s.start_time),
                end_time: round_ms(s.end_time),
                narration_text: s.narration,
                emphasis_markers: s.emphasis,
                emotion_tag: s.emotion,
                visual_cue_text: s.visual_cue,
            })
            .collect();

        let performance_profile = payload
            .performance_profile
            .map(|p| PerformanceProfile {
                pacing: p.pacing,
                energy: p.energy,
                delivery_notes: p.delivery_notes,
            })
            .unwrap_or_default();

        ScriptResult {
            detected_tone: payload.tone,
            performance_profile,
            segments,
        }
    }
}

fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Response schema for script extraction.
pub(crate) fn script_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "tone": { "type": "STRING" },
            "performance_profile": {
                "type": "OBJECT",
                "properties": {
                    "pacing": { "type": "STRING" },
                    "energy": { "type": "STRING" },
                    "delivery_notes": { "type": "ARRAY", "items": { "type": "STRING" } }
                }
            },
            "segments": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "index": { "type": "INTEGER" },
                        "start_time": { "type": "NUMBER" },
                        "end_time": { "type": "NUMBER" },
                        "visual_cue": { "type": "STRING" },
                        "emotion": { "type": "STRING" },
                        "emphasis": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "narration": { "type": "STRING" }
                    },
                    "required": ["start_time", "end_time", "narration"]
                }
            }
        },
        "required": ["tone", "segments"]
    })
}
