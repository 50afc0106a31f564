//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::audio::SYNTHESIS_SAMPLE_RATE;
use crate::directive::DEFAULT_TOLERANCE_MS;
use crate::services::gemini::DEFAULT_BASE_URL;
use crate::voice::{Gender, Persona};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Frame and audio sampling.
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// Generative service settings.
    #[serde(default)]
    pub synthesis: SynthesisSettings,

    /// Default narration target.
    #[serde(default)]
    pub voice: VoiceSettings,
}

/// Path configuration for output and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for finished narrations.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Last video aligned.
    #[serde(default)]
    pub last_video_path: String,
}

fn default_output_folder() -> String {
    "voiceover_output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
            last_video_path: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Use compact log format.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of error lines to show in tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Also write a daily-rolling application log into the logs folder.
    #[serde(default)]
    pub file_output: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            file_output: false,
        }
    }
}

/// Frame and audio sampling from the source video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Number of evenly spaced frames to sample.
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,

    /// Frames wider than this are scaled down.
    #[serde(default = "default_max_frame_width")]
    pub max_frame_width: u32,

    /// JPEG quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_frame_count() -> u32 {
    8
}

fn default_max_frame_width() -> u32 {
    640
}

fn default_jpeg_quality() -> u8 {
    80
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            frame_count: default_frame_count(),
            max_frame_width: default_max_frame_width(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Script extraction and speech synthesis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// REST base URL of the generative service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Multimodal model for script extraction.
    #[serde(default = "default_script_model")]
    pub script_model: String,

    /// Speech generation model.
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sample rate assumed for synthesized PCM when the payload does not
    /// declare one.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Per-segment start/end tolerance requested in the directive.
    #[serde(default = "default_tolerance_ms")]
    pub tolerance_ms: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_script_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_sample_rate() -> u32 {
    SYNTHESIS_SAMPLE_RATE
}

fn default_tolerance_ms() -> u32 {
    DEFAULT_TOLERANCE_MS
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            script_model: default_script_model(),
            speech_model: default_speech_model(),
            api_key_env: default_api_key_env(),
            sample_rate: default_sample_rate(),
            tolerance_ms: default_tolerance_ms(),
        }
    }
}

/// Narration target used when the command line does not override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Target language for the narration.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub gender: Gender,

    /// Requested persona; replaced by the gender default if inconsistent.
    #[serde(default = "default_persona")]
    pub persona: Persona,
}

fn default_language() -> String {
    "English".to_string()
}

fn default_persona() -> Persona {
    Gender::default().default_persona()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            gender: Gender::default(),
            persona: default_persona(),
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Extraction,
    Synthesis,
    Voice,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Extraction,
        ConfigSection::Synthesis,
        ConfigSection::Voice,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Extraction => "extraction",
            ConfigSection::Synthesis => "synthesis",
            ConfigSection::Voice => "voice",
        }
    }

    /// Comment written above the section in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output and log directories",
            ConfigSection::Logging => "Logging configuration",
            ConfigSection::Extraction => "Frame and audio sampling from the source video",
            ConfigSection::Synthesis => "Script extraction and speech synthesis service",
            ConfigSection::Voice => "Default narration target",
        }
    }
}
