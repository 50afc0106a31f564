//! `voalign` - command-line front end for VoiceOver Align.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use voalign_core::config::{ConfigManager, ConfigSection, Settings};
use voalign_core::extraction::FfmpegExtractor;
use voalign_core::logging::{init_tracing, LogCallback, LogConfig, LogLevel, RunLogger};
use voalign_core::models::{AlignmentRequest, TargetConfig, TimedSegment};
use voalign_core::orchestrator::{align, preview_segment, Collaborators, Context, PlaybackScope};
use voalign_core::output::{language_tag, write_artifact, WavFileSink};
use voalign_core::services::{GeminiClient, GeminiConfig};
use voalign_core::voice::{select_voice, Gender, Persona};

#[derive(Parser, Debug)]
#[command(author, version, about = "Timing-anchored voice-over generation", long_about = None)]
struct Args {
    /// Config file (created with defaults if missing)
    #[arg(long, global = true, default_value = ".config/voalign.toml")]
    config: PathBuf,

    /// Verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an exact-length narration for a video
    Align {
        /// Source video
        video: PathBuf,

        /// Output duration in seconds (defaults to the video's)
        #[arg(long)]
        duration: Option<f64>,

        /// Narration language (defaults to the configured one)
        #[arg(long)]
        language: Option<String>,

        /// Voice gender: man or woman
        #[arg(long)]
        gender: Option<Gender>,

        /// Voice persona: narrator, authoritative, professional or dynamic
        #[arg(long)]
        persona: Option<Persona>,

        /// Output folder (defaults to the configured one)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Synthesize one segment for auditioning
    Preview {
        /// Narration text
        text: String,

        /// Segment start in seconds
        #[arg(long)]
        start: f64,

        /// Segment end in seconds
        #[arg(long)]
        end: f64,

        /// Tone hint passed to the synthesizer
        #[arg(long, default_value = "")]
        tone: String,

        #[arg(long)]
        gender: Option<Gender>,

        #[arg(long)]
        persona: Option<Persona>,

        /// Where to write the preview WAV
        #[arg(long, default_value = "preview.wav")]
        out: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ConfigManager::new(&args.config);
    config
        .load_or_create()
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.ensure_dirs_exist()?;

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        config.settings().logging.level.parse().unwrap_or_default()
    };
    let logs_folder = config.logs_folder();
    let file_log_dir = config
        .settings()
        .logging
        .file_output
        .then_some(logs_folder.as_path());
    let _guard = init_tracing(level, file_log_dir);
    tracing::debug!("Using config {}", config.path().display());

    match args.command {
        Command::Align {
            video,
            duration,
            language,
            gender,
            persona,
            output_dir,
        } => {
            let settings = config.settings().clone();
            let target = target_from(&settings, language, gender, persona, duration);
            let request = AlignmentRequest::new(&video, target);

            let output_dir = output_dir.unwrap_or_else(|| config.output_folder());
            let path = run_align(request, settings, &logs_folder, &output_dir, args.verbose).await?;
            println!("{}", path.display());

            config.settings_mut().paths.last_video_path = video.display().to_string();
            config.update_section(ConfigSection::Paths)?;
        }
        Command::Preview {
            text,
            start,
            end,
            tone,
            gender,
            persona,
            out,
        } => {
            let settings = config.settings();
            let gender = gender.unwrap_or(settings.voice.gender);
            let persona = persona.unwrap_or(settings.voice.persona);
            let segment = TimedSegment::new(1, start, end, text);
            run_preview(settings, &segment, &tone, gender, persona, &out).await?;
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(config.settings())?);
        }
    }

    Ok(())
}

fn target_from(
    settings: &Settings,
    language: Option<String>,
    gender: Option<Gender>,
    persona: Option<Persona>,
    duration: Option<f64>,
) -> TargetConfig {
    let gender = gender.unwrap_or(settings.voice.gender);
    // A gender given alone picks that gender's default persona
    let persona = persona.unwrap_or_else(|| {
        if gender == settings.voice.gender {
            settings.voice.persona
        } else {
            gender.default_persona()
        }
    });
    let mut target = TargetConfig::new(
        language.unwrap_or_else(|| settings.voice.language.clone()),
        gender,
        persona,
    );
    target.total_duration = duration;
    target
}

fn gemini_client(settings: &Settings) -> Result<GeminiClient> {
    let var = &settings.synthesis.api_key_env;
    let api_key = match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail!("Set {} to your Gemini API key", var),
    };
    Ok(GeminiClient::new(GeminiConfig::from_settings(
        api_key,
        &settings.synthesis,
    ))?)
}

fn console_callback() -> LogCallback {
    Box::new(|line| println!("{}", line))
}

async fn run_align(
    request: AlignmentRequest,
    settings: Settings,
    logs_folder: &Path,
    output_dir: &Path,
    verbose: bool,
) -> Result<PathBuf> {
    if !FfmpegExtractor::is_available() {
        bail!("ffmpeg was not found on PATH");
    }
    let gemini = Arc::new(gemini_client(&settings)?);
    let collaborators = Collaborators::new(
        Arc::new(FfmpegExtractor::new(&settings.extraction)),
        gemini.clone(),
        gemini,
    );

    let stem = request.video_stem();
    let language = request.target.language.clone();
    let run_name = format!("{}_{}", stem, language_tag(&language));

    let log_config = if verbose {
        LogConfig::debug()
    } else {
        LogConfig::from(&settings.logging)
    };
    let logger = Arc::new(
        RunLogger::new(&run_name, logs_folder, log_config, Some(console_callback()))
            .with_context(|| format!("creating run log in {}", logs_folder.display()))?,
    );

    let ctx = Context::new(request, settings, &run_name, collaborators, logger.clone());
    let artifact = align(&ctx).await?;

    let path = write_artifact(output_dir, &stem, &language, &artifact)
        .with_context(|| format!("writing narration to {}", output_dir.display()))?;
    logger.success(&format!("Narration written to {}", path.display()));
    Ok(path)
}

async fn run_preview(
    settings: &Settings,
    segment: &TimedSegment,
    tone: &str,
    gender: Gender,
    persona: Persona,
    out: &Path,
) -> Result<()> {
    let gemini = gemini_client(settings)?;
    let voice = select_voice(gender, persona);
    let logger = RunLogger::in_memory(
        "preview",
        LogConfig::from(&settings.logging),
        Some(console_callback()),
    );

    let Some(pcm) =
        preview_segment(&gemini, segment, tone, voice, &settings.synthesis, &logger).await
    else {
        println!("No preview audio was produced.");
        return Ok(());
    };

    let mut sink = WavFileSink::new(out);
    let mut scope = PlaybackScope::acquire(&mut sink);
    scope.play(&pcm)?;
    Ok(())
}
