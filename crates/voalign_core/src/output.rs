//! Writing finished narrations to disk.
//!
//! Artifacts are named `<video stem>_<language>_<seconds>s.wav` with the
//! duration printed to the millisecond, e.g. `clip_fr_12.345s.wav`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::audio::{encode_wav, AudioArtifact, PcmBuffer};
use crate::logging::sanitize_filename;
use crate::orchestrator::AudioSink;

/// File name for an artifact.
pub fn artifact_file_name(video_stem: &str, language: &str, duration_secs: f64) -> String {
    format!(
        "{}_{}_{:.3}s.wav",
        sanitize_filename(video_stem),
        language_tag(language),
        duration_secs
    )
}

/// Lowercase, filename-safe form of a language name or code.
pub fn language_tag(language: &str) -> String {
    let tag: String = language
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if tag.is_empty() {
        "und".to_string()
    } else {
        tag
    }
}

/// Write `bytes` to `path` atomically (temp file, then rename).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("wav.tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

/// Write an artifact into `output_dir` and return its path.
pub fn write_artifact(
    output_dir: &Path,
    video_stem: &str,
    language: &str,
    artifact: &AudioArtifact,
) -> io::Result<PathBuf> {
    let name = artifact_file_name(video_stem, language, artifact.actual_duration_seconds());
    let path = output_dir.join(name);
    write_atomic(&path, artifact.container_bytes())?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}

/// [`AudioSink`] that "plays" by writing a WAV file.
///
/// Each `play` replaces the file contents. `release` forgets the path so
/// a released sink cannot be written again.
pub struct WavFileSink {
    path: Option<PathBuf>,
    written: usize,
}

impl WavFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            written: 0,
        }
    }

    /// Number of buffers written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn is_released(&self) -> bool {
        self.path.is_none()
    }
}

impl AudioSink for WavFileSink {
    fn play(&mut self, pcm: &PcmBuffer) -> io::Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "sink already released"))?;
        write_atomic(path, &encode_wav(pcm.samples(), pcm.sample_rate()))?;
        self.written += 1;
        tracing::info!("Preview written to {}", path.display());
        Ok(())
    }

    fn release(&mut self) {
        self.path = None;
    }
}
