//! FFmpeg subprocess-based media extraction.
//!
//! Uses `ffprobe` for the duration, one `ffmpeg` seek per still frame, and a
//! single `ffmpeg` pass for the mono 16-bit audio extract.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageFormat;

use super::{ExtractionError, ExtractionResult, MediaExtractor};
use crate::audio::{PcmBuffer, EXTRACT_SAMPLE_RATE};
use crate::config::ExtractionSettings;
use crate::models::{ExtractedMedia, VideoFrame};

/// FFmpeg-backed [`MediaExtractor`].
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    frame_count: u32,
    max_frame_width: u32,
    jpeg_quality: u8,
    audio_sample_rate: u32,
}

impl FfmpegExtractor {
    pub fn new(settings: &ExtractionSettings) -> Self {
        Self {
            frame_count: settings.frame_count.max(1),
            max_frame_width: settings.max_frame_width.max(16),
            jpeg_quality: settings.jpeg_quality.clamp(1, 100),
            audio_sample_rate: EXTRACT_SAMPLE_RATE,
        }
    }

    /// Check if FFmpeg is available.
    pub fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Get the duration of a media file using FFprobe.
    pub fn read_duration(&self, input_path: &Path) -> ExtractionResult<f64> {
        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(input_path)
            .output()
            .map_err(|e| ExtractionError::FfmpegError(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ExtractionError::MetadataFailed {
                path: input_path.display().to_string(),
                message: last_stderr_line(&output.stderr),
            });
        }

        let duration_str = String::from_utf8_lossy(&output.stdout);
        let duration = duration_str
            .trim()
            .parse::<f64>()
            .map_err(|e| ExtractionError::MetadataFailed {
                path: input_path.display().to_string(),
                message: format!("unparsable duration '{}': {}", duration_str.trim(), e),
            })?;

        if !duration.is_finite() || duration <= 0.0 {
            return Err(ExtractionError::MetadataFailed {
                path: input_path.display().to_string(),
                message: format!("non-positive duration {}", duration),
            });
        }

        Ok(duration)
    }

    /// Extract one frame as a downscaled JPEG.
    pub fn extract_frame(&self, input_path: &Path, time_ms: u64) -> ExtractionResult<Vec<u8>> {
        let seek = format!("{:.3}", time_ms as f64 / 1000.0);

        tracing::trace!("[FFmpeg] Extracting frame at {}s", seek);

        let output = Command::new("ffmpeg")
            .arg("-v")
            .arg("error")
            .arg("-ss")
            .arg(&seek)
            .arg("-i")
            .arg(input_path)
            .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
            .output()
            .map_err(|e| ExtractionError::FrameFailed {
                time_ms,
                message: format!("FFmpeg execution failed: {}", e),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::FrameFailed {
                time_ms,
                message: format!("FFmpeg failed: {}", last_stderr_line(&output.stderr)),
            });
        }

        if output.stdout.is_empty() {
            return Err(ExtractionError::FrameFailed {
                time_ms,
                message: "FFmpeg produced no output".to_string(),
            });
        }

        self.reencode_frame(&output.stdout)
            .map_err(|message| ExtractionError::FrameFailed { time_ms, message })
    }

    /// Decode PNG, shrink to the width limit, encode JPEG.
    fn reencode_frame(&self, png: &[u8]) -> Result<Vec<u8>, String> {
        let img = image::load(Cursor::new(png), ImageFormat::Png)
            .map_err(|e| format!("Failed to decode PNG: {}", e))?;

        let img = if img.width() > self.max_frame_width {
            img.resize(self.max_frame_width, u32::MAX, FilterType::Triangle)
        } else {
            img
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode_image(&img.to_rgb8())
            .map_err(|e| format!("Failed to encode JPEG: {}", e))?;
        Ok(jpeg)
    }

    /// Extract the audio as mono 16-bit PCM.
    ///
    /// Every failure maps to [`ExtractionError::DecodeFailed`].
    pub fn extract_audio(&self, input_path: &Path) -> ExtractionResult<PcmBuffer> {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-v")
            .arg("error")
            .arg("-i")
            .arg(input_path)
            .arg("-vn") // No video
            .arg("-ac")
            .arg("1") // Mono
            .arg("-ar")
            .arg(self.audio_sample_rate.to_string())
            .arg("-f")
            .arg("s16le")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("pipe:1");

        cmd.stderr(Stdio::null()).stdout(Stdio::piped());

        tracing::debug!("Running FFmpeg: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| ExtractionError::DecodeFailed(format!("Failed to spawn FFmpeg: {}", e)))?;

        let mut stdout = child.stdout.take().ok_or_else(|| {
            ExtractionError::DecodeFailed("Failed to capture FFmpeg stdout".to_string())
        })?;

        let mut buffer = Vec::new();
        stdout.read_to_end(&mut buffer).map_err(|e| {
            ExtractionError::DecodeFailed(format!("Failed to read FFmpeg output: {}", e))
        })?;

        let status = child
            .wait()
            .map_err(|e| ExtractionError::DecodeFailed(format!("FFmpeg process error: {}", e)))?;

        if !status.success() {
            return Err(ExtractionError::DecodeFailed(format!(
                "FFmpeg exited with code: {:?}",
                status.code()
            )));
        }

        let pcm = PcmBuffer::from_le_bytes(&buffer, self.audio_sample_rate);
        if pcm.is_empty() {
            return Err(ExtractionError::DecodeFailed(
                "No audio samples extracted".to_string(),
            ));
        }

        tracing::debug!(
            "Extracted {} samples ({:.2}s) from {}",
            pcm.len(),
            pcm.duration_secs(),
            input_path.display()
        );

        Ok(pcm)
    }

    /// Blocking body of [`MediaExtractor::extract`].
    fn extract_blocking(&self, video: &Path) -> ExtractionResult<ExtractedMedia> {
        if !video.exists() {
            return Err(ExtractionError::SourceNotFound(video.display().to_string()));
        }

        let duration_secs = self.read_duration(video)?;

        let frames = frame_times_ms(duration_secs, self.frame_count)
            .into_iter()
            .map(|time_ms| {
                self.extract_frame(video, time_ms)
                    .map(|jpeg_bytes| VideoFrame { time_ms, jpeg_bytes })
            })
            .collect::<ExtractionResult<Vec<_>>>()?;

        let audio = match self.extract_audio(video) {
            Ok(pcm) => Some(pcm),
            Err(e) => {
                tracing::warn!("Continuing without audio context: {}", e);
                None
            }
        };

        Ok(ExtractedMedia {
            frames,
            audio,
            duration_secs,
        })
    }
}

#[async_trait]
impl MediaExtractor for FfmpegExtractor {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn extract(&self, video: &Path) -> ExtractionResult<ExtractedMedia> {
        let extractor = self.clone();
        let video: PathBuf = video.to_path_buf();

        tokio::task::spawn_blocking(move || extractor.extract_blocking(&video))
            .await
            .map_err(|e| ExtractionError::FfmpegError(format!("Extraction task failed: {}", e)))?
    }
}

/// Evenly spaced frame positions: the midpoint of each of `count` equal
/// slices of the video.
pub fn frame_times_ms(duration_secs: f64, count: u32) -> Vec<u64> {
    if count == 0 || !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Vec::new();
    }
    let slice = duration_secs / count as f64;
    (0..count)
        .map(|i| ((i as f64 + 0.5) * slice * 1000.0).floor() as u64)
        .collect()
}

fn last_stderr_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .last()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn extractor() -> FfmpegExtractor {
        FfmpegExtractor::new(&ExtractionSettings::default())
    }

    #[test]
    fn frame_times_are_evenly_spaced() {
        assert_eq!(frame_times_ms(8.0, 4), vec![1000, 3000, 5000, 7000]);
        assert_eq!(frame_times_ms(1.0, 1), vec![500]);
        assert!(frame_times_ms(0.0, 4).is_empty());
        assert!(frame_times_ms(10.0, 0).is_empty());
    }

    #[test]
    fn frame_times_stay_inside_video() {
        let times = frame_times_ms(12.345, 8);
        assert_eq!(times.len(), 8);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert!(*times.last().unwrap() < 12_345);
    }

    #[test]
    fn reencode_shrinks_wide_frames() {
        let wide = RgbImage::from_pixel(1920, 1080, Rgb([200, 10, 10]));
        let mut png = Vec::new();
        wide.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let jpeg = extractor().reencode_frame(&png).unwrap();
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!(decoded.width(), ExtractionSettings::default().max_frame_width);
        assert!(decoded.height() < 1080);
    }

    #[test]
    fn reencode_rejects_garbage() {
        assert!(extractor().reencode_frame(b"not a png").is_err());
    }

    #[tokio::test]
    async fn extract_rejects_missing_file() {
        let result = extractor().extract(Path::new("/nonexistent/video.mp4")).await;
        assert!(matches!(result, Err(ExtractionError::SourceNotFound(_))));
    }

    #[test]
    fn test_is_available() {
        // Just verify it doesn't panic
        let _available = FfmpegExtractor::is_available();
    }
}
