//! PCM audio primitives.
//!
//! This module provides:
//! - `PcmBuffer`: an immutable mono 16-bit sample sequence with its rate
//! - `resample`: exact-length linear stretch/compress
//! - `wav`: canonical 44-byte-header WAV encoding
//! - `AudioArtifact`: the finished, exact-duration output of a run

pub mod resample;
pub mod wav;

pub use resample::resample;
pub use wav::{encode_wav, MAX_WAV_SAMPLES, WAV_HEADER_LEN};

/// Sample rate of audio returned by the speech synthesis service.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 24_000;

/// Sample rate of the audio extract sent along with video frames.
pub const EXTRACT_SAMPLE_RATE: u32 = 16_000;

/// Mono 16-bit PCM samples with an associated sample rate.
///
/// Immutable once constructed. Stages that change the length produce a
/// new buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Create a buffer from owned samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decode little-endian 16-bit frames.
    ///
    /// A trailing odd byte is ignored.
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`len / sample_rate`).
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Stretch or compress to exactly `target_len` samples, relabelled at
    /// `sample_rate`.
    pub fn resampled_to(&self, target_len: usize, sample_rate: u32) -> PcmBuffer {
        PcmBuffer::new(resample(&self.samples, target_len), sample_rate)
    }

    /// Raw little-endian bytes, as sent to the script extraction service.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Number of samples needed to cover `duration_secs` at `sample_rate`.
///
/// Rounds to the nearest sample; negative or non-finite durations yield 0.
pub fn target_sample_count(duration_secs: f64, sample_rate: u32) -> usize {
    let exact = duration_secs * sample_rate as f64;
    if !exact.is_finite() || exact <= 0.0 {
        return 0;
    }
    exact.round() as usize
}

/// Final audio of one alignment run.
///
/// Holds both the PCM and its WAV container so callers can play or export
/// without re-encoding.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pcm: PcmBuffer,
    container_bytes: Vec<u8>,
}

impl AudioArtifact {
    /// Wrap a buffer, encoding it as WAV.
    pub fn from_pcm(pcm: PcmBuffer) -> Self {
        let container_bytes = encode_wav(pcm.samples(), pcm.sample_rate());
        Self {
            pcm,
            container_bytes,
        }
    }

    pub fn pcm(&self) -> &PcmBuffer {
        &self.pcm
    }

    /// The complete WAV file contents.
    pub fn container_bytes(&self) -> &[u8] {
        &self.container_bytes
    }

    /// `sample_count / sample_rate`.
    pub fn actual_duration_seconds(&self) -> f64 {
        self.pcm.duration_secs()
    }
}
