//! Canonical WAV container for mono 16-bit PCM.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! 0   "RIFF"  u32 riff_size = 36 + data_len  "WAVE"
//! 12  "fmt "  u32 16  u16 format=1  u16 channels=1
//!             u32 sample_rate  u32 byte_rate  u16 block_align=2  u16 bits=16
//! 36  "data"  u32 data_len = 2 * samples
//! 44  samples...
//! ```

/// Size of the canonical header in bytes.
pub const WAV_HEADER_LEN: usize = 44;

/// Most samples a canonical container can describe: the RIFF size field
/// (`36 + 2n`) must fit a `u32`.
pub const MAX_WAV_SAMPLES: usize = (u32::MAX as usize - (WAV_HEADER_LEN - 8)) / 2;

const PCM_FORMAT_TAG: u16 = 1;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

/// Encode mono 16-bit samples as a WAV file.
///
/// Never fails. Size fields saturate at `u32::MAX` for inputs longer than
/// [`MAX_WAV_SAMPLES`], and so does the byte rate for sample rates above
/// `u32::MAX / 2`.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let data_len = saturating_u32(samples.len() as u64 * BLOCK_ALIGN as u64);
    let riff_len = data_len.saturating_add((WAV_HEADER_LEN - 8) as u32);
    let byte_rate = saturating_u32(sample_rate as u64 * BLOCK_ALIGN as u64);

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());

    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn read_back(bytes: Vec<u8>) -> hound::Result<(Vec<i16>, hound::WavSpec)> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let samples = reader.samples::<i16>().collect::<hound::Result<Vec<_>>>()?;
        Ok((samples, spec))
    }

    #[test]
    fn header_sizes_follow_sample_count() {
        for n in [0usize, 1, 2, 1001] {
            let samples = vec![0x1234i16; n];
            let bytes = encode_wav(&samples, 24_000);

            assert_eq!(bytes.len(), WAV_HEADER_LEN + 2 * n);
            assert_eq!(read_u32(&bytes, 4) as usize, 36 + 2 * n);
            assert_eq!(read_u32(&bytes, 40) as usize, 2 * n);
        }
    }

    #[test]
    fn header_fields_describe_mono_16bit() {
        let bytes = encode_wav(&[1, 2, 3], 24_000);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(read_u32(&bytes, 16), 16);
        assert_eq!(read_u16(&bytes, 20), 1);
        assert_eq!(read_u16(&bytes, 22), 1);
        assert_eq!(read_u32(&bytes, 24), 24_000);
        assert_eq!(read_u32(&bytes, 28), 48_000);
        assert_eq!(read_u16(&bytes, 32), 2);
        assert_eq!(read_u16(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(&bytes[44..46], &1i16.to_le_bytes());
    }

    #[test]
    fn reader_reproduces_samples_and_rate() {
        let samples = vec![0, 1, -1, i16::MAX, i16::MIN, 12_345];
        let (decoded, spec) = read_back(encode_wav(&samples, 22_050)).unwrap();
        assert_eq!(decoded, samples);
        assert_eq!(spec.sample_rate, 22_050);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    }

    #[test]
    fn reader_accepts_long_output() {
        let samples: Vec<i16> = (-500..500).map(|i| i * 60).collect();
        let (decoded, spec) = read_back(encode_wav(&samples, 24_000)).unwrap();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(decoded, samples);
    }

    #[test]
    fn reader_rejects_truncated_and_foreign_data() {
        assert!(read_back(vec![0; 10]).is_err());

        let mut bytes = encode_wav(&[1, 2], 24_000);
        bytes[0] = b'X';
        assert!(read_back(bytes).is_err());

        let mut wave = encode_wav(&[1, 2], 24_000);
        wave[8..12].copy_from_slice(b"AVI ");
        assert!(read_back(wave).is_err());

        let mut header_only = encode_wav(&[1, 2], 24_000);
        header_only.truncate(30);
        assert!(read_back(header_only).is_err());
    }

    #[test]
    fn extreme_sample_rate_does_not_overflow() {
        let bytes = encode_wav(&[1], 3_000_000_000);
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 2);
        assert_eq!(read_u32(&bytes, 24), 3_000_000_000);
        assert_eq!(read_u32(&bytes, 28), u32::MAX);
    }

    #[test]
    fn size_limit_matches_riff_field() {
        assert_eq!(36 + 2 * MAX_WAV_SAMPLES as u64, u32::MAX as u64 - 1);
        assert_eq!(saturating_u32(u64::MAX), u32::MAX);
        assert_eq!(saturating_u32(48_000), 48_000);
    }
}
