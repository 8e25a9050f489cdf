//! Interpretation of raw 16-bit little-endian PCM.

use tracing::debug;

use crate::error::Error;
use crate::format::PcmFormat;

/// Divisor mapping `i16::MIN` to exactly `-1.0`.
const I16_SCALE: f32 = 32768.0;

/// Normalized, channel-deinterleaved audio ready for a playback sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl DecodedAudio {
    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Samples of one channel, or `None` if out of range.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }

    /// Returns true if there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Re-interleaves the channels into a single frame-ordered sequence.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            out.extend(self.channels.iter().map(|ch| ch[frame]));
        }
        out
    }
}

/// Reads raw bytes as signed 16-bit little-endian samples.
///
/// Fails with [`Error::MalformedPcm`] on odd length; the trailing byte is
/// never dropped silently.
pub fn pcm_samples(bytes: &[u8]) -> Result<Vec<i16>, Error> {
    check_even(bytes)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
        .collect())
}

/// Maps a 16-bit sample to `[-1.0, 1.0)`.
#[inline]
pub fn normalize_sample(sample: i16) -> f32 {
    sample as f32 / I16_SCALE
}

/// Decodes raw PCM bytes into a playable buffer.
///
/// Samples are deinterleaved into `format.channels` arrays. Trailing samples
/// that do not form a complete frame are dropped.
pub fn decode_audio_data(bytes: &[u8], format: PcmFormat) -> Result<DecodedAudio, Error> {
    format.validate()?;
    check_even(bytes)?;

    let channel_count = format.channels as usize;
    let sample_count = bytes.len() / 2;
    let frames = sample_count / channel_count;
    let dropped = sample_count - frames * channel_count;

    let mut channels: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frames))
        .collect();
    for (i, c) in bytes
        .chunks_exact(2)
        .take(frames * channel_count)
        .enumerate()
    {
        let sample = i16::from_le_bytes([c[0], c[1]]);
        channels[i % channel_count].push(normalize_sample(sample));
    }

    debug!(
        bytes = bytes.len(),
        frames = frames,
        channels = channel_count,
        dropped = dropped,
        sample_rate = format.sample_rate,
        "Decoded PCM"
    );

    Ok(DecodedAudio {
        channels,
        sample_rate: format.sample_rate,
    })
}

fn check_even(bytes: &[u8]) -> Result<(), Error> {
    if bytes.len() % 2 != 0 {
        return Err(Error::MalformedPcm { len: bytes.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_pcm_samples_little_endian() {
        let bytes = [0x00, 0x00, 0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F];
        assert_eq!(pcm_samples(&bytes).unwrap(), vec![0, 16384, -16384, 32767]);
    }

    #[test]
    fn test_odd_length_rejected() {
        assert!(matches!(
            pcm_samples(&[0, 1, 2]),
            Err(Error::MalformedPcm { len: 3 })
        ));
        assert!(matches!(
            decode_audio_data(&[0, 1, 2], PcmFormat::default()),
            Err(Error::MalformedPcm { len: 3 })
        ));
    }

    #[test]
    fn test_normalization_bounds() {
        assert_eq!(normalize_sample(i16::MIN), -1.0);
        assert_eq!(normalize_sample(0), 0.0);
        assert!(normalize_sample(i16::MAX) < 1.0);
        for s in i16::MIN..=i16::MAX {
            let f = normalize_sample(s);
            assert!((-1.0..1.0).contains(&f), "sample {} mapped to {}", s, f);
        }
    }

    #[test]
    fn test_mono_is_identity_order() {
        let samples = [0i16, 16384, -16384, 32767, -32768];
        let audio = decode_audio_data(&to_bytes(&samples), PcmFormat::default()).unwrap();

        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.frames(), samples.len());
        assert_eq!(audio.sample_rate(), 24000);
        assert_eq!(
            audio.channel(0).unwrap(),
            &[0.0, 0.5, -0.5, 32767.0 / 32768.0, -1.0]
        );
    }

    #[test]
    fn test_stereo_truncates_incomplete_frame() {
        let samples = [1i16, 2, 3, 4, 5];
        let audio = decode_audio_data(&to_bytes(&samples), PcmFormat::new(24000, 2)).unwrap();

        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frames(), 2);
        assert_eq!(audio.channel(0).unwrap(), &[1.0 / 32768.0, 3.0 / 32768.0]);
        assert_eq!(audio.channel(1).unwrap(), &[2.0 / 32768.0, 4.0 / 32768.0]);
        assert_eq!(audio.interleaved().len(), 4);
    }

    #[test]
    fn test_every_channel_preallocated() {
        let samples = [0i16; 12];
        let audio = decode_audio_data(&to_bytes(&samples), PcmFormat::new(24000, 3)).unwrap();
        for channel in audio.channels() {
            assert_eq!(channel.len(), 4);
            assert!(channel.capacity() >= 4);
        }
    }

    #[test]
    fn test_empty_input() {
        let audio = decode_audio_data(&[], PcmFormat::default()).unwrap();
        assert!(audio.is_empty());
        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.duration(), 0.0);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let result = decode_audio_data(&[0, 0], PcmFormat::new(24000, 0));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_duration() {
        let audio = decode_audio_data(&vec![0u8; 48000], PcmFormat::default()).unwrap();
        assert!((audio.duration() - 1.0).abs() < 1e-9);
    }
}
