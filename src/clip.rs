//! One synthesized utterance and its out-of-band format.

use tracing::{debug, error};

use crate::error::Error;
use crate::format::PcmFormat;
use crate::payload::decode_payload;
use crate::pcm::{decode_audio_data, DecodedAudio};
use crate::wav::{pcm_bytes_to_wav, WavFile};

/// Raw PCM returned by the speech service, paired with the format it was
/// produced in.
///
/// Both the playback buffer and the WAV file are derived from the same bytes
/// and the same [`PcmFormat`], so their sample rates cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechClip {
    raw: Vec<u8>,
    format: PcmFormat,
}

impl SpeechClip {
    /// Decodes a base64 payload.
    ///
    /// Fails on malformed base64 or on a payload that is not a whole number
    /// of 16-bit samples.
    pub fn from_base64(payload: &str, format: PcmFormat) -> Result<Self, Error> {
        let raw = decode_payload(payload).map_err(|e| {
            error!(error = %e, "Failed to decode audio payload");
            e
        })?;
        Self::from_raw(raw, format)
    }

    /// Wraps already-decoded raw PCM bytes.
    pub fn from_raw(raw: Vec<u8>, format: PcmFormat) -> Result<Self, Error> {
        format.validate()?;
        if raw.len() % 2 != 0 {
            error!(len = raw.len(), "Audio payload has a dangling byte");
            return Err(Error::MalformedPcm { len: raw.len() });
        }
        debug!(
            bytes = raw.len(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            "Speech clip ready"
        );
        Ok(Self { raw, format })
    }

    /// The raw little-endian PCM bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The format shared by both output paths.
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// The 16-bit samples, interleaved.
    pub fn samples(&self) -> Vec<i16> {
        self.raw
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    /// Number of 16-bit samples.
    pub fn sample_count(&self) -> usize {
        self.raw.len() / 2
    }

    /// Playback length in seconds, counting complete frames only.
    pub fn duration(&self) -> f64 {
        self.format
            .duration_of(self.sample_count() / self.format.channels as usize)
    }

    /// Decodes the clip for a playback sink.
    pub fn decode(&self) -> Result<DecodedAudio, Error> {
        decode_audio_data(&self.raw, self.format)
    }

    /// Wraps the clip in a WAV file for storage or download.
    pub fn to_wav(&self) -> Result<WavFile, Error> {
        pcm_bytes_to_wav(&self.raw, self.format)
    }

    /// Produces both the playback buffer and the WAV file.
    pub fn transcode(&self) -> Result<(DecodedAudio, WavFile), Error> {
        Ok((self.decode()?, self.to_wav()?))
    }
}

impl TryFrom<WavFile> for SpeechClip {
    type Error = Error;

    fn try_from(wav: WavFile) -> Result<Self, Self::Error> {
        Self::from_raw(wav.pcm_data().to_vec(), wav.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // [0, 16384, -16384, 32767]
    const PAYLOAD: &str = "AAAAQADA/38=";

    #[test]
    fn test_from_base64() {
        let clip = SpeechClip::from_base64(PAYLOAD, PcmFormat::default()).unwrap();
        assert_eq!(clip.raw(), &[0x00, 0x00, 0x00, 0x40, 0x00, 0xC0, 0xFF, 0x7F]);
        assert_eq!(clip.samples(), vec![0, 16384, -16384, 32767]);
        assert_eq!(clip.sample_count(), 4);
    }

    #[test]
    fn test_transcode_shares_format() {
        let format = PcmFormat::mono(16000);
        let clip = SpeechClip::from_base64(PAYLOAD, format).unwrap();
        let (audio, wav) = clip.transcode().unwrap();

        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(wav.format(), format);
        assert_eq!(audio.frames() * 2, wav.pcm_data().len());
        assert_eq!(wav.pcm_data(), clip.raw());
    }

    #[test]
    fn test_odd_payload_rejected() {
        // Three bytes: 00 00 00
        let result = SpeechClip::from_base64("AAAA", PcmFormat::default());
        assert!(matches!(result, Err(Error::MalformedPcm { len: 3 })));
    }

    #[test]
    fn test_bad_base64_rejected() {
        let result = SpeechClip::from_base64("not*base64", PcmFormat::default());
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_empty_payload() {
        let clip = SpeechClip::from_base64("", PcmFormat::default()).unwrap();
        let (audio, wav) = clip.transcode().unwrap();
        assert!(audio.is_empty());
        assert_eq!(wav.len(), 44);
        assert_eq!(clip.duration(), 0.0);
    }

    #[test]
    fn test_from_stored_wav() {
        let clip = SpeechClip::from_base64(PAYLOAD, PcmFormat::mono(22050)).unwrap();
        let restored = SpeechClip::try_from(clip.to_wav().unwrap()).unwrap();
        assert_eq!(restored, clip);
    }

    #[test]
    fn test_stereo_duration_counts_frames() {
        let clip = SpeechClip::from_raw(vec![0u8; 10], PcmFormat::new(2, 2)).unwrap();
        assert_eq!(clip.sample_count(), 5);
        assert!((clip.duration() - 1.0).abs() < 1e-9);
    }
}
