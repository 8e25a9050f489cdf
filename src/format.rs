//! Out-of-band description of a raw PCM stream.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::{BITS_PER_SAMPLE, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};

const BYTES_PER_SAMPLE: u32 = (BITS_PER_SAMPLE / 8) as u32;

/// Sample rate and channel layout of a 16-bit little-endian PCM payload.
///
/// Raw PCM is not self-describing, so the same value must be used when
/// decoding for playback and when wrapping the bytes in a WAV container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Samples per second, per channel (default: 24000).
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Number of interleaved channels (default: 1).
    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_channels() -> u16 {
    DEFAULT_CHANNELS
}

impl PcmFormat {
    /// Creates a new format description.
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Creates a single-channel format at the given rate.
    pub fn mono(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1)
    }

    /// Bytes per frame (one sample for every channel).
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(BITS_PER_SAMPLE / 8)
    }

    /// Bytes per second of audio.
    ///
    /// Saturates on overflow; [`PcmFormat::validate`] rejects such formats.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate
            .saturating_mul(self.channels as u32)
            .saturating_mul(BYTES_PER_SAMPLE)
    }

    /// Checks that the format can describe a PCM stream and a WAV header.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidFormat("sample rate must be positive".to_string()));
        }
        if self.channels == 0 {
            return Err(Error::InvalidFormat("channel count must be positive".to_string()));
        }
        if self.channels.checked_mul(BITS_PER_SAMPLE / 8).is_none() {
            return Err(Error::InvalidFormat(format!(
                "block align overflows for {} channels",
                self.channels
            )));
        }
        let byte_rate = self
            .sample_rate
            .checked_mul(self.channels as u32)
            .and_then(|v| v.checked_mul(BYTES_PER_SAMPLE));
        if byte_rate.is_none() {
            return Err(Error::InvalidFormat(format!(
                "byte rate overflows for {} Hz x {} channels",
                self.sample_rate, self.channels
            )));
        }
        Ok(())
    }

    /// Playback length of `frames` frames, in seconds.
    pub fn duration_of(&self, frames: usize) -> f64 {
        frames as f64 / self.sample_rate.max(1) as f64
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_CHANNELS)
    }
}
