//! Transcoding of raw PCM text-to-speech payloads.
//!
//! Speech services return audio as base64-encoded, headerless, signed 16-bit
//! little-endian PCM. This crate turns such a payload into a normalized
//! buffer for immediate playback and into a self-contained WAV file for
//! storage or download.
//!
//! # Example
//!
//! ```no_run
//! use rust_tts_audio::{AudioSink, DecodedAudio, PcmFormat, Player, SpeechClip};
//!
//! struct Speaker;
//!
//! impl AudioSink for Speaker {
//!     fn play(&mut self, audio: &DecodedAudio) -> Result<(), rust_tts_audio::Error> {
//!         println!("Playing {:.2}s of audio", audio.duration());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rust_tts_audio::Error> {
//!     // Created once per session, opened on first use.
//!     let player = Player::new(|| Ok(Speaker));
//!
//!     let payload = "AAAAQADA/38="; // base64 from the speech service
//!     let clip = SpeechClip::from_base64(payload, PcmFormat::default())?;
//!
//!     let (audio, wav) = clip.transcode()?;
//!     player.play(&audio).await?;
//!     wav.save("speech.wav")?;
//!
//!     Ok(())
//! }
//! ```

mod clip;
mod error;
mod format;
mod payload;
mod pcm;
mod playback;
mod wav;

pub use clip::SpeechClip;
pub use error::Error;
pub use format::PcmFormat;
pub use payload::{decode_payload, encode_payload};
pub use pcm::{decode_audio_data, normalize_sample, pcm_samples, DecodedAudio};
pub use playback::{AudioSink, Player};
pub use wav::{pcm_bytes_to_wav, pcm_to_wav, WavFile, WavHeader};

/// Sample rate of speech service output, in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Channel count of speech service output.
pub const DEFAULT_CHANNELS: u16 = 1;

/// Bit depth of every PCM stream handled by this crate.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Length of a canonical PCM WAV header.
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type of encoded WAV files.
pub const WAV_MIME_TYPE: &str = "audio/wav";
