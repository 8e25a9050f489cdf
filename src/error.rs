//! Error types for the audio transcoding pipeline.

use thiserror::Error;

/// Error type for transcoding and playback operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The base64 payload could not be decoded.
    #[error("Unable to process returned audio: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The raw payload is not a whole number of 16-bit samples.
    #[error("Malformed PCM payload: {len} bytes is not a whole number of 16-bit samples")]
    MalformedPcm {
        /// Length of the offending payload in bytes.
        len: usize,
    },

    /// Sample rate or channel count cannot describe a PCM stream.
    #[error("Invalid PCM format: {0}")]
    InvalidFormat(String),

    /// The data chunk does not fit a 32-bit RIFF size field.
    #[error("PCM payload too large for a WAV container: {len} bytes")]
    PayloadTooLarge {
        /// Length of the payload in bytes.
        len: usize,
    },

    /// A byte sequence is not a canonical 16-bit PCM WAV file.
    #[error("Invalid WAV file: {0}")]
    InvalidWav(String),

    /// Filesystem error while saving or loading a WAV file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The playback sink reported a failure.
    #[error("Audio sink error: {0}")]
    Sink(String),

    /// The player has no open sink.
    #[error("Player not ready")]
    NotReady,
}
