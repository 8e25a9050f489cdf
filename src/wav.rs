//! Canonical 16-bit PCM WAV (RIFF/WAVE) container.
//!
//! Layout written by this module, all integers little-endian:
//!
//! | offset | field                            |
//! |--------|----------------------------------|
//! | 0      | `"RIFF"`                         |
//! | 4      | u32 RIFF size = 36 + data length |
//! | 8      | `"WAVE"`                         |
//! | 12     | `"fmt "`, u32 16                 |
//! | 20     | u16 format tag 1 (integer PCM)   |
//! | 22     | u16 channels                     |
//! | 24     | u32 sample rate                  |
//! | 28     | u32 byte rate                    |
//! | 32     | u16 block align                  |
//! | 34     | u16 bits per sample (16)         |
//! | 36     | `"data"`, u32 data length        |
//! | 44     | samples                          |

use std::path::Path;

use tracing::{debug, error};

use crate::error::Error;
use crate::format::PcmFormat;
use crate::payload::encode_payload;
use crate::pcm::{decode_audio_data, DecodedAudio};
use crate::{BITS_PER_SAMPLE, WAV_HEADER_LEN, WAV_MIME_TYPE};

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;
// Header bytes counted by the RIFF size field.
const RIFF_OVERHEAD: u32 = WAV_HEADER_LEN as u32 - 8;

/// The fixed 44-byte header of a canonical PCM WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    format: PcmFormat,
    data_len: u32,
}

impl WavHeader {
    /// Creates a header for `data_len` bytes of samples.
    pub fn new(format: PcmFormat, data_len: usize) -> Result<Self, Error> {
        format.validate()?;
        let data_len = u32::try_from(data_len)
            .ok()
            .filter(|n| n.checked_add(RIFF_OVERHEAD).is_some())
            .ok_or(Error::PayloadTooLarge { len: data_len })?;
        Ok(Self { format, data_len })
    }

    /// Format of the sample data.
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Length of the `data` chunk in bytes.
    pub fn data_len(&self) -> u32 {
        self.data_len
    }

    /// Value of the RIFF chunk size field (total file length minus 8).
    pub fn riff_len(&self) -> u32 {
        // Bounded on construction.
        self.data_len.saturating_add(RIFF_OVERHEAD)
    }

    /// Serializes the header.
    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut out = [0u8; WAV_HEADER_LEN];
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.riff_len().to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        out[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        out[22..24].copy_from_slice(&self.format.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.format.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.format.byte_rate().to_le_bytes());
        out[32..34].copy_from_slice(&self.format.block_align().to_le_bytes());
        out[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }

    /// Parses a canonical header as written by [`WavHeader::to_bytes`].
    ///
    /// Files with extra chunks, other encodings or bit depths are rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(Error::InvalidWav(format!(
                "{} bytes is shorter than the {}-byte header",
                bytes.len(),
                WAV_HEADER_LEN
            )));
        }
        expect_tag(bytes, 0, b"RIFF")?;
        expect_tag(bytes, 8, b"WAVE")?;
        expect_tag(bytes, 12, b"fmt ")?;
        expect_tag(bytes, 36, b"data")?;

        let fmt_len = read_u32(bytes, 16);
        if fmt_len != FMT_CHUNK_LEN {
            return Err(Error::InvalidWav(format!("unsupported fmt chunk size {}", fmt_len)));
        }
        let tag = read_u16(bytes, 20);
        if tag != FORMAT_PCM {
            return Err(Error::InvalidWav(format!("unsupported format tag {}", tag)));
        }
        let bits = read_u16(bytes, 34);
        if bits != BITS_PER_SAMPLE {
            return Err(Error::InvalidWav(format!("unsupported bit depth {}", bits)));
        }

        let format = PcmFormat::new(read_u32(bytes, 24), read_u16(bytes, 22));
        format
            .validate()
            .map_err(|e| Error::InvalidWav(e.to_string()))?;
        if read_u32(bytes, 28) != format.byte_rate() {
            return Err(Error::InvalidWav("byte rate does not match format".to_string()));
        }
        if read_u16(bytes, 32) != format.block_align() {
            return Err(Error::InvalidWav("block align does not match format".to_string()));
        }

        let data_len = read_u32(bytes, 40);
        let riff_len = data_len.checked_add(RIFF_OVERHEAD).ok_or_else(|| {
            Error::InvalidWav(format!("data chunk size {} exceeds RIFF limit", data_len))
        })?;
        if read_u32(bytes, 4) != riff_len {
            return Err(Error::InvalidWav(
                "RIFF size does not match data size".to_string(),
            ));
        }
        Ok(Self { format, data_len })
    }
}

/// A complete, independently playable WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavFile {
    bytes: Vec<u8>,
    header: WavHeader,
}

impl WavFile {
    /// Validates a stored WAV file.
    ///
    /// The declared data length must equal the bytes following the header.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
        let header = WavHeader::parse(&bytes)?;
        let actual = bytes.len() - WAV_HEADER_LEN;
        if header.data_len as usize != actual {
            return Err(Error::InvalidWav(format!(
                "data chunk declares {} bytes, file holds {}",
                header.data_len, actual
            )));
        }
        Ok(Self { bytes, header })
    }

    /// Loads and validates a WAV file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Loaded WAV file");
        Self::from_bytes(bytes)
    }

    /// Writes the file to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Err(e) = std::fs::write(path, &self.bytes) {
            error!(path = %path.display(), error = %e, "Failed to save WAV file");
            return Err(e.into());
        }
        debug!(path = %path.display(), bytes = self.bytes.len(), "Saved WAV file");
        Ok(())
    }

    /// The parsed header.
    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    /// Sample format declared by the header.
    pub fn format(&self) -> PcmFormat {
        self.header.format
    }

    /// The whole file.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the file, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The raw little-endian sample bytes after the header.
    pub fn pcm_data(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    /// Total file length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the file carries no samples.
    pub fn is_empty(&self) -> bool {
        self.header.data_len == 0
    }

    /// MIME type to attach when storing or serving the file.
    pub fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    /// Decodes the stored samples for playback using the declared format.
    pub fn decode(&self) -> Result<DecodedAudio, Error> {
        decode_audio_data(self.pcm_data(), self.header.format)
    }

    /// Base64 of the whole file.
    pub fn to_base64(&self) -> String {
        encode_payload(&self.bytes)
    }

    /// `data:` URL suitable for an audio element or download link.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", WAV_MIME_TYPE, self.to_base64())
    }
}

impl AsRef<[u8]> for WavFile {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Wraps 16-bit samples in a WAV container.
///
/// Samples are written in the given order; for multi-channel formats they
/// must already be interleaved.
pub fn pcm_to_wav(samples: &[i16], format: PcmFormat) -> Result<WavFile, Error> {
    let data_len = samples.len().saturating_mul(2);
    let header = WavHeader::new(format, data_len)?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + data_len);
    bytes.extend_from_slice(&header.to_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }

    debug!(
        samples = samples.len(),
        bytes = bytes.len(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "Encoded WAV"
    );
    Ok(WavFile { bytes, header })
}

/// Wraps raw little-endian PCM bytes in a WAV container without
/// reinterpreting them.
pub fn pcm_bytes_to_wav(pcm: &[u8], format: PcmFormat) -> Result<WavFile, Error> {
    if pcm.len() % 2 != 0 {
        return Err(Error::MalformedPcm { len: pcm.len() });
    }
    let header = WavHeader::new(format, pcm.len())?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(pcm);

    debug!(
        bytes = bytes.len(),
        sample_rate = format.sample_rate,
        channels = format.channels,
        "Encoded WAV"
    );
    Ok(WavFile { bytes, header })
}

fn expect_tag(bytes: &[u8], offset: usize, tag: &[u8; 4]) -> Result<(), Error> {
    if &bytes[offset..offset + 4] != tag {
        return Err(Error::InvalidWav(format!(
            "expected {:?} at offset {}",
            String::from_utf8_lossy(tag),
            offset
        )));
    }
    Ok(())
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
