//! Base64 payload decoding.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::debug;

use crate::error::Error;

// Standard alphabet; trailing `=` padding is optional.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes a base64 audio payload into raw bytes.
///
/// ASCII whitespace (including line breaks from wrapped payloads) is
/// ignored. An empty payload decodes to an empty buffer.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, Error> {
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    let bytes = ENGINE.decode(&compact)?;
    debug!(chars = payload.len(), bytes = bytes.len(), "Decoded audio payload");
    Ok(bytes)
}

/// Encodes raw bytes as standard, padded base64.
pub fn encode_payload(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        assert!(decode_payload("").unwrap().is_empty());
        assert!(decode_payload(" \n").unwrap().is_empty());
    }

    #[test]
    fn test_padding_is_optional() {
        assert_eq!(decode_payload("AAE=").unwrap(), vec![0x00, 0x01]);
        assert_eq!(decode_payload("AAE").unwrap(), vec![0x00, 0x01]);
    }

    #[test]
    fn test_whitespace_tolerated() {
        let wrapped = "AAEC\nAwQF\r\n BgcI";
        assert_eq!(
            decode_payload(wrapped).unwrap(),
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_invalid_character() {
        let result = decode_payload("AA$E");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_incorrect_padding() {
        // Excess padding after a complete final quantum.
        assert!(matches!(decode_payload("AAE=="), Err(Error::Decode(_))));
        // Padding before the end of the payload.
        assert!(matches!(decode_payload("AA=A"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decoding_is_deterministic() {
        let payload = "AAAAQADA/38=";
        assert_eq!(decode_payload(payload).unwrap(), decode_payload(payload).unwrap());
    }

    #[test]
    fn test_encode_then_decode() {
        let bytes = [0u8, 64, 0, 192, 255, 127];
        assert_eq!(decode_payload(&encode_payload(&bytes)).unwrap(), bytes);
    }
}
