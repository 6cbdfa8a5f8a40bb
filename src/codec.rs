//! Data-URI image payloads.
//!
//! Client images arrive as `data:<mime>;base64,<payload>`. They are validated
//! once on the way in and re-encoded with canonical padding before they are
//! forwarded to any provider.

use crate::error::{Result, RoomFlipError};
use base64::{
    alphabet,
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::Serialize;

/// Accepts payloads with or without trailing `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedImage {
    mime_type: String,
    data: String,
}

impl EncodedImage {
    /// Parses and validates a `data:<mime>;base64,<payload>` string.
    pub fn decode(data_uri: &str) -> Result<Self> {
        let rest = data_uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("missing data: prefix"))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| invalid("missing ;base64, separator"))?;

        Self::from_base64(mime_type, payload)
    }

    /// Builds an image from a MIME type and a raw base64 payload.
    pub fn from_base64(mime_type: &str, payload: &str) -> Result<Self> {
        if !is_valid_mime(mime_type) {
            return Err(invalid(&format!("malformed MIME type '{}'", mime_type)));
        }

        let data: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if data.is_empty() {
            return Err(invalid("empty payload"));
        }
        LENIENT
            .decode(data.as_bytes())
            .map_err(|e| invalid(&format!("payload is not valid base64 ({})", e)))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Decodes and re-serializes the payload with canonical padding.
    pub fn reencode(&self) -> Result<Self> {
        let bytes = self.bytes()?;
        Ok(Self {
            mime_type: self.mime_type.clone(),
            data: STANDARD.encode(bytes),
        })
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        LENIENT
            .decode(self.data.as_bytes())
            .map_err(|e| invalid(&format!("payload is not valid base64 ({})", e)))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn base64_payload(&self) -> &str {
        &self.data
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn is_valid_mime(mime_type: &str) -> bool {
    let Some((kind, subtype)) = mime_type.split_once('/') else {
        return false;
    };
    let token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    };
    token(kind) && token(subtype)
}

fn invalid(reason: &str) -> RoomFlipError {
    RoomFlipError::InvalidImageFormat(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A];

    fn jpeg_uri() -> String {
        format!("data:image/jpeg;base64,{}", STANDARD.encode(JPEG_MAGIC))
    }

    #[test]
    fn test_decode_extracts_mime_and_payload() {
        let image = EncodedImage::decode(&jpeg_uri()).unwrap();
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.bytes().unwrap(), JPEG_MAGIC);
        assert_eq!(image.to_data_uri(), jpeg_uri());
    }

    #[test]
    fn test_reencode_restores_padding_and_bytes() {
        let padded = STANDARD.encode(JPEG_MAGIC);
        let unpadded = padded.trim_end_matches('=');
        assert_ne!(padded, unpadded);

        let image = EncodedImage::decode(&format!("data:image/png;base64,{}", unpadded)).unwrap();
        let canonical = image.reencode().unwrap();
        assert_eq!(canonical.base64_payload(), padded);
        assert_eq!(canonical.bytes().unwrap(), JPEG_MAGIC);
    }

    #[test]
    fn test_reencode_is_idempotent() {
        let image = EncodedImage::decode("data:image/webp;base64,AAEC\nAwQ").unwrap();
        let once = image.reencode().unwrap();
        let twice = once.reencode().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_inputs_are_invalid_image_format() {
        let cases = [
            "image/png;base64,AAAA",
            "data:image/png,AAAA",
            "data:image/png;base64,",
            "data:image/png;base64,@@not-base64@@",
            "data:png;base64,AAAA",
            "data:;base64,AAAA",
            "",
        ];
        for case in cases {
            match EncodedImage::decode(case) {
                Err(RoomFlipError::InvalidImageFormat(_)) => {}
                other => panic!("expected InvalidImageFormat for {:?}, got {:?}", case, other),
            }
        }
    }
}
