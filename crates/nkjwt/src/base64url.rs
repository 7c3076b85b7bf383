//! Unpadded base64url (RFC 4648 §5) encoding of token segments.

use base64::{DecodeError, Engine};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

/// URL-safe alphabet, no padding on encode, none accepted on decode (trailing
/// `=` is stripped before the engine sees the input).
///
/// Trailing bits must be zero, so every byte string has exactly one encoding
/// and any single-character change to a segment changes its bytes.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Errors produced by [`decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base64UrlError {
    /// A character outside `A-Za-z0-9-_`.
    #[error("invalid base64url character {character:?} at offset {offset}")]
    InvalidCharacter { character: char, offset: usize },

    /// The final group holds a single character, which cannot encode a byte.
    #[error("invalid base64url length {0}")]
    InvalidLength(usize),

    /// The final character carries non-zero bits past the last byte.
    #[error("non-canonical base64url: trailing bits set at offset {0}")]
    NonCanonical(usize),

    /// Any other rejection from the underlying decoder.
    #[error("base64url decode failed: {0}")]
    Decode(String),
}

/// Encode bytes without padding.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    ENGINE.encode(data)
}

/// Decode unpadded base64url text. Trailing `=` is tolerated.
pub fn decode(input: &str) -> Result<Vec<u8>, Base64UrlError> {
    let trimmed = input.trim_end_matches('=');

    if let Some((offset, character)) = trimmed
        .char_indices()
        .find(|(_, c)| !is_alphabet(*c))
    {
        return Err(Base64UrlError::InvalidCharacter { character, offset });
    }

    if trimmed.len() % 4 == 1 {
        return Err(Base64UrlError::InvalidLength(trimmed.len()));
    }

    ENGINE.decode(trimmed).map_err(|e| match e {
        DecodeError::InvalidLastSymbol(offset, _) => Base64UrlError::NonCanonical(offset),
        other => Base64UrlError::Decode(other.to_string()),
    })
}

fn is_alphabet(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
