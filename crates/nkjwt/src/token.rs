//! Token framing: `header.payload.signature`.

use crate::constants::MAX_JWT_SIZE;
use crate::error::{JwtError, Result};

/// The three segments of a token plus the exact bytes that were signed.
///
/// All fields borrow from the original token string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParts<'a> {
    pub header_b64: &'a str,
    pub payload_b64: &'a str,
    pub signature_b64: &'a str,
    /// `header_b64 "." payload_b64`, sliced from the token rather than rebuilt.
    pub signing_input: &'a str,
}

/// Split a token into its segments.
pub fn split(token: &str) -> Result<TokenParts<'_>> {
    if token.len() > MAX_JWT_SIZE {
        return Err(JwtError::malformed(format!(
            "token is {} bytes, maximum is {MAX_JWT_SIZE}",
            token.len()
        )));
    }

    let first_dot = token
        .find('.')
        .ok_or_else(|| JwtError::malformed("missing first '.'"))?;
    let second_dot = token[first_dot + 1..]
        .find('.')
        .map(|i| first_dot + 1 + i)
        .ok_or_else(|| JwtError::malformed("missing second '.'"))?;
    if token[second_dot + 1..].contains('.') {
        return Err(JwtError::malformed("too many segments"));
    }

    let header_b64 = &token[..first_dot];
    let payload_b64 = &token[first_dot + 1..second_dot];
    let signature_b64 = &token[second_dot + 1..];

    if header_b64.is_empty() {
        return Err(JwtError::malformed("empty header"));
    }
    if payload_b64.is_empty() {
        return Err(JwtError::malformed("empty payload"));
    }
    if signature_b64.is_empty() {
        return Err(JwtError::malformed("empty signature"));
    }

    Ok(TokenParts {
        header_b64,
        payload_b64,
        signature_b64,
        signing_input: &token[..second_dot],
    })
}

/// Build the signing input from encoded header and payload.
pub fn join(header_b64: &str, payload_b64: &str) -> String {
    format!("{header_b64}.{payload_b64}")
}

/// Append the encoded signature to a signing input.
pub fn assemble(signing_input: &str, signature_b64: &str) -> String {
    format!("{signing_input}.{signature_b64}")
}
