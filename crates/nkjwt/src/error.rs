//! Error types for the nkjwt crate.

use crate::base64url::Base64UrlError;
use crate::claims::ClaimKind;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, JwtError>;

/// Errors that can occur while encoding, decoding or validating tokens.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Wrong segment count, empty segment, or oversized token.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A segment is not valid unpadded base64url.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(#[from] Base64UrlError),

    /// Header or payload is not a JSON object.
    #[error("invalid {segment} JSON: {reason}")]
    InvalidPayload {
        segment: &'static str,
        reason: String,
    },

    /// A required claim field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A claim field has the wrong JSON type.
    #[error("invalid field '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// Header `alg` is not `ed25519-nkey`.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// `nats.type` is a known type, but not the one the decoder expects.
    #[error("claim type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ClaimKind, found: String },

    /// `nats.type` is not a known claim type.
    #[error("unknown claim type: {0}")]
    UnknownClaimType(String),

    /// `nats.version` is not 2.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),

    /// Subject/issuer prefix or expiry invariant violated.
    #[error("structural validation failed: {0}")]
    StructuralInvalid(String),

    /// Token is past its expiry.
    #[error("token has expired (exp: {expires}, now: {now})")]
    Expired { expires: i64, now: i64 },

    /// Token was issued in the future.
    #[error("token is not yet valid (iat: {issued_at}, now: {now})")]
    NotYetValid { issued_at: i64, now: i64 },

    /// Child issuer does not match parent subject.
    #[error("issuer chain broken: {0}")]
    ChainBroken(String),

    /// Key-type pairing is not Operator→Operator, Operator→Account or Account→User.
    #[error("hierarchy violation: {0}")]
    HierarchyViolation(String),

    /// Signature did not verify against the issuer's key.
    #[error("invalid signature: {0}")]
    SignatureInvalid(String),

    /// Chain validation was given no tokens.
    #[error("empty token chain")]
    EmptyChain,

    /// Token could not be decoded during validation.
    #[error("failed to decode token: {0}")]
    DecodeFailed(#[source] Box<JwtError>),

    /// A token in a chain failed validation.
    #[error("token at index {index} failed validation: {source}")]
    ChainLink {
        index: usize,
        #[source]
        source: Box<JwtError>,
    },

    /// Seed could not be used for signing.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Creds file could not be produced or parsed.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// Fieldless view of [`JwtError`] for matching on the failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedToken,
    InvalidEncoding,
    InvalidPayload,
    MissingField,
    InvalidField,
    UnsupportedAlgorithm,
    TypeMismatch,
    UnknownClaimType,
    UnsupportedVersion,
    StructuralInvalid,
    Expired,
    NotYetValid,
    ChainBroken,
    HierarchyViolation,
    SignatureInvalid,
    EmptyChain,
    DecodeFailed,
    ChainLink,
    Signing,
    InvalidCredentials,
}

impl JwtError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JwtError::MalformedToken(_) => ErrorKind::MalformedToken,
            JwtError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            JwtError::InvalidPayload { .. } => ErrorKind::InvalidPayload,
            JwtError::MissingField(_) => ErrorKind::MissingField,
            JwtError::InvalidField { .. } => ErrorKind::InvalidField,
            JwtError::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            JwtError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            JwtError::UnknownClaimType(_) => ErrorKind::UnknownClaimType,
            JwtError::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            JwtError::StructuralInvalid(_) => ErrorKind::StructuralInvalid,
            JwtError::Expired { .. } => ErrorKind::Expired,
            JwtError::NotYetValid { .. } => ErrorKind::NotYetValid,
            JwtError::ChainBroken(_) => ErrorKind::ChainBroken,
            JwtError::HierarchyViolation(_) => ErrorKind::HierarchyViolation,
            JwtError::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            JwtError::EmptyChain => ErrorKind::EmptyChain,
            JwtError::DecodeFailed(_) => ErrorKind::DecodeFailed,
            JwtError::ChainLink { .. } => ErrorKind::ChainLink,
            JwtError::Signing(_) => ErrorKind::Signing,
            JwtError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
        }
    }

    /// The innermost error, looking through `DecodeFailed` and `ChainLink`.
    pub fn root_cause(&self) -> &JwtError {
        match self {
            JwtError::DecodeFailed(inner) => inner.root_cause(),
            JwtError::ChainLink { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn structural(msg: impl Into<String>) -> Self {
        JwtError::StructuralInvalid(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        JwtError::MalformedToken(msg.into())
    }
}
