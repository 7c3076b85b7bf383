//! Validation engine: timing, issuer-chain and key-hierarchy checks.
//!
//! Every check returns `Result<(), JwtError>`; the error's `Display` is a
//! human-readable diagnostic.
//!
//! NATS tokens carry no `nbf` claim, so the not-before check uses `iat`.
//! `iat` is chosen by the issuer, which makes this a sanity check on clocks,
//! not a control against a dishonest issuer.

use crate::claims::{ClaimKind, ClaimSet, Claims};
use crate::dispatch;
use crate::error::{JwtError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which checks to run and how much clock skew to allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Reject tokens past `exp`.
    pub check_expiration: bool,

    /// Reject tokens whose `iat` lies in the future.
    pub check_not_before: bool,

    /// Tolerance applied to both time checks, in seconds.
    pub clock_skew_seconds: i64,

    /// Verify the signature against the token's issuer.
    pub check_signature: bool,

    /// Check that each token in a chain was issued by its predecessor.
    pub check_issuer_chain: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_expiration: true,
            check_not_before: false,
            clock_skew_seconds: 0,
            check_signature: true,
            check_issuer_chain: false,
        }
    }
}

impl ValidationOptions {
    /// Every check on, no skew.
    pub fn strict() -> Self {
        Self {
            check_expiration: true,
            check_not_before: true,
            clock_skew_seconds: 0,
            check_signature: true,
            check_issuer_chain: true,
        }
    }

    /// Every check off. The 5 minute skew only matters if a check is re-enabled.
    pub fn permissive() -> Self {
        Self {
            check_expiration: false,
            check_not_before: false,
            clock_skew_seconds: 300,
            check_signature: false,
            check_issuer_chain: false,
        }
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Fail with `Expired` when the current time is past `exp + skew`.
pub fn validate_expiration<C: ClaimSet + ?Sized>(claims: &C, clock_skew_seconds: i64) -> Result<()> {
    validate_expiration_at(claims, clock_skew_seconds, now())
}

/// [`validate_expiration`] against an explicit clock.
pub fn validate_expiration_at<C: ClaimSet + ?Sized>(
    claims: &C,
    clock_skew_seconds: i64,
    now: i64,
) -> Result<()> {
    let expires = claims.expires();
    if expires <= 0 {
        return Ok(());
    }
    if now > expires.saturating_add(clock_skew_seconds) {
        return Err(JwtError::Expired { expires, now });
    }
    Ok(())
}

/// Fail with `NotYetValid` when the current time is before `iat - skew`.
pub fn validate_not_before<C: ClaimSet + ?Sized>(claims: &C, clock_skew_seconds: i64) -> Result<()> {
    validate_not_before_at(claims, clock_skew_seconds, now())
}

/// [`validate_not_before`] against an explicit clock.
pub fn validate_not_before_at<C: ClaimSet + ?Sized>(
    claims: &C,
    clock_skew_seconds: i64,
    now: i64,
) -> Result<()> {
    let issued_at = claims.issued_at();
    if issued_at <= 0 {
        return Ok(());
    }
    if now < issued_at.saturating_sub(clock_skew_seconds) {
        return Err(JwtError::NotYetValid { issued_at, now });
    }
    Ok(())
}

/// Not-before then expiration, each only if enabled.
pub fn validate_timing<C: ClaimSet + ?Sized>(claims: &C, opts: &ValidationOptions) -> Result<()> {
    validate_timing_at(claims, opts, now())
}

/// [`validate_timing`] against an explicit clock.
pub fn validate_timing_at<C: ClaimSet + ?Sized>(
    claims: &C,
    opts: &ValidationOptions,
    now: i64,
) -> Result<()> {
    if opts.check_not_before {
        validate_not_before_at(claims, opts.clock_skew_seconds, now)?;
    }
    if opts.check_expiration {
        validate_expiration_at(claims, opts.clock_skew_seconds, now)?;
    }
    Ok(())
}

/// The child must name the parent's subject as its issuer.
pub fn validate_issuer_chain<C, P>(child: &C, parent: &P) -> Result<()>
where
    C: ClaimSet + ?Sized,
    P: ClaimSet + ?Sized,
{
    if child.issuer().is_empty() {
        return Err(JwtError::ChainBroken("child issuer is empty".to_string()));
    }
    if parent.subject().is_empty() {
        return Err(JwtError::ChainBroken("parent subject is empty".to_string()));
    }
    if child.issuer() != parent.subject() {
        return Err(JwtError::ChainBroken(format!(
            "child issuer '{}' does not match parent subject '{}'",
            child.issuer(),
            parent.subject()
        )));
    }
    Ok(())
}

/// Key-type pairing must be Operator←Operator (same key), Account←Operator or
/// User←Account, and the child's issuer must be the same type as the parent.
pub fn validate_key_hierarchy<C, P>(child: &C, parent: &P) -> Result<()>
where
    C: ClaimSet + ?Sized,
    P: ClaimSet + ?Sized,
{
    let child_subject = child.subject();
    let child_issuer = child.issuer();
    let parent_subject = parent.subject();

    let (Some(child_type), Some(issuer_type), Some(parent_type)) = (
        child_subject.chars().next(),
        child_issuer.chars().next(),
        parent_subject.chars().next(),
    ) else {
        return Err(JwtError::HierarchyViolation(
            "empty subject or issuer".to_string(),
        ));
    };

    if issuer_type != parent_type {
        return Err(JwtError::HierarchyViolation(format!(
            "child issuer type '{issuer_type}' does not match parent type '{parent_type}'"
        )));
    }

    match (child_type, parent_type) {
        ('O', 'O') if child_subject == parent_subject => Ok(()),
        ('O', 'O') => Err(JwtError::HierarchyViolation(
            "operator must be self-signed".to_string(),
        )),
        ('A', 'O') | ('U', 'A') => Ok(()),
        _ => Err(JwtError::HierarchyViolation(format!(
            "{} cannot be signed by {}",
            describe(child_type),
            describe(parent_type)
        ))),
    }
}

fn describe(prefix: char) -> &'static str {
    ClaimKind::from_prefix(prefix)
        .map(ClaimKind::as_str)
        .unwrap_or("unknown")
}

/// Timing and structural checks on already-decoded claims.
pub fn validate_claims<C: ClaimSet + ?Sized>(claims: &C, opts: &ValidationOptions) -> Result<()> {
    validate_timing(claims, opts)?;
    claims.validate()
}

/// Decode, then signature, timing and structural checks. First failure wins.
pub fn validate(token: &str, opts: &ValidationOptions) -> Result<()> {
    validate_token(token, opts).map(|_| ())
}

fn validate_token(token: &str, opts: &ValidationOptions) -> Result<Claims> {
    let claims = dispatch::decode(token).map_err(|e| JwtError::DecodeFailed(Box::new(e)))?;

    if opts.check_signature && !dispatch::verify(token) {
        warn!(kind = %claims.kind(), subject = %claims.subject(), issuer = %claims.issuer(), "signature rejected");
        return Err(JwtError::SignatureInvalid(format!(
            "signature does not verify against issuer '{}'",
            claims.issuer()
        )));
    }

    validate_timing(&claims, opts)?;
    claims.validate()?;

    debug!(kind = %claims.kind(), subject = %claims.subject(), "token validated");
    Ok(claims)
}

/// Validate tokens ordered root first, e.g. `[operator, account, user]`.
///
/// Each token is validated on its own; with `check_issuer_chain`, every
/// adjacent pair must also pass the issuer-chain and key-hierarchy checks.
pub fn validate_chain<S: AsRef<str>>(tokens: &[S], opts: &ValidationOptions) -> Result<()> {
    if tokens.is_empty() {
        return Err(JwtError::EmptyChain);
    }

    let at = |index: usize| move |source: JwtError| {
        warn!(index, error = %source, "chain validation failed");
        JwtError::ChainLink {
            index,
            source: Box::new(source),
        }
    };

    let chain = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| validate_token(token.as_ref(), opts).map_err(at(i)))
        .collect::<Result<Vec<_>>>()?;

    if opts.check_issuer_chain {
        for (i, pair) in chain.windows(2).enumerate() {
            let (parent, child) = (&pair[0], &pair[1]);
            validate_issuer_chain(child, parent).map_err(at(i + 1))?;
            validate_key_hierarchy(child, parent).map_err(at(i + 1))?;
        }
    }

    Ok(())
}
