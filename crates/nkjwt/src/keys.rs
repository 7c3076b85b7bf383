//! Keypair provider: Ed25519 nkeys signing, verification and randomness.
//!
//! Seeds and public keys are the textual nkey forms (`SO...`, `OA...`, etc).
//! A keypair built from a seed lives only for the duration of one call.

use crate::claims::ClaimKind;
use crate::constants::{JTI_BYTES, SIGNATURE_LEN};
use crate::error::{JwtError, Result};
use nkeys::KeyPair;
use rand::RngCore;

/// Generate a new random keypair of the given kind.
pub fn generate(kind: ClaimKind) -> KeyPair {
    match kind {
        ClaimKind::Operator => KeyPair::new_operator(),
        ClaimKind::Account => KeyPair::new_account(),
        ClaimKind::User => KeyPair::new_user(),
    }
}

/// Sign `data` with the keypair encoded in `seed`.
pub fn sign(seed: &str, data: &[u8]) -> Result<Vec<u8>> {
    let keypair = KeyPair::from_seed(seed.trim())
        .map_err(|e| JwtError::Signing(format!("invalid seed: {e}")))?;
    keypair
        .sign(data)
        .map_err(|e| JwtError::Signing(e.to_string()))
}

/// Check `signature` over `data` against `public_key`.
///
/// Returns `Ok(false)` when the signature simply does not match, and an
/// error when the key or signature cannot be interpreted at all.
pub fn verify(public_key: &str, data: &[u8], signature: &[u8]) -> Result<bool> {
    if signature.len() != SIGNATURE_LEN {
        return Err(JwtError::SignatureInvalid(format!(
            "expected {SIGNATURE_LEN} signature bytes, got {}",
            signature.len()
        )));
    }

    let keypair = KeyPair::from_public_key(public_key)
        .map_err(|e| JwtError::SignatureInvalid(format!("invalid public key: {e}")))?;

    Ok(keypair.verify(data, signature).is_ok())
}

/// Fill a buffer of `n` random bytes.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; n];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// A fresh token identifier: 16 random bytes as 32 lowercase hex characters.
pub fn generate_jti() -> String {
    hex::encode(random_bytes(JTI_BYTES))
}

/// Public key of the keypair encoded in `seed`.
pub fn public_key_from_seed(seed: &str) -> Result<String> {
    KeyPair::from_seed(seed.trim())
        .map(|kp| kp.public_key())
        .map_err(|e| JwtError::Signing(format!("invalid seed: {e}")))
}

/// Seed string of a keypair.
pub fn seed_of(keypair: &KeyPair) -> Result<String> {
    keypair
        .seed()
        .map_err(|e| JwtError::Signing(format!("keypair has no seed: {e}")))
}
