//! # nkjwt
//!
//! Signed identity tokens for a three-level trust hierarchy.
//!
//! This crate provides functionality for:
//! - Encoding operator, account and user claims into nkey-signed JWTs
//! - Decoding untrusted tokens back into typed claims
//! - Verifying signatures against the claimed issuer's public key
//! - Validating expiry, issuer chains and key-type hierarchy
//! - Formatting user credentials files
//!
//! ## Trust Hierarchy
//!
//! | Claim Type | Subject Prefix | Signed By | Carries |
//! |------------|----------------|-----------|---------|
//! | **Operator** | `O` | Itself | Delegated signing keys |
//! | **Account** | `A` | Operator | Delegated signing keys |
//! | **User** | `U` | Account | Issuer account |
//!
//! ## Example
//!
//! ```no_run
//! use nkjwt::{AccountClaims, ClaimSet, KeyPair, OperatorClaims, ValidationOptions, keys};
//!
//! # fn main() -> nkjwt::Result<()> {
//! let operator = KeyPair::new_operator();
//! let account = KeyPair::new_account();
//! let operator_seed = keys::seed_of(&operator)?;
//!
//! let mut op = OperatorClaims::new(operator.public_key());
//! op.set_name("demo");
//! let op_jwt = op.encode(&operator_seed)?;
//!
//! let mut acc = AccountClaims::new(account.public_key());
//! acc.set_issuer(operator.public_key());
//! let acc_jwt = acc.encode(&operator_seed)?;
//!
//! nkjwt::validate_chain(&[op_jwt, acc_jwt], &ValidationOptions::strict())?;
//! # Ok(())
//! # }
//! ```

pub mod base64url;
pub mod claims;
pub mod codec;
pub mod constants;
pub mod creds;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod token;
pub mod validation;

pub use claims::{
    AccountClaims, ClaimKind, ClaimSet, Claims, ClaimsCommon, OperatorClaims, UserClaims,
    VariantFields,
};
pub use codec::{decode_account, decode_operator, decode_user};
pub use creds::{UserCredentials, format_user_config, parse_user_config};
pub use dispatch::{decode, verify};
pub use error::{ErrorKind, JwtError, Result};
pub use nkeys::KeyPair;
pub use validation::{
    ValidationOptions, validate, validate_chain, validate_claims, validate_expiration,
    validate_issuer_chain, validate_key_hierarchy, validate_not_before, validate_timing,
};
