//! Operator, account and user claims.

use crate::error::{JwtError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The three levels of the trust hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Operator,
    Account,
    User,
}

impl ClaimKind {
    /// Value of `nats.type` on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimKind::Operator => "operator",
            ClaimKind::Account => "account",
            ClaimKind::User => "user",
        }
    }

    /// First character of a public key of this kind.
    pub fn prefix(self) -> char {
        match self {
            ClaimKind::Operator => 'O',
            ClaimKind::Account => 'A',
            ClaimKind::User => 'U',
        }
    }

    /// Prefix the issuer must carry, if the kind is not self-signed.
    pub fn issuer_prefix(self) -> Option<char> {
        match self {
            ClaimKind::Operator => None,
            ClaimKind::Account => Some('O'),
            ClaimKind::User => Some('A'),
        }
    }

    /// Kind encoded in a public key's first character.
    pub fn of_key(key: &str) -> Option<ClaimKind> {
        key.chars().next().and_then(ClaimKind::from_prefix)
    }

    pub fn from_prefix(prefix: char) -> Option<ClaimKind> {
        match prefix {
            'O' => Some(ClaimKind::Operator),
            'A' => Some(ClaimKind::Account),
            'U' => Some(ClaimKind::User),
            _ => None,
        }
    }

    fn title(self) -> &'static str {
        match self {
            ClaimKind::Operator => "Operator",
            ClaimKind::Account => "Account",
            ClaimKind::User => "User",
        }
    }
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimKind {
    type Err = JwtError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "operator" => Ok(ClaimKind::Operator),
            "account" => Ok(ClaimKind::Account),
            "user" => Ok(ClaimKind::User),
            other => Err(JwtError::UnknownClaimType(other.to_string())),
        }
    }
}

/// Fields shared by every claim kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClaimsCommon {
    pub(crate) subject: String,
    pub(crate) issuer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    pub(crate) issued_at: i64,
    pub(crate) expires: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(crate) jti: String,
}

impl ClaimsCommon {
    fn with_subject(subject: String) -> Self {
        Self {
            subject,
            ..Self::default()
        }
    }

    /// Structural rules shared by encode and decode.
    pub(crate) fn validate_as(&self, kind: ClaimKind) -> Result<()> {
        let title = kind.title();

        if self.subject.is_empty() {
            return Err(JwtError::structural(format!("{title} subject cannot be empty")));
        }
        if self.issuer.is_empty() {
            return Err(JwtError::structural(format!("{title} issuer cannot be empty")));
        }
        if !self.subject.starts_with(kind.prefix()) {
            return Err(JwtError::structural(format!(
                "{title} subject must start with '{}'",
                kind.prefix()
            )));
        }
        if let Some(prefix) = kind.issuer_prefix() {
            if !self.issuer.starts_with(prefix) {
                let parent = ClaimKind::from_prefix(prefix)
                    .map(ClaimKind::title)
                    .unwrap_or("?");
                return Err(JwtError::structural(format!(
                    "{title} issuer must be an {parent} (start with '{prefix}')"
                )));
            }
        }
        if self.expires > 0 && self.issued_at > 0 && self.expires <= self.issued_at {
            return Err(JwtError::structural(format!(
                "expiration ({}) must be after issuedAt ({})",
                self.expires, self.issued_at
            )));
        }
        Ok(())
    }
}

/// Variant-specific part of the `nats` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantFields<'a> {
    /// Operator and account delegated signing keys.
    SigningKeys(&'a [String]),
    /// User's issuing account.
    IssuerAccount(Option<&'a str>),
}

/// Read access shared by all claim kinds, plus validation and encoding.
pub trait ClaimSet {
    /// Which level of the hierarchy these claims describe.
    fn kind(&self) -> ClaimKind;

    /// Shared fields.
    fn common(&self) -> &ClaimsCommon;

    /// Variant-specific `nats` fields.
    fn variant_fields(&self) -> VariantFields<'_>;

    /// Public key of the claim holder.
    fn subject(&self) -> &str {
        &self.common().subject
    }

    /// Public key of the signer.
    fn issuer(&self) -> &str {
        &self.common().issuer
    }

    fn name(&self) -> Option<&str> {
        self.common().name.as_deref()
    }

    /// Unix seconds; 0 until set or encoded.
    fn issued_at(&self) -> i64 {
        self.common().issued_at
    }

    /// Unix seconds; 0 means never.
    fn expires(&self) -> i64 {
        self.common().expires
    }

    /// Token id read from a decoded token; empty for claims built in memory.
    fn jti(&self) -> &str {
        &self.common().jti
    }

    /// Structural validation: key prefixes, non-empty keys, expiry ordering.
    fn validate(&self) -> Result<()> {
        self.common().validate_as(self.kind())
    }

    /// Sign these claims with `seed` and return the token.
    fn encode(&self, seed: &str) -> Result<String> {
        crate::codec::encode(self, seed)
    }
}

/// Claims for an operator, the self-signed root of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorClaims {
    #[serde(flatten)]
    pub(crate) common: ClaimsCommon,
    pub(crate) signing_keys: Vec<String>,
}

impl OperatorClaims {
    /// New self-signed operator claims.
    pub fn new(operator_public_key: impl Into<String>) -> Self {
        let subject = operator_public_key.into();
        let mut common = ClaimsCommon::with_subject(subject.clone());
        common.issuer = subject;
        Self {
            common,
            signing_keys: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.common.name = Some(name.into());
    }

    pub fn set_expires(&mut self, expires: i64) {
        self.common.expires = expires;
    }

    pub fn set_issued_at(&mut self, issued_at: i64) {
        self.common.issued_at = issued_at;
    }

    /// Delegate signing to another operator key. Duplicates are kept.
    pub fn add_signing_key(&mut self, public_key: impl Into<String>) {
        self.signing_keys.push(public_key.into());
    }

    pub fn signing_keys(&self) -> &[String] {
        &self.signing_keys
    }
}

impl ClaimSet for OperatorClaims {
    fn kind(&self) -> ClaimKind {
        ClaimKind::Operator
    }

    fn common(&self) -> &ClaimsCommon {
        &self.common
    }

    fn variant_fields(&self) -> VariantFields<'_> {
        VariantFields::SigningKeys(&self.signing_keys)
    }
}

/// Claims for an account, issued by an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountClaims {
    #[serde(flatten)]
    pub(crate) common: ClaimsCommon,
    pub(crate) signing_keys: Vec<String>,
}

impl AccountClaims {
    /// New account claims with no issuer yet.
    pub fn new(account_public_key: impl Into<String>) -> Self {
        Self {
            common: ClaimsCommon::with_subject(account_public_key.into()),
            signing_keys: Vec::new(),
        }
    }

    /// Operator public key that signs this account.
    pub fn set_issuer(&mut self, operator_public_key: impl Into<String>) {
        self.common.issuer = operator_public_key.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.common.name = Some(name.into());
    }

    pub fn set_expires(&mut self, expires: i64) {
        self.common.expires = expires;
    }

    pub fn set_issued_at(&mut self, issued_at: i64) {
        self.common.issued_at = issued_at;
    }

    pub fn add_signing_key(&mut self, public_key: impl Into<String>) {
        self.signing_keys.push(public_key.into());
    }

    pub fn signing_keys(&self) -> &[String] {
        &self.signing_keys
    }
}

impl ClaimSet for AccountClaims {
    fn kind(&self) -> ClaimKind {
        ClaimKind::Account
    }

    fn common(&self) -> &ClaimsCommon {
        &self.common
    }

    fn variant_fields(&self) -> VariantFields<'_> {
        VariantFields::SigningKeys(&self.signing_keys)
    }
}

/// Claims for a user, issued by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserClaims {
    #[serde(flatten)]
    pub(crate) common: ClaimsCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) issuer_account: Option<String>,
}

impl UserClaims {
    /// New user claims with no issuer yet.
    pub fn new(user_public_key: impl Into<String>) -> Self {
        Self {
            common: ClaimsCommon::with_subject(user_public_key.into()),
            issuer_account: None,
        }
    }

    /// Account (or account signing key) that signs this user.
    pub fn set_issuer(&mut self, account_public_key: impl Into<String>) {
        self.common.issuer = account_public_key.into();
    }

    /// Account the user belongs to when signed by one of its signing keys.
    pub fn set_issuer_account(&mut self, account_public_key: impl Into<String>) {
        self.issuer_account = Some(account_public_key.into());
    }

    pub fn issuer_account(&self) -> Option<&str> {
        self.issuer_account.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.common.name = Some(name.into());
    }

    pub fn set_expires(&mut self, expires: i64) {
        self.common.expires = expires;
    }

    pub fn set_issued_at(&mut self, issued_at: i64) {
        self.common.issued_at = issued_at;
    }
}

impl ClaimSet for UserClaims {
    fn kind(&self) -> ClaimKind {
        ClaimKind::User
    }

    fn common(&self) -> &ClaimsCommon {
        &self.common
    }

    fn variant_fields(&self) -> VariantFields<'_> {
        VariantFields::IssuerAccount(self.issuer_account.as_deref())
    }
}

/// Any decoded claim set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Claims {
    Operator(OperatorClaims),
    Account(AccountClaims),
    User(UserClaims),
}

impl Claims {
    pub fn as_operator(&self) -> Option<&OperatorClaims> {
        match self {
            Claims::Operator(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_account(&self) -> Option<&AccountClaims> {
        match self {
            Claims::Account(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserClaims> {
        match self {
            Claims::User(c) => Some(c),
            _ => None,
        }
    }
}

impl ClaimSet for Claims {
    fn kind(&self) -> ClaimKind {
        match self {
            Claims::Operator(_) => ClaimKind::Operator,
            Claims::Account(_) => ClaimKind::Account,
            Claims::User(_) => ClaimKind::User,
        }
    }

    fn common(&self) -> &ClaimsCommon {
        match self {
            Claims::Operator(c) => &c.common,
            Claims::Account(c) => &c.common,
            Claims::User(c) => &c.common,
        }
    }

    fn variant_fields(&self) -> VariantFields<'_> {
        match self {
            Claims::Operator(c) => c.variant_fields(),
            Claims::Account(c) => c.variant_fields(),
            Claims::User(c) => c.variant_fields(),
        }
    }
}

impl From<OperatorClaims> for Claims {
    fn from(claims: OperatorClaims) -> Self {
        Claims::Operator(claims)
    }
}

impl From<AccountClaims> for Claims {
    fn from(claims: AccountClaims) -> Self {
        Claims::Account(claims)
    }
}

impl From<UserClaims> for Claims {
    fn from(claims: UserClaims) -> Self {
        Claims::User(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const OP: &str = "ODSKR7MYFQZ5MMAJ6FPMEEM6IJKA4V2DFPQ3LEVTH4ZTUOR3FTP5ZLMY";
    const ACC: &str = "ACZSWBJ4SYILK7QVDELO64VX3EFWB6CXCPMEBN3MNH5LZ4YQPPS4XIL4";
    const USR: &str = "UDXU4RCSJNZOIQHZNWXHXORDPRTGNJAHAHFRGZNEEJCPQTT2M7NLCNF4";

    #[test]
    fn test_operator_is_self_signed() {
        let claims = OperatorClaims::new(OP);
        assert_eq!(claims.subject(), OP);
        assert_eq!(claims.issuer(), OP);
        assert_eq!(claims.issued_at(), 0);
        assert_eq!(claims.expires(), 0);
        assert!(claims.name().is_none());
        assert!(claims.validate().is_ok());
    }

    #[test]
    fn test_signing_keys_keep_order_and_duplicates() {
        let mut claims = OperatorClaims::new(OP);
        claims.add_signing_key("OKEY2");
        claims.add_signing_key("OKEY1");
        claims.add_signing_key("OKEY2");
        assert_eq!(claims.signing_keys(), ["OKEY2", "OKEY1", "OKEY2"]);
    }

    #[test]
    fn test_operator_rejects_non_operator_subject() {
        let err = OperatorClaims::new(ACC).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralInvalid);
        assert!(err.to_string().contains("must start with 'O'"));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let err = OperatorClaims::new("").validate().unwrap_err();
        assert!(err.to_string().contains("subject cannot be empty"));
    }

    #[test]
    fn test_account_requires_operator_issuer() {
        let mut claims = AccountClaims::new(ACC);
        assert!(claims.issuer().is_empty());
        assert!(claims.validate().unwrap_err().to_string().contains("issuer cannot be empty"));

        claims.set_issuer(ACC);
        assert_eq!(claims.validate().unwrap_err().kind(), ErrorKind::StructuralInvalid);

        claims.set_issuer(OP);
        assert!(claims.validate().is_ok());
    }

    #[test]
    fn test_account_rejects_non_account_subject() {
        let mut claims = AccountClaims::new(USR);
        claims.set_issuer(OP);
        assert!(claims.validate().unwrap_err().to_string().contains("'A'"));
    }

    #[test]
    fn test_user_requires_account_issuer() {
        let mut claims = UserClaims::new(USR);
        claims.set_issuer(OP);
        let err = claims.validate().unwrap_err();
        assert!(err.to_string().contains("must be an Account"));

        claims.set_issuer(ACC);
        claims.set_issuer_account(ACC);
        assert!(claims.validate().is_ok());
        assert_eq!(claims.issuer_account(), Some(ACC));
    }

    #[test]
    fn test_expiry_must_follow_issued_at() {
        let mut claims = OperatorClaims::new(OP);
        claims.set_issued_at(1_000);
        claims.set_expires(1_000);
        assert_eq!(claims.validate().unwrap_err().kind(), ErrorKind::StructuralInvalid);

        claims.set_expires(999);
        assert!(claims.validate().is_err());

        claims.set_expires(1_001);
        assert!(claims.validate().is_ok());

        // Unset iat never conflicts with an expiry.
        claims.set_issued_at(0);
        claims.set_expires(5);
        assert!(claims.validate().is_ok());
    }

    #[test]
    fn test_claim_kind_strings_and_prefixes() {
        for kind in [ClaimKind::Operator, ClaimKind::Account, ClaimKind::User] {
            assert_eq!(kind.as_str().parse::<ClaimKind>().unwrap(), kind);
            let key = format!("{}XYZ", kind.prefix());
            assert_eq!(ClaimKind::of_key(&key), Some(kind));
        }
        assert!(matches!(
            "cluster".parse::<ClaimKind>(),
            Err(JwtError::UnknownClaimType(_))
        ));
        assert_eq!(ClaimKind::of_key(""), None);
        assert_eq!(ClaimKind::of_key("NXYZ"), None);
    }

    #[test]
    fn test_claims_enum_delegates() {
        let mut user = UserClaims::new(USR);
        user.set_issuer(ACC);
        user.set_name("alice");
        let claims = Claims::from(user);

        assert_eq!(claims.kind(), ClaimKind::User);
        assert_eq!(claims.name(), Some("alice"));
        assert_eq!(claims.variant_fields(), VariantFields::IssuerAccount(None));
        assert!(claims.as_user().is_some());
        assert!(claims.as_operator().is_none());
        assert!(claims.validate().is_ok());
    }
}
