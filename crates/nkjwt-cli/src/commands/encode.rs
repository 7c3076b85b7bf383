//! Token issuing commands.
//!
//! `nkjwt encode operator` - Issue a self-signed operator token.
//! `nkjwt encode account` - Issue an account token signed by an operator.
//! `nkjwt encode user` - Issue a user token signed by an account.

use anyhow::Context;
use nkjwt::keys;
use nkjwt::{AccountClaims, ClaimSet, OperatorClaims, UserClaims};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Fields shared by every encode subcommand.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    pub name: Option<String>,
    /// Absolute unix expiry; 0 for none.
    pub expires: i64,
    pub output: Option<PathBuf>,
}

/// Issue a self-signed operator token.
pub fn operator(
    seed: &str,
    signing_keys: Vec<String>,
    opts: IssueOptions,
) -> anyhow::Result<()> {
    let public_key = keys::public_key_from_seed(seed)?;
    let mut claims = OperatorClaims::new(public_key);
    if let Some(name) = &opts.name {
        claims.set_name(name);
    }
    claims.set_expires(opts.expires);
    for key in signing_keys {
        claims.add_signing_key(key);
    }

    let token = claims
        .encode(seed)
        .context("Failed to encode operator token. Is the seed an operator seed (SO...)?")?;
    emit(&claims, &token, opts.output)
}

/// Issue an account token signed by the operator in `seed`.
pub fn account(
    subject: &str,
    seed: &str,
    signing_keys: Vec<String>,
    opts: IssueOptions,
) -> anyhow::Result<()> {
    let mut claims = AccountClaims::new(subject);
    claims.set_issuer(keys::public_key_from_seed(seed)?);
    if let Some(name) = &opts.name {
        claims.set_name(name);
    }
    claims.set_expires(opts.expires);
    for key in signing_keys {
        claims.add_signing_key(key);
    }

    let token = claims
        .encode(seed)
        .context("Failed to encode account token. Is the seed an operator seed (SO...)?")?;
    emit(&claims, &token, opts.output)
}

/// Issue a user token signed by the account in `seed`.
pub fn user(
    subject: &str,
    seed: &str,
    issuer_account: Option<String>,
    opts: IssueOptions,
) -> anyhow::Result<()> {
    let mut claims = UserClaims::new(subject);
    claims.set_issuer(keys::public_key_from_seed(seed)?);
    if let Some(account) = issuer_account {
        claims.set_issuer_account(account);
    }
    if let Some(name) = &opts.name {
        claims.set_name(name);
    }
    claims.set_expires(opts.expires);

    let token = claims
        .encode(seed)
        .context("Failed to encode user token. Is the seed an account seed (SA...)?")?;
    emit(&claims, &token, opts.output)
}

fn emit(claims: &impl ClaimSet, token: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    info!(kind = %claims.kind(), subject = %claims.subject(), "issued token");

    if let Some(output_path) = output {
        fs::write(&output_path, token)?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Type:    {}", claims.kind());
        println!("  Subject: {}", claims.subject());
        println!("  Issuer:  {}", claims.issuer());
        if let Some(name) = claims.name() {
            println!("  Name:    {name}");
        }
        if claims.expires() > 0 {
            println!("  Expires: {}", claims.expires());
        }
    } else {
        println!("{token}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nkjwt::{ClaimKind, decode_account, decode_operator, decode_user};
    use tempfile::tempdir;

    fn seed(kind: ClaimKind) -> (String, String) {
        let kp = keys::generate(kind);
        (keys::seed_of(&kp).unwrap(), kp.public_key())
    }

    #[test]
    fn test_encode_hierarchy_to_files() {
        let dir = tempdir().unwrap();
        let (op_seed, op_pk) = seed(ClaimKind::Operator);
        let (acc_seed, acc_pk) = seed(ClaimKind::Account);
        let (_, usr_pk) = seed(ClaimKind::User);

        let op_path = dir.path().join("operator.jwt");
        operator(
            &op_seed,
            vec![],
            IssueOptions {
                name: Some("ops".to_string()),
                expires: 0,
                output: Some(op_path.clone()),
            },
        )
        .unwrap();
        let op = decode_operator(&fs::read_to_string(&op_path).unwrap()).unwrap();
        assert_eq!(op.subject(), op_pk);
        assert_eq!(op.name(), Some("ops"));

        let acc_path = dir.path().join("account.jwt");
        account(
            &acc_pk,
            &op_seed,
            vec![],
            IssueOptions {
                output: Some(acc_path.clone()),
                ..IssueOptions::default()
            },
        )
        .unwrap();
        let acc = decode_account(&fs::read_to_string(&acc_path).unwrap()).unwrap();
        assert_eq!(acc.issuer(), op_pk);

        let usr_path = dir.path().join("user.jwt");
        user(
            &usr_pk,
            &acc_seed,
            Some(acc_pk.clone()),
            IssueOptions {
                expires: 4_000_000_000,
                output: Some(usr_path.clone()),
                ..IssueOptions::default()
            },
        )
        .unwrap();
        let usr = decode_user(&fs::read_to_string(&usr_path).unwrap()).unwrap();
        assert_eq!(usr.issuer(), acc_pk);
        assert_eq!(usr.issuer_account(), Some(acc_pk.as_str()));
        assert_eq!(usr.expires(), 4_000_000_000);
    }

    #[test]
    fn test_encode_rejects_wrong_seed_kind() {
        let (acc_seed, _) = seed(ClaimKind::Account);
        let err = operator(&acc_seed, vec![], IssueOptions::default()).unwrap_err();
        assert!(err.to_string().contains("operator seed"));

        let (_, usr_pk) = seed(ClaimKind::User);
        let (op_seed, _) = seed(ClaimKind::Operator);
        assert!(user(&usr_pk, &op_seed, None, IssueOptions::default()).is_err());
    }
}
