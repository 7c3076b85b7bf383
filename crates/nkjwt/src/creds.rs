//! Decorated `.creds` files pairing a user JWT with its seed.

use crate::constants::CREDS_LINE_WIDTH;
use crate::error::{JwtError, Result};

const JWT_BEGIN: &str = "-----BEGIN NATS USER JWT-----";
const JWT_END: &str = "------END NATS USER JWT------";
const SEED_BEGIN: &str = "-----BEGIN USER NKEY SEED-----";
const SEED_END: &str = "------END USER NKEY SEED------";

const NOTICE: &str = "\
************************* IMPORTANT *************************
NKEY Seed printed below can be used to sign and prove identity.
NKEYs are sensitive and should be treated as secrets.";

const FOOTER: &str = "*************************************************************";

/// A user JWT and seed read back from a creds file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub jwt: String,
    pub seed: String,
}

/// Render a user JWT and seed in the creds file format.
pub fn format_user_config(jwt: &str, seed: &str) -> Result<String> {
    let jwt = jwt.trim();
    let seed = seed.trim();

    if jwt.is_empty() {
        return Err(JwtError::InvalidCredentials("JWT is empty".to_string()));
    }
    if !jwt.is_ascii() {
        return Err(JwtError::InvalidCredentials("JWT is not ASCII".to_string()));
    }
    if !seed.starts_with("SU") {
        return Err(JwtError::InvalidCredentials(
            "seed is not a user seed (expected 'SU' prefix)".to_string(),
        ));
    }

    let mut out = String::with_capacity(jwt.len() + seed.len() + 512);
    out.push_str(JWT_BEGIN);
    out.push('\n');
    for line in jwt.as_bytes().chunks(CREDS_LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(JWT_END);
    out.push_str("\n\n");
    out.push_str(NOTICE);
    out.push_str("\n\n");
    out.push_str(SEED_BEGIN);
    out.push('\n');
    out.push_str(seed);
    out.push('\n');
    out.push_str(SEED_END);
    out.push_str("\n\n");
    out.push_str(FOOTER);
    out.push('\n');
    Ok(out)
}

/// Extract the JWT and seed from creds text, joining wrapped JWT lines.
pub fn parse_user_config(text: &str) -> Result<UserCredentials> {
    let jwt: String = section(text, JWT_BEGIN, JWT_END)?.concat();
    let seed: String = section(text, SEED_BEGIN, SEED_END)?.concat();

    if jwt.is_empty() {
        return Err(JwtError::InvalidCredentials("JWT section is empty".to_string()));
    }
    if seed.is_empty() {
        return Err(JwtError::InvalidCredentials("seed section is empty".to_string()));
    }

    Ok(UserCredentials { jwt, seed })
}

fn section<'a>(text: &'a str, begin: &str, end: &str) -> Result<Vec<&'a str>> {
    let mut lines = text.lines().map(str::trim);

    if !lines.any(|line| line == begin) {
        return Err(JwtError::InvalidCredentials(format!("missing '{begin}'")));
    }

    let mut body = Vec::new();
    for line in lines {
        if line == end {
            return Ok(body);
        }
        if !line.is_empty() {
            body.push(line);
        }
    }
    Err(JwtError::InvalidCredentials(format!("missing '{end}'")))
}
