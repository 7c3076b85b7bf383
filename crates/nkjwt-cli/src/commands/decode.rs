//! `nkjwt decode` - Print a token's claims without checking its signature.

use anyhow::Context;
use nkjwt::Claims;

/// Decode a token of any kind.
pub fn decode(token: &str) -> anyhow::Result<Claims> {
    let token = super::read_value(token)?;
    nkjwt::decode(&token).context("Failed to decode token")
}

/// Decode a token and print its claims as pretty JSON.
pub fn run(token: &str) -> anyhow::Result<()> {
    let claims = decode(token)?;
    println!("{}", serde_json::to_string_pretty(&claims)?);
    Ok(())
}
