//! `nkjwt creds` - Package a user token and its seed as a `.creds` file.

use anyhow::Context;
use nkjwt::{ClaimSet, decode_user, format_user_config, keys};
use std::fs;
use std::path::PathBuf;

/// Build the creds text for a user token and the user's own seed.
pub fn build(jwt: &str, seed: &str) -> anyhow::Result<String> {
    let jwt = super::read_value(jwt)?;

    let claims = decode_user(&jwt).context("Expected a user token")?;
    let public_key = keys::public_key_from_seed(seed)?;
    anyhow::ensure!(
        public_key == claims.subject(),
        "Seed belongs to {public_key}, but the token was issued to {}",
        claims.subject()
    );

    Ok(format_user_config(&jwt, seed)?)
}

/// Write creds to `output`, or print them.
pub fn creds(jwt: &str, seed: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let text = build(jwt, seed)?;

    if let Some(output_path) = output {
        fs::write(&output_path, &text)?;
        println!("✔ Credentials written to: {}", output_path.display());
        println!();
        println!("⚠️  The file contains the user seed. Keep it secure!");
    } else {
        print!("{text}");
    }

    Ok(())
}
