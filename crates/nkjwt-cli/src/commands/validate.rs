//! `nkjwt validate` - Validate a token, or a root-first chain of tokens.

use anyhow::Context;
use nkjwt::{ValidationOptions, validate_chain};

/// Preset chosen on the command line, overriding the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Config,
    Strict,
    Permissive,
}

/// Options for a preset, falling back to the config's `validation` section.
pub fn options_for(preset: Preset, configured: ValidationOptions) -> ValidationOptions {
    match preset {
        Preset::Config => configured,
        Preset::Strict => ValidationOptions::strict(),
        Preset::Permissive => ValidationOptions::permissive(),
    }
}

/// Validate one token alone, or several as a chain.
pub fn validate(tokens: &[String], opts: &ValidationOptions) -> anyhow::Result<()> {
    anyhow::ensure!(!tokens.is_empty(), "No tokens given");

    let tokens = tokens
        .iter()
        .map(|t| super::read_value(t))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if let [token] = tokens.as_slice() {
        nkjwt::validate(token, opts).context("Token failed validation")?;
        println!("✔ Token is valid");
    } else {
        validate_chain(&tokens, opts).context("Chain failed validation")?;
        println!("✔ Chain of {} tokens is valid", tokens.len());
    }

    Ok(())
}
