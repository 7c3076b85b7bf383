//! Key management commands.
//!
//! `nkjwt keys generate` - Generate a new operator, account or user keypair.

use nkjwt::ClaimKind;
use nkjwt::keys;
use std::fs;
use std::path::PathBuf;

/// Generate a new keypair of the given kind.
pub fn generate(kind: ClaimKind, output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = keys::generate(kind);
    let seed = keys::seed_of(&keypair)?;
    let public_key = keypair.public_key();

    if let Some(output_dir) = output {
        fs::create_dir_all(&output_dir)?;

        let seed_path = output_dir.join(format!("{kind}.seed"));
        let public_path = output_dir.join(format!("{kind}.pub"));

        fs::write(&seed_path, &seed)?;
        fs::write(&public_path, &public_key)?;

        println!("✔ Generated {kind} keypair:");
        println!("  Seed:       {}", seed_path.display());
        println!("  Public key: {}", public_path.display());
        println!();
        println!("⚠️  Keep your seed secure! Never commit it to version control.");
    } else {
        println!("Seed (keep secure!):");
        println!("{seed}");
        println!();
        println!("Public key:");
        println!("{public_key}");
        println!();
        println!("Use --output <dir> to save keys to files.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generate_keys_to_files() {
        let dir = tempdir().unwrap();
        generate(ClaimKind::Account, Some(dir.path().to_path_buf())).unwrap();

        let seed = fs::read_to_string(dir.path().join("account.seed")).unwrap();
        let public_key = fs::read_to_string(dir.path().join("account.pub")).unwrap();

        assert!(seed.starts_with("SA"));
        assert!(public_key.starts_with('A'));
        assert_eq!(keys::public_key_from_seed(&seed).unwrap(), public_key);
    }
}
