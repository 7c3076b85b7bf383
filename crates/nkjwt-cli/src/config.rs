//! `nkjwt.yaml` configuration.

use anyhow::Context;
use nkjwt::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "nkjwt.yaml";

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NkjwtConfig {
    /// Checks run by `nkjwt validate`.
    pub validation: ValidationOptions,

    /// Where to find a signing seed when `--seed` is omitted.
    pub keys: KeysConfig,
}

/// Seed lookup for the encode and creds commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Environment variable holding the seed.
    #[serde(default)]
    pub seed_env: Option<String>,

    /// File holding the seed.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl KeysConfig {
    /// Resolve the seed from the environment, then from the seed file.
    pub fn resolve_seed(&self) -> Result<Option<String>, std::io::Error> {
        if let Some(env_var) = &self.seed_env
            && let Ok(seed) = std::env::var(env_var)
        {
            return Ok(Some(seed.trim().to_string()));
        }

        if let Some(path) = &self.seed_file
            && path.exists()
        {
            let seed = fs::read_to_string(path)?;
            return Ok(Some(seed.trim().to_string()));
        }

        Ok(None)
    }
}

impl NkjwtConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load the explicit config, else `nkjwt.yaml` if present, else defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display())),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)
                    .with_context(|| format!("Failed to load config: {DEFAULT_CONFIG_FILE}"))
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = NkjwtConfig::from_yaml("{}").unwrap();
        assert_eq!(config.validation, ValidationOptions::default());
        assert!(config.keys.seed_env.is_none());
        assert!(config.keys.seed_file.is_none());
    }

    #[test]
    fn test_partial_validation_section() {
        let yaml = r#"
validation:
  check_issuer_chain: true
  clock_skew_seconds: 60
keys:
  seed_file: ./keys/account.seed
"#;
        let config = NkjwtConfig::from_yaml(yaml).unwrap();
        assert!(config.validation.check_issuer_chain);
        assert!(config.validation.check_expiration);
        assert!(!config.validation.check_not_before);
        assert_eq!(config.validation.clock_skew_seconds, 60);
        assert_eq!(
            config.keys.seed_file.as_deref(),
            Some(Path::new("./keys/account.seed"))
        );
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        assert!(NkjwtConfig::from_yaml("validation: [1, 2").is_err());
        assert!(NkjwtConfig::from_yaml("validation:\n  clock_skew_seconds: soon").is_err());
    }

    #[test]
    fn test_resolve_seed_from_env_then_file() {
        let dir = tempdir().unwrap();
        let seed_path = dir.path().join("user.seed");
        fs::write(&seed_path, "SUFILESEED\n").unwrap();

        let keys = KeysConfig {
            seed_env: Some("NKJWT_TEST_SEED_UNSET".to_string()),
            seed_file: Some(seed_path),
        };
        assert_eq!(keys.resolve_seed().unwrap().as_deref(), Some("SUFILESEED"));

        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("NKJWT_TEST_SEED_SET", "SUENVSEED");
        }
        let keys = KeysConfig {
            seed_env: Some("NKJWT_TEST_SEED_SET".to_string()),
            ..keys
        };
        assert_eq!(keys.resolve_seed().unwrap().as_deref(), Some("SUENVSEED"));
    }

    #[test]
    fn test_resolve_seed_none() {
        let keys = KeysConfig {
            seed_env: None,
            seed_file: Some(PathBuf::from("/nonexistent/nkjwt.seed")),
        };
        assert!(keys.resolve_seed().unwrap().is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "validation:\n  check_signature: false\n").unwrap();

        let config = NkjwtConfig::load(Some(path.as_path())).unwrap();
        assert!(!config.validation.check_signature);

        let missing = dir.path().join("missing.yaml");
        let err = NkjwtConfig::load(Some(missing.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
