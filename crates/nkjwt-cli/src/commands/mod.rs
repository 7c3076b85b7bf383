//! CLI command implementations for nkjwt.

pub mod creds;
pub mod decode;
pub mod encode;
pub mod keys;
pub mod validate;
pub mod verify;

use crate::config::KeysConfig;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Read a value that is either a path to a file or the value itself.
pub(crate) fn read_value(value: &str) -> anyhow::Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(content.trim().to_string());
    }
    Ok(value.trim().to_string())
}

/// Resolve a seed from `--seed`, then from the config's `keys` section.
pub(crate) fn resolve_seed(seed: Option<String>, keys: &KeysConfig) -> anyhow::Result<String> {
    if let Some(seed) = seed {
        return read_value(&seed);
    }

    keys.resolve_seed()
        .context("Failed to read seed file")?
        .context("Seed not provided. Pass --seed <seed|path> or set keys.seed_env / keys.seed_file in nkjwt.yaml")
}

/// Parse a duration string like "24h", "7d", "30m" or "60s" into chrono::Duration.
pub(crate) fn parse_duration(s: &str) -> anyhow::Result<chrono::Duration> {
    let s = s.trim().to_lowercase();

    if let Some(hours) = s.strip_suffix('h') {
        let h: i64 = hours.parse()?;
        return Ok(chrono::Duration::hours(h));
    }
    if let Some(days) = s.strip_suffix('d') {
        let d: i64 = days.parse()?;
        return Ok(chrono::Duration::days(d));
    }
    if let Some(minutes) = s.strip_suffix('m') {
        let m: i64 = minutes.parse()?;
        return Ok(chrono::Duration::minutes(m));
    }
    if let Some(seconds) = s.strip_suffix('s') {
        let sec: i64 = seconds.parse()?;
        return Ok(chrono::Duration::seconds(sec));
    }

    // No suffix means hours
    let h: i64 = s.parse()?;
    Ok(chrono::Duration::hours(h))
}

/// Absolute expiry from `--expires <duration>` or `--expires-at <unix>`; 0 when neither.
pub(crate) fn resolve_expiry(
    expires: Option<&str>,
    expires_at: Option<i64>,
) -> anyhow::Result<i64> {
    if let Some(at) = expires_at {
        anyhow::ensure!(at > 0, "--expires-at must be a positive unix timestamp");
        return Ok(at);
    }
    match expires {
        Some(duration) => {
            let duration = parse_duration(duration)
                .with_context(|| format!("Invalid duration: {duration}"))?;
            anyhow::ensure!(duration > chrono::Duration::zero(), "--expires must be positive");
            Ok((chrono::Utc::now() + duration).timestamp())
        }
        None => Ok(0),
    }
}
