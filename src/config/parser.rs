use super::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Reads and validates a TOML configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content is invalid.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parses and validates configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.core.mmap_threshold == 0 {
        anyhow::bail!("mmap_threshold must be at least 1 byte");
    }

    if config.core.state_path.as_os_str().is_empty() {
        anyhow::bail!("state_path cannot be empty");
    }

    if let Some(root) = &config.core.watched_root
        && root.as_os_str().is_empty()
    {
        anyhow::bail!("watched_root cannot be empty");
    }

    let patterns = config
        .filter
        .exclude_patterns
        .iter()
        .chain(&config.filter.extra_patterns);
    for pattern in patterns {
        if pattern.trim().is_empty() {
            anyhow::bail!("Exclusion patterns cannot be empty");
        }
        if pattern.contains('*') {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern: {pattern}"))?;
        }
    }

    Ok(())
}
