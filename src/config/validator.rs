use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Warns about configuration keys that have no effect.
pub struct ConfigValidator {
    /// Every `section.key` the configuration understands
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = [
            "core",
            "core.watched_root",
            "core.state_path",
            "core.backup_parent",
            "core.mmap_threshold",
            "filter",
            "filter.system_roots",
            "filter.exclude_patterns",
            "filter.extra_patterns",
        ]
        .into_iter()
        .collect();

        Self { known_fields }
    }

    /// Returns the dotted keys in `content` that are not recognized.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML.
    pub fn unknown_fields(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Value = toml::from_str(content)?;
        let mut unknown = Vec::new();
        self.check_table(&parsed, "", &mut unknown);
        Ok(unknown)
    }

    /// Validate a configuration file and print a warning for each unknown key
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let unknown = self.unknown_fields(&content)?;

        if !unknown.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for field in unknown {
                eprintln!("  Unknown configuration field: {}", field.yellow());
            }
            eprintln!();
        }

        Ok(())
    }

    fn check_table(&self, value: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        if let toml::Value::Table(map) = value {
            for (key, value) in map {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };

                if !self.known_fields.contains(full_key.as_str()) {
                    unknown.push(full_key);
                } else if let toml::Value::Table(_) = value {
                    self.check_table(value, &full_key, unknown);
                }
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
