//! Configuration loading from enumcover.toml.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{EnumcoverError, EnumcoverResult, IoResultExt};

/// Name of the optional configuration file at a crate root.
pub const CONFIG_FILE: &str = "enumcover.toml";

/// Main configuration structure for enumcover.toml.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EnumcoverConfig {
    /// Extra directory names to skip while gathering sources.
    pub exclude: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl EnumcoverConfig {
    /// Directory names to exclude, in addition to the built-in ones.
    pub fn excluded_dirs(&self) -> Vec<&str> {
        self.exclude
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect()
    }

    /// Whether the configured output format is JSON.
    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }

    /// Merge extra excludes (e.g. from the command line) into this config.
    pub fn with_excludes(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        let mut all = self.exclude.take().unwrap_or_default();
        all.extend(extra);
        self.exclude = Some(all);
        self
    }
}

/// Loads configuration from enumcover.toml if it exists.
pub fn load_config(root: &Path) -> EnumcoverResult<Option<EnumcoverConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    let cfg = toml::from_str(&content)
        .map_err(|e| EnumcoverError::config(&path, format!("Invalid {}: {}", CONFIG_FILE, e)))?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg: EnumcoverConfig = toml::from_str(
            r#"
exclude = ["generated", "vendor"]

[output]
format = "JSON"
"#,
        )
        .unwrap();
        assert_eq!(cfg.excluded_dirs(), vec!["generated", "vendor"]);
        assert!(cfg.wants_json());
    }

    #[test]
    fn test_empty_config_defaults() {
        let cfg: EnumcoverConfig = toml::from_str("").unwrap();
        assert!(cfg.excluded_dirs().is_empty());
        assert!(!cfg.wants_json());
    }

    #[test]
    fn test_with_excludes_merges() {
        let cfg = EnumcoverConfig {
            exclude: Some(vec!["a".to_string()]),
            output: None,
        }
        .with_excludes(vec!["b".to_string()]);
        assert_eq!(cfg.excluded_dirs(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = std::env::temp_dir().join("enumcover_config_missing_test");
        std::fs::create_dir_all(&dir).unwrap();
        let _ = std::fs::remove_file(dir.join(CONFIG_FILE));
        assert!(load_config(&dir).unwrap().is_none());
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let dir = std::env::temp_dir().join("enumcover_config_invalid_test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), "exclude = 3").unwrap();
        let err = load_config(&dir).unwrap_err();
        assert!(matches!(err, EnumcoverError::Config { .. }));
    }
}
