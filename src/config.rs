use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::filter::FilterConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .bugfix-stats.toml.
/// All fields are optional — the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Repository to collect from, as `owner/repo`.
    pub repo: String,
    /// Upper bound on collected records per run.
    pub max_records: usize,
    /// How many top contributors count as core members.
    pub core_top_n: usize,
    /// Issue labels to collect.
    pub labels: Vec<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            repo: "django/django".to_string(),
            max_records: 500,
            core_top_n: 20,
            labels: vec!["bug".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Months with fewer fixes than this are dropped from the monthly series.
    pub min_fixes_per_month: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_fixes_per_month: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for exported tables.
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration from .bugfix-stats.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".bugfix-stats.toml");
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert_eq!(config.github.repo, "django/django");
        assert_eq!(config.github.max_records, 500);
        assert_eq!(config.github.core_top_n, 20);
        assert_eq!(config.analysis.min_fixes_per_month, 10);
        assert_eq!(config.filter.automation_prefix, "[Stitch Remote SWE]");
        assert_eq!(config.output.root, PathBuf::from("."));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r##"
[github]
repo = "rust-lang/rust"
max_records = 50

[filter]
test_markers = ["#12345"]

[analysis]
min_fixes_per_month = 3
"##;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github.repo, "rust-lang/rust");
        assert_eq!(config.github.max_records, 50);
        assert_eq!(config.github.core_top_n, 20);
        assert_eq!(config.filter.test_markers, vec!["#12345".to_string()]);
        assert_eq!(config.filter.automation_prefix, "[Stitch Remote SWE]");
        assert_eq!(config.analysis.min_fixes_per_month, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".bugfix-stats.toml");
        std::fs::write(&path, "[output]\nroot = \"reports\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output.root, PathBuf::from("reports"));
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[github\nrepo = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
