//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for stitchkit
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub data: DataConfig,
    pub gsrs: GsrsConfig,
    pub stitcher: StitcherConfig,
    pub regression: RegressionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    pub read_timeout: u64,
    pub max_retries: u32,
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            read_timeout: 60,
            max_retries: 3,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// FDA UNII Names file
    pub unii_names: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            unii_names: PathBuf::from("UNII_Names.txt"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GsrsConfig {
    pub base_url: String,
}

impl Default for GsrsConfig {
    fn default() -> Self {
        Self {
            base_url: stitchkit_resolve::gsrs::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StitcherConfig {
    /// Site shorthand or URL; `${VAR}` reads it from the environment
    #[serde(deserialize_with = "deserialize_env_var")]
    pub site: Option<String>,
    /// Page size
    pub top: usize,
    pub max_records: usize,
}

impl Default for StitcherConfig {
    fn default() -> Self {
        Self {
            site: std::env::var("STITCHER_SITE").ok(),
            top: 10,
            max_records: 300_000,
        }
    }
}

impl StitcherConfig {
    pub fn site_or_default(&self) -> &str {
        self.site.as_deref().unwrap_or("prod")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    pub gsrs_source_prefix: String,
    pub pme_source: String,
    pub drugbank_source: String,
    pub orphan_sources: Vec<String>,
    pub nme_lists: Vec<NmeListConfig>,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        let defaults = stitchkit_stitcher::Config::default();
        Self {
            gsrs_source_prefix: defaults.gsrs_source_prefix,
            pme_source: defaults.pme_source,
            drugbank_source: defaults.drugbank_source,
            orphan_sources: defaults.orphan_sources,
            nme_lists: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NmeListConfig {
    pub name: String,
    pub path: PathBuf,
    /// 0-based UNII column
    #[serde(default)]
    pub column: usize,
}

impl From<&NmeListConfig> for stitchkit_stitcher::NmeList {
    fn from(c: &NmeListConfig) -> Self {
        Self {
            name: c.name.clone(),
            path: c.path.clone(),
            column: c.column,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./stitchkit.toml (current directory)
    /// 2. ~/.config/stitchkit/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("stitchkit.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "stitchkit") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.http.read_timeout, 60);
        assert_eq!(config.stitcher.top, 10);
        assert_eq!(config.regression.gsrs_source_prefix, "G-SRS");
        assert_eq!(config.regression.orphan_sources.len(), 6);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("STITCHKIT_TEST_SITE", "dev");
        assert_eq!(
            expand_env_var("${STITCHKIT_TEST_SITE}"),
            Some("dev".to_string())
        );
        std::env::remove_var("STITCHKIT_TEST_SITE");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("local"), Some("local".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[http]
max_retries = 5
accept_invalid_certs = true

[stitcher]
site = "https://stitcher.internal/"
top = 50

[[regression.nme_lists]]
name = "nmeClashes2"
path = "FDA-NMEs-2018-08-07.txt"
column = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.read_timeout, 60);
        assert!(config.http.accept_invalid_certs);
        assert_eq!(config.stitcher.site_or_default(), "https://stitcher.internal/");
        assert_eq!(config.stitcher.top, 50);
        assert_eq!(config.regression.nme_lists[0].column, 3);
        assert_eq!(config.regression.pme_source, config.regression.orphan_sources[0]);
    }
}
