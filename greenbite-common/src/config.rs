//! Configuration loading and config file resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "GREENBITE_CONFIG";

/// Service configuration loaded from TOML
///
/// Every field has a default so a partial (or absent) file still yields a
/// usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Local recipe dataset (CSV or CSV.gz)
    pub recipes_path: Option<PathBuf>,
    /// Local emissions reference dataset (CSV or CSV.gz)
    pub emissions_path: Option<PathBuf>,
    /// Remote recipe dataset, downloaded into `cache_dir` when no local path is set
    pub recipes_url: Option<String>,
    /// Remote emissions dataset, downloaded into `cache_dir` when no local path is set
    pub emissions_url: Option<String>,
    /// Download cache for remote datasets
    pub cache_dir: Option<PathBuf>,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Port the HTTP server listens on
    pub port: u16,
    pub logging: LoggingConfig,
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            recipes_path: None,
            emissions_path: None,
            recipes_url: None,
            emissions_url: None,
            cache_dir: None,
            bind_addr: "127.0.0.1".to_string(),
            port: 5000,
            logging: LoggingConfig::default(),
            matching: MatchingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Download cache directory, falling back to the platform cache dir
    pub fn cache_dir_or_default(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|d| d.join("greenbite"))
                .unwrap_or_else(|| PathBuf::from("./greenbite_cache"))
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing level ("trace", "debug", "info", "warn", "error")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Similarity thresholds and candidate limits (0-100 similarity scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum similarity for the approximate ingredient match step
    pub ingredient_threshold: u8,
    /// Minimum similarity for a recipe title to become a candidate
    pub dish_threshold: u8,
    /// Maximum number of distinct recipe titles retained per search
    pub recipe_limit: usize,
    /// Similarity metric used for both dish titles and ingredients
    pub metric: SimilarityMetric,
}

/// Approximate string similarity metric
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Order-insensitive token-set comparison
    #[default]
    TokenSet,
    /// Whole-string normalized Levenshtein
    Levenshtein,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            ingredient_threshold: 70,
            dish_threshold: 80,
            recipe_limit: 5,
            metric: SimilarityMetric::TokenSet,
        }
    }
}

impl MatchingConfig {
    /// Reject thresholds outside 0..=100 and a zero candidate limit
    pub fn validate(&self) -> Result<()> {
        if self.ingredient_threshold > 100 {
            return Err(Error::Config(format!(
                "ingredient_threshold must be within 0..=100, got {}",
                self.ingredient_threshold
            )));
        }
        if self.dish_threshold > 100 {
            return Err(Error::Config(format!(
                "dish_threshold must be within 0..=100, got {}",
                self.dish_threshold
            )));
        }
        if self.recipe_limit == 0 {
            return Err(Error::Config("recipe_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Sustainability scoring policy
///
/// Exactly one policy is active per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    /// Banded step table (1.0-5.0 in half steps)
    #[default]
    Step,
    /// Continuous interpolation between 0.1 and 10.0 kg CO2e
    Linear,
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub policy: ScoringPolicy,
    /// Optional remote scoring service (POST endpoint)
    pub remote_url: Option<String>,
    /// Request timeout for the remote scorer
    pub remote_timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            policy: ScoringPolicy::Step,
            remote_url: None,
            remote_timeout_secs: 5,
        }
    }
}

/// Config file resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory (`<config_dir>/greenbite/greenbite.toml`) if it exists
///
/// Returns `None` when no source names a file; callers then run on defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|p| p.exists())
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("greenbite").join("greenbite.toml"))
}

/// Where the running configuration came from
///
/// Config loading happens before logging is set up, so binaries report the
/// origin once the subscriber exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// A path was named but no file exists there; defaults are in use
    MissingFile(PathBuf),
    Defaults,
}

impl ConfigOrigin {
    pub fn of(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p.exists() => ConfigOrigin::File(p.to_path_buf()),
            Some(p) => ConfigOrigin::MissingFile(p.to_path_buf()),
            None => ConfigOrigin::Defaults,
        }
    }

    pub fn log(&self) {
        match self {
            ConfigOrigin::File(p) => info!("Config: {}", p.display()),
            ConfigOrigin::MissingFile(p) => {
                warn!("Config file {} not found, using defaults", p.display())
            }
            ConfigOrigin::Defaults => info!("No config file, using defaults"),
        }
    }
}

/// Load TOML configuration
///
/// A missing file is not fatal: a warning is logged and defaults are used.
/// A file that exists but does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.matching.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
