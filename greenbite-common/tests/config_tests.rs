//! Unit tests for configuration loading and graceful degradation
//!
//! Tests cover:
//! - Missing TOML files SHALL NOT cause termination (defaults are used)
//! - Malformed TOML is reported as a configuration error
//! - Priority order for config path resolution (CLI → ENV → platform dir)
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate GREENBITE_CONFIG are marked with #[serial].

use greenbite_common::config::{
    load_toml_config, resolve_config_path, ConfigOrigin, ScoringPolicy, SimilarityMetric, TomlConfig,
    CONFIG_ENV_VAR,
};
use greenbite_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[test]
fn test_missing_config_file_uses_defaults() {
    let config = load_toml_config(Path::new("/nonexistent/greenbite/greenbite.toml"))
        .expect("missing config must not be fatal");

    let defaults = TomlConfig::default();
    assert_eq!(config.port, defaults.port);
    assert_eq!(config.matching, defaults.matching);
}

#[test]
fn test_config_origin() {
    let file = NamedTempFile::new().unwrap();
    let missing = PathBuf::from("/nonexistent/greenbite/greenbite.toml");

    assert_eq!(
        ConfigOrigin::of(Some(file.path())),
        ConfigOrigin::File(file.path().to_path_buf())
    );
    assert_eq!(
        ConfigOrigin::of(Some(&missing)),
        ConfigOrigin::MissingFile(missing.clone())
    );
    assert_eq!(ConfigOrigin::of(None), ConfigOrigin::Defaults);
}

#[test]
fn test_full_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
emissions_path = "/data/Food_Product_Emissions.csv"
recipes_path = "/data/filtered_recipes_1m.csv.gz"
bind_addr = "0.0.0.0"
port = 10000

[logging]
level = "debug"

[matching]
ingredient_threshold = 72
dish_threshold = 85
recipe_limit = 3
metric = "levenshtein"

[scoring]
policy = "linear"
remote_url = "http://127.0.0.1:8000/predict"
"#
    )
    .unwrap();

    let config = load_toml_config(file.path()).unwrap();

    assert_eq!(
        config.emissions_path,
        Some(PathBuf::from("/data/Food_Product_Emissions.csv"))
    );
    assert_eq!(config.bind_addr, "0.0.0.0");
    assert_eq!(config.port, 10000);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.matching.ingredient_threshold, 72);
    assert_eq!(config.matching.dish_threshold, 85);
    assert_eq!(config.matching.recipe_limit, 3);
    assert_eq!(config.matching.metric, SimilarityMetric::Levenshtein);
    assert_eq!(config.scoring.policy, ScoringPolicy::Linear);
    assert_eq!(
        config.scoring.remote_url.as_deref(),
        Some("http://127.0.0.1:8000/predict")
    );
    assert_eq!(config.scoring.remote_timeout_secs, 5);
}

#[test]
fn test_malformed_config_is_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_out_of_range_threshold_is_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[matching]\ningredient_threshold = 150").unwrap();

    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_arg_takes_precedence() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/greenbite-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/greenbite-cli.toml")), CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/greenbite-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/greenbite-env.toml");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/greenbite-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);
    assert_ne!(resolved, Some(PathBuf::from("   ")));

    env::remove_var(CONFIG_ENV_VAR);
}
