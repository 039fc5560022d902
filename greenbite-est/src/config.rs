//! Dataset source resolution for greenbite-est
//!
//! Each dataset is located through a fixed priority:
//! 1. Command line (or its environment variable, merged by clap)
//! 2. `*_path` in the TOML config
//! 3. `*_url` in the TOML config, cached under `cache_dir`
//! 4. Built-in relative path under `./datasets`

use crate::services::dataset_fetcher::DatasetSource;
use greenbite_common::config::TomlConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The two datasets the service loads at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Recipes,
    Emissions,
}

impl DatasetKind {
    pub fn label(self) -> &'static str {
        match self {
            DatasetKind::Recipes => "recipes",
            DatasetKind::Emissions => "emissions",
        }
    }

    /// Relative path used when nothing is configured
    pub fn default_path(self) -> PathBuf {
        match self {
            DatasetKind::Recipes => PathBuf::from("datasets/filtered_recipes_1m.csv.gz"),
            DatasetKind::Emissions => PathBuf::from("datasets/Food_Product_Emissions.csv"),
        }
    }

    fn cache_file_name(self) -> &'static str {
        match self {
            DatasetKind::Recipes => "recipes.csv.gz",
            DatasetKind::Emissions => "emissions.csv",
        }
    }

    fn toml_path(self, toml: &TomlConfig) -> Option<&PathBuf> {
        match self {
            DatasetKind::Recipes => toml.recipes_path.as_ref(),
            DatasetKind::Emissions => toml.emissions_path.as_ref(),
        }
    }

    fn toml_url(self, toml: &TomlConfig) -> Option<&str> {
        let url = match self {
            DatasetKind::Recipes => toml.recipes_url.as_deref(),
            DatasetKind::Emissions => toml.emissions_url.as_deref(),
        };
        url.filter(|u| !u.trim().is_empty())
    }
}

/// Pick the source for one dataset
pub fn resolve_dataset_source(
    kind: DatasetKind,
    cli_path: Option<&Path>,
    toml: &TomlConfig,
) -> DatasetSource {
    let toml_path = kind.toml_path(toml);
    let toml_url = kind.toml_url(toml);

    let configured = [cli_path.is_some(), toml_path.is_some(), toml_url.is_some()]
        .iter()
        .filter(|&&set| set)
        .count();
    if configured > 1 {
        warn!(
            dataset = kind.label(),
            "Dataset configured in multiple places, using highest priority source"
        );
    }

    if let Some(path) = cli_path {
        info!(dataset = kind.label(), path = %path.display(), "Dataset from command line/environment");
        return DatasetSource::Local(path.to_path_buf());
    }

    if let Some(path) = toml_path {
        info!(dataset = kind.label(), path = %path.display(), "Dataset from TOML config");
        return DatasetSource::Local(path.clone());
    }

    if let Some(url) = toml_url {
        let cache_dir = toml.cache_dir_or_default();
        info!(
            dataset = kind.label(),
            url = %url,
            cache_dir = %cache_dir.display(),
            "Dataset from remote URL"
        );
        return DatasetSource::remote(url, &cache_dir, kind.cache_file_name());
    }

    let path = kind.default_path();
    info!(dataset = kind.label(), path = %path.display(), "Dataset from default location");
    DatasetSource::Local(path)
}
