//! Configuration types for Argus

use crate::ArgusError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ancestry: AncestryConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Number of top vision results considered for the common ancestor
    #[serde(default = "default_ancestor_window")]
    pub ancestor_window: usize,
    /// Minimum share of the window's vision-score mass an ancestor must carry
    #[serde(default = "default_ancestor_threshold")]
    pub ancestor_threshold: f64,
    /// Coarsest rank level the common ancestor may have (33 = superfamily)
    #[serde(default = "default_rank_level_cutoff")]
    pub rank_level_cutoff: f64,
    /// Search radius for nearby occurrences, in kilometers
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    /// Half-width of the observed-on date window, in days
    #[serde(default = "default_day_window")]
    pub default_day_window: i64,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestryConfig {
    /// Model taxonomy file listing one `label: taxon_id` pair per line
    #[serde(default)]
    pub taxa_file_path: Option<String>,
    /// Number of taxon ids fetched per ancestry batch
    #[serde(default = "default_load_chunk_size")]
    pub load_chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Image classifier endpoint
    #[serde(default = "default_classifier_url")]
    pub classifier_url: String,
    /// Base URL for taxon detail and ancestry lookups
    #[serde(default = "default_taxa_url")]
    pub taxa_url: String,
    /// Base URL for nearby occurrence counts
    #[serde(default = "default_occurrences_url")]
    pub occurrences_url: String,
    #[serde(default = "default_classifier_timeout_secs")]
    pub classifier_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Inserts are skipped once the cache holds this many entries
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

// Default value functions
fn default_ancestor_window() -> usize {
    10
}
fn default_ancestor_threshold() -> f64 {
    92.0
}
fn default_rank_level_cutoff() -> f64 {
    33.0
}
fn default_radius_km() -> f64 {
    100.0
}
fn default_day_window() -> i64 {
    45
}
fn default_page_size() -> usize {
    10
}
fn default_max_page_size() -> usize {
    100
}
fn default_load_chunk_size() -> usize {
    500
}
fn default_classifier_url() -> String {
    "http://localhost:6006/".to_string()
}
fn default_taxa_url() -> String {
    "http://localhost:4000".to_string()
}
fn default_occurrences_url() -> String {
    "http://localhost:4000".to_string()
}
fn default_classifier_timeout_secs() -> u64 {
    5
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_cache_enabled() -> bool {
    true
}
fn default_cache_max_entries() -> usize {
    100_000
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            ancestor_window: default_ancestor_window(),
            ancestor_threshold: default_ancestor_threshold(),
            rank_level_cutoff: default_rank_level_cutoff(),
            default_radius_km: default_radius_km(),
            default_day_window: default_day_window(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for AncestryConfig {
    fn default() -> Self {
        Self {
            taxa_file_path: None,
            load_chunk_size: default_load_chunk_size(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            classifier_url: default_classifier_url(),
            taxa_url: default_taxa_url(),
            occurrences_url: default_occurrences_url(),
            classifier_timeout_secs: default_classifier_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_entries: default_cache_max_entries(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config, ArgusError> {
    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents)
        .map_err(|e| ArgusError::Configuration(format!("failed to parse {}: {}", path.display(), e)))
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &Path) -> Result<(), ArgusError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| ArgusError::Configuration(format!("failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scoring.ancestor_window, 10);
        assert_eq!(config.scoring.ancestor_threshold, 92.0);
        assert_eq!(config.scoring.rank_level_cutoff, 33.0);
        assert_eq!(config.scoring.default_radius_km, 100.0);
        assert_eq!(config.scoring.default_day_window, 45);
        assert_eq!(config.ancestry.load_chunk_size, 500);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scoring]
            ancestor_threshold = 80.0
        "#,
        )
        .unwrap();
        assert_eq!(config.scoring.ancestor_threshold, 80.0);
        assert_eq!(config.scoring.ancestor_window, 10);
        assert_eq!(config.services.classifier_timeout_secs, 5);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argus.toml");

        let mut config = Config::default();
        config.scoring.default_page_size = 25;
        config.ancestry.taxa_file_path = Some("/data/taxa.txt".to_string());

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.scoring.default_page_size, 25);
        assert_eq!(
            loaded.ancestry.taxa_file_path.as_deref(),
            Some("/data/taxa.txt")
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/argus.toml"));
        assert!(result.is_err());
    }
}
