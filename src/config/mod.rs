//! Ranking configuration and the per-hint configuration registry.
//!
//! ## Example
//!
//! ```ignore
//! let registry = ConfigurationRegistry::from_json(r#"{
//!     "comments": { "scale": 10, "store_zero": false }
//! }"#)?;
//! let config = registry.resolve("comments");
//! assert_eq!(config.scale, 10);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::RankingError;

/// Storage hint of the index-backed ranking manager.
pub const INDEX_STORAGE_HINT: &str = "index";

/// Policy of a ranking manager. Not mutated once the manager is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfiguration {
    /// Upper bound of a vote, the lower bound is always 0.
    pub scale: u32,
    /// Whether a vote of 0 is stored, or treated as "no vote".
    pub store_zero: bool,
    /// Whether the average rank is maintained alongside the votes.
    pub store_average: bool,
    /// Whether the votes live in a store partition named after the manager.
    pub has_dedicated_store: bool,
    /// Which manager implementation backs this configuration.
    pub storage_hint: String,
}

impl Default for RankingConfiguration {
    fn default() -> Self {
        Self {
            scale: 5,
            store_zero: true,
            store_average: true,
            has_dedicated_store: false,
            storage_hint: INDEX_STORAGE_HINT.to_string(),
        }
    }
}

impl RankingConfiguration {
    pub fn from_json(json: &str) -> Result<Self, RankingError> {
        serde_json::from_str(json).map_err(|e| RankingError::Configuration(e.to_string()))
    }
}

/// Configurations keyed by manager hint, with a fallback default.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationRegistry {
    default: RankingConfiguration,
    configurations: HashMap<String, RankingConfiguration>,
}

impl ConfigurationRegistry {
    pub fn new(default: RankingConfiguration) -> Self {
        Self {
            default,
            configurations: HashMap::new(),
        }
    }

    /// Parse a JSON object mapping hints to (possibly partial) configurations.
    pub fn from_json(json: &str) -> Result<Self, RankingError> {
        let configurations: HashMap<String, RankingConfiguration> =
            serde_json::from_str(json).map_err(|e| RankingError::Configuration(e.to_string()))?;
        Ok(Self {
            default: RankingConfiguration::default(),
            configurations,
        })
    }

    pub fn register(&mut self, hint: impl Into<String>, configuration: RankingConfiguration) {
        self.configurations.insert(hint.into(), configuration);
    }

    pub fn contains(&self, hint: &str) -> bool {
        self.configurations.contains_key(hint)
    }

    /// The configuration registered under `hint`, or the default one.
    pub fn resolve(&self, hint: &str) -> &RankingConfiguration {
        self.configurations.get(hint).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let config = RankingConfiguration::default();
        assert_eq!(config.scale, 5);
        assert!(config.store_zero);
        assert!(config.store_average);
        assert!(!config.has_dedicated_store);
        assert_eq!(config.storage_hint, INDEX_STORAGE_HINT);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = RankingConfiguration::from_json(r#"{ "scale": 10, "store_zero": false }"#)
            .unwrap();
        assert_eq!(config.scale, 10);
        assert!(!config.store_zero);
        assert!(config.store_average);
        assert_eq!(config.storage_hint, INDEX_STORAGE_HINT);
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = RankingConfiguration::from_json("{ scale: ").unwrap_err();
        assert!(matches!(err, RankingError::Configuration(_)));
    }

    #[test]
    fn registry_resolves_registered_or_default() {
        let registry = ConfigurationRegistry::from_json(
            r#"{ "likes": { "scale": 1, "store_average": false } }"#,
        )
        .unwrap();

        assert!(registry.contains("likes"));
        assert_eq!(registry.resolve("likes").scale, 1);
        assert!(!registry.resolve("likes").store_average);
        assert_eq!(registry.resolve("unknown"), &RankingConfiguration::default());
    }
}
