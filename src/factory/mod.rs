//! Per-hint ranking manager instances.
//!
//! The first request for a hint resolves its configuration (or the default
//! one), builds a manager with the builder registered under the
//! configuration's storage hint, and caches it. Later requests for the same
//! hint return the cached instance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::config::{ConfigurationRegistry, RankingConfiguration, INDEX_STORAGE_HINT};
use crate::events::EventSink;
use crate::index::IndexProvider;
use crate::lock::LockError;
use crate::manager::{IndexRankingManager, RankingManager};
use crate::RankingError;

/// Builds a manager for a hint and its resolved configuration.
pub type ManagerBuilder = Box<
    dyn Fn(&str, RankingConfiguration) -> Result<Arc<dyn RankingManager>, RankingError>
        + Send
        + Sync,
>;

/// Provides ranking managers by hint.
pub trait RankingManagerFactory: Send + Sync {
    /// The manager for `hint`; the same instance for every call with that hint.
    fn get_instance(&self, hint: &str) -> Result<Arc<dyn RankingManager>, RankingError>;
}

/// Factory backed by a configuration registry and a registry of builders
/// keyed by storage hint.
pub struct DefaultRankingManagerFactory {
    configurations: ConfigurationRegistry,
    builders: RwLock<HashMap<String, ManagerBuilder>>,
    instances: Mutex<HashMap<String, Arc<dyn RankingManager>>>,
}

impl DefaultRankingManagerFactory {
    pub fn new(configurations: ConfigurationRegistry) -> Self {
        DefaultRankingManagerFactory {
            configurations,
            builders: RwLock::new(HashMap::new()),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Register the index-backed manager under the `"index"` storage hint.
    pub fn with_index<P>(self, index: P, sink: Arc<dyn EventSink>) -> Result<Self, RankingError>
    where
        P: IndexProvider + Clone + 'static,
    {
        self.register_builder(INDEX_STORAGE_HINT, move |hint, configuration| {
            let manager: Arc<dyn RankingManager> = Arc::new(IndexRankingManager::new(
                hint,
                configuration,
                index.clone(),
                sink.clone(),
            )?);
            Ok(manager)
        })?;
        Ok(self)
    }

    /// Register how to build managers for `storage_hint`.
    pub fn register_builder<F>(&self, storage_hint: &str, builder: F) -> Result<(), RankingError>
    where
        F: Fn(&str, RankingConfiguration) -> Result<Arc<dyn RankingManager>, RankingError>
            + Send
            + Sync
            + 'static,
    {
        if storage_hint.is_empty() {
            return Err(RankingError::Registration("empty storage hint".into()));
        }
        let mut builders = self
            .builders
            .write()
            .map_err(|_| RankingError::Registration("builder registry poisoned".into()))?;
        if builders.contains_key(storage_hint) {
            return Err(RankingError::Registration(format!(
                "a builder is already registered for storage hint [{}]",
                storage_hint
            )));
        }
        builders.insert(storage_hint.to_string(), Box::new(builder));
        Ok(())
    }

    pub fn configurations(&self) -> &ConfigurationRegistry {
        &self.configurations
    }

    /// Hints of the managers built so far.
    pub fn cached_hints(&self) -> Result<Vec<String>, RankingError> {
        let instances = self
            .instances
            .lock()
            .map_err(|_| LockError::Poisoned("manager cache poisoned".into()))?;
        let mut hints: Vec<String> = instances.keys().cloned().collect();
        hints.sort();
        Ok(hints)
    }

    fn build(&self, hint: &str) -> Result<Arc<dyn RankingManager>, RankingError> {
        let configuration = self.configurations.resolve(hint).clone();
        let builders = self.builders.read().map_err(|_| RankingError::ManagerLookup {
            hint: hint.to_string(),
            message: "builder registry poisoned".into(),
        })?;
        let builder =
            builders
                .get(&configuration.storage_hint)
                .ok_or_else(|| RankingError::ManagerLookup {
                    hint: hint.to_string(),
                    message: format!(
                        "no ranking manager registered for storage hint [{}]",
                        configuration.storage_hint
                    ),
                })?;
        debug!(hint, storage_hint = %configuration.storage_hint, "building ranking manager");
        builder(hint, configuration)
    }
}

impl RankingManagerFactory for DefaultRankingManagerFactory {
    fn get_instance(&self, hint: &str) -> Result<Arc<dyn RankingManager>, RankingError> {
        let mut instances = self
            .instances
            .lock()
            .map_err(|_| RankingError::ManagerLookup {
                hint: hint.to_string(),
                message: "manager cache poisoned".into(),
            })?;
        if let Some(manager) = instances.get(hint) {
            return Ok(manager.clone());
        }

        let manager = self.build(hint)?;
        instances.insert(hint.to_string(), manager.clone());
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopSink;
    use crate::index::InMemoryIndex;

    fn factory(registry: ConfigurationRegistry) -> DefaultRankingManagerFactory {
        DefaultRankingManagerFactory::new(registry)
            .with_index(InMemoryIndex::new(), Arc::new(NoopSink))
            .unwrap()
    }

    #[test]
    fn same_hint_returns_same_instance() {
        let factory = factory(ConfigurationRegistry::default());
        let first = factory.get_instance("stars").unwrap();
        let second = factory.get_instance("stars").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.identifier(), "stars");
        assert_eq!(factory.cached_hints().unwrap(), vec!["stars"]);
    }

    #[test]
    fn unregistered_hint_uses_default_configuration() {
        let mut registry = ConfigurationRegistry::default();
        registry.register(
            "likes",
            RankingConfiguration {
                scale: 1,
                ..RankingConfiguration::default()
            },
        );
        let factory = factory(registry);

        assert_eq!(factory.get_instance("likes").unwrap().scale(), 1);
        assert_eq!(factory.get_instance("stars").unwrap().scale(), 5);
    }

    #[test]
    fn unknown_storage_hint_is_a_lookup_error() {
        let mut registry = ConfigurationRegistry::default();
        registry.register(
            "remote",
            RankingConfiguration {
                storage_hint: "remote".into(),
                ..RankingConfiguration::default()
            },
        );
        let factory = factory(registry);

        let err = factory.get_instance("remote").err().unwrap();
        assert!(matches!(err, RankingError::ManagerLookup { .. }));
        assert!(factory.cached_hints().unwrap().is_empty());
    }

    #[test]
    fn duplicate_builder_registration_fails() {
        let factory = factory(ConfigurationRegistry::default());
        let err = factory
            .register_builder(INDEX_STORAGE_HINT, |_, _| {
                Err(RankingError::Registration("unused".into()))
            })
            .unwrap_err();
        assert!(matches!(err, RankingError::Registration(_)));
    }
}
