//! Explicit provider registry.
//!
//! Engines are cached per `(ephemeris name, optional path)` key; the cache
//! is the only shared mutable state in the system and sits behind a mutex.
//! The registry is a plain value passed to whoever needs engines — there
//! is no process-global instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::analytic::AnalyticProvider;
use crate::error::AstroError;
use crate::provider::{AstroProvider, AstronomyEngine};

/// Environment variable consulted when no ephemeris name is given.
pub const ENV_EPHEMERIS: &str = "KYUREKI_EPHEMERIS";

/// Name of the built-in analytic ephemeris.
pub const DEFAULT_EPHEMERIS: &str = "analytic";

/// How a caller identifies an ephemeris.
///
/// Resolution order: explicit path (kept as part of the cache key) →
/// explicit name → `KYUREKI_EPHEMERIS` → the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EphemerisSpec {
    pub name: Option<String>,
    pub path: Option<PathBuf>,
}

impl EphemerisSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            path: None,
        }
    }

    fn resolved_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if let Ok(name) = std::env::var(ENV_EPHEMERIS) {
            let name = name.trim();
            if !name.is_empty() {
                return name.to_owned();
            }
        }
        DEFAULT_EPHEMERIS.to_owned()
    }
}

type Factory =
    Box<dyn Fn(Option<&Path>) -> Result<Box<dyn AstroProvider + Send + Sync>, AstroError> + Send + Sync>;

/// Factory table plus engine cache.
pub struct ProviderRegistry {
    factories: HashMap<String, Factory>,
    cache: Mutex<HashMap<(String, Option<PathBuf>), Arc<AstronomyEngine>>>,
}

impl ProviderRegistry {
    /// Registry with the built-in analytic factory.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        };
        registry.register(DEFAULT_EPHEMERIS, |_path| {
            Ok(Box::new(AnalyticProvider::new()))
        });
        registry
    }

    /// Register a provider factory under a name. A file-backed ephemeris
    /// factory receives the optional path from the spec.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(Option<&Path>) -> Result<Box<dyn AstroProvider + Send + Sync>, AstroError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Resolve a spec to a shared engine, constructing it on first use.
    pub fn resolve(&self, spec: &EphemerisSpec) -> Result<Arc<AstronomyEngine>, AstroError> {
        let name = spec.resolved_name();
        let key = (name.clone(), spec.path.clone());

        if let Ok(cache) = self.cache.lock() {
            if let Some(engine) = cache.get(&key) {
                return Ok(Arc::clone(engine));
            }
        }

        let factory = self
            .factories
            .get(&name)
            .ok_or_else(|| AstroError::UnknownEphemeris(name.clone()))?;
        let provider = factory(spec.path.as_deref())?;
        let engine = Arc::new(AstronomyEngine::new(provider));

        if let Ok(mut cache) = self.cache.lock() {
            // A concurrent resolve may have inserted first; keep that one.
            let entry = cache.entry(key).or_insert_with(|| Arc::clone(&engine));
            return Ok(Arc::clone(entry));
        }
        Ok(engine)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_resolves_to_analytic() {
        let registry = ProviderRegistry::new();
        let engine = registry.resolve(&EphemerisSpec::default()).unwrap();
        assert_eq!(engine.provider().source(), "analytic");
    }

    #[test]
    fn resolve_is_cached_per_key() {
        let registry = ProviderRegistry::new();
        let a = registry.resolve(&EphemerisSpec::named("analytic")).unwrap();
        let b = registry.resolve(&EphemerisSpec::named("analytic")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = ProviderRegistry::new();
        let err = registry
            .resolve(&EphemerisSpec::named("no-such-ephemeris"))
            .unwrap_err();
        assert!(matches!(err, AstroError::UnknownEphemeris(_)));
    }
}
