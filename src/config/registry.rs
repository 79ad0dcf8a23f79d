//! Symbolic reference resolution with on-demand module loading.

use std::collections::BTreeMap;

use tracing::debug;

use super::ConfigError;
use crate::document::Value;

/// Bound values exported by a loaded module, keyed by bare name.
pub type Bindings = BTreeMap<String, Value>;

/// Loads a module's bindings on demand.
///
/// Implementations must tolerate repeated loads of the same module; the
/// [`Registry`] additionally caches bindings so each module loads at most
/// once per registry.
pub trait ModuleLoader: Send + Sync + std::fmt::Debug {
    fn load(&self, module: &str) -> Result<Bindings, Box<dyn std::error::Error + Send + Sync>>;
}

/// A fixed module table, for hosts without dynamic loading and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticModules {
    modules: BTreeMap<String, Bindings>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module with its full binding set.
    pub fn with_module(mut self, module: impl Into<String>, bindings: Bindings) -> Self {
        self.modules.insert(module.into(), bindings);
        self
    }

    /// Registers a single binding, creating its module if needed.
    pub fn with_binding(
        mut self,
        module: impl Into<String>,
        name: impl Into<String>,
        value: Value,
    ) -> Self {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(name.into(), value);
        self
    }
}

impl ModuleLoader for StaticModules {
    fn load(&self, module: &str) -> Result<Bindings, Box<dyn std::error::Error + Send + Sync>> {
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| format!("module '{module}' is not registered").into())
    }
}

/// Resolves `module::name` references, loading owning modules on demand.
#[derive(Debug)]
pub struct Registry {
    loader: Box<dyn ModuleLoader>,
    loaded: BTreeMap<String, Bindings>,
}

impl Registry {
    pub fn new(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            loaded: BTreeMap::new(),
        }
    }

    /// Resolves a qualified reference to its bound value.
    ///
    /// The owning module is loaded on first use; afterwards lookups hit the
    /// cached bindings, so an absent name in a loaded module fails without
    /// re-invoking the loader.
    pub fn resolve(&mut self, qualified: &str) -> Result<Value, ConfigError> {
        let (module, name) = split_qualified(qualified)?;

        if !self.loaded.contains_key(module) {
            debug!(module, "loading module for reference resolution");
            let bindings =
                self.loader
                    .load(module)
                    .map_err(|source| ConfigError::ModuleLoadFailure {
                        module: module.to_string(),
                        source,
                    })?;
            self.loaded.insert(module.to_string(), bindings);
        }

        self.loaded[module]
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnboundReference(qualified.to_string()))
    }
}

/// Splits `module::name` on the last `::`, rejecting unqualified names and
/// empty segments.
fn split_qualified(qualified: &str) -> Result<(&str, &str), ConfigError> {
    match qualified.rsplit_once("::") {
        Some((module, name)) if !module.is_empty() && !name.is_empty() => Ok((module, name)),
        _ => Err(ConfigError::InvalidReference(qualified.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn registry_with(modules: StaticModules) -> Registry {
        Registry::new(Box::new(modules))
    }

    #[test]
    fn test_unqualified_name_rejected() {
        let mut registry = registry_with(StaticModules::new());

        for bad in ["pool", "::pool", "db::", "::"] {
            let err = registry.resolve(bad).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidReference(_)),
                "expected InvalidReference for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_unknown_module_fails_to_load() {
        let mut registry = registry_with(StaticModules::new());
        let err = registry.resolve("db::pool").unwrap_err();

        match err {
            ConfigError::ModuleLoadFailure { module, .. } => assert_eq!(module, "db"),
            other => panic!("expected ModuleLoadFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_resolves_binding_after_load() {
        let modules = StaticModules::new().with_binding("db", "pool", Value::Integer(5));
        let mut registry = registry_with(modules);

        assert_eq!(registry.resolve("db::pool").unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_multi_segment_module_path() {
        let modules =
            StaticModules::new().with_binding("app::handlers", "root", Value::String("ok".into()));
        let mut registry = registry_with(modules);

        assert_eq!(
            registry.resolve("app::handlers::root").unwrap(),
            Value::String("ok".into())
        );
    }

    #[test]
    fn test_unbound_name_in_loaded_module() {
        let modules = StaticModules::new().with_binding("db", "pool", Value::Integer(5));
        let mut registry = registry_with(modules);

        let err = registry.resolve("db::missing").unwrap_err();
        match err {
            ConfigError::UnboundReference(name) => assert_eq!(name, "db::missing"),
            other => panic!("expected UnboundReference, got {other:?}"),
        }
    }

    #[derive(Debug)]
    struct CountingLoader {
        calls: Arc<AtomicUsize>,
    }

    impl ModuleLoader for CountingLoader {
        fn load(
            &self,
            _module: &str,
        ) -> Result<Bindings, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut bindings = Bindings::new();
            bindings.insert("value".into(), Value::Integer(1));
            Ok(bindings)
        }
    }

    #[test]
    fn test_module_loads_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new(Box::new(CountingLoader {
            calls: Arc::clone(&calls),
        }));

        registry.resolve("m::value").unwrap();
        registry.resolve("m::value").unwrap();
        assert!(registry.resolve("m::other").is_err());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
