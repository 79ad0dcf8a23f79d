//! The resolution pipeline.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::env::{EnvReader, SystemEnv};
use super::merge::deep_merge;
use super::registry::{ModuleLoader, Registry, StaticModules};
use super::source::SourceLoader;
use super::substitute::substitute;
use super::ConfigError;
use crate::document::Value;

/// Well-known relative path of the defaults document.
pub const DEFAULTS_PATH: &str = "config/defaults.yaml";

/// Environment variable consulted for the environment-specific document path
/// when [`ResolveOptions::config_path`] is not set.
pub const CONFIG_PATH_VAR: &str = "STRATUM_CONFIG";

/// Options for a resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Explicit path to the environment-specific document. Takes precedence
    /// over the `STRATUM_CONFIG` variable.
    pub config_path: Option<PathBuf>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }
}

/// Resolves a single configuration value from layered sources.
///
/// A run loads the defaults document from [`DEFAULTS_PATH`] and the
/// environment-specific document from the path in [`ResolveOptions`] (or the
/// `STRATUM_CONFIG` variable), deep-merges them with the environment document
/// winning, substitutes environment markers, and resolves symbolic
/// references. Every failure along the way is fatal; no partial value is
/// ever returned. The result contains no remaining markers.
///
/// ## Example
///
/// ```no_run
/// use stratum::config::{ResolveOptions, Resolver};
///
/// let mut resolver = Resolver::builder()
///     .with_resource("config/defaults.yaml", include_str!("../../demos/defaults.yaml"))
///     .build();
///
/// let config = resolver.resolve(&ResolveOptions::new().with_config_path("/etc/app/prod.yaml"))?;
/// # Ok::<(), stratum::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Resolver {
    loader: SourceLoader,
    env: Box<dyn EnvReader>,
    registry: Registry,
}

impl Resolver {
    /// Creates a new resolver builder.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Runs the pipeline and returns the fully resolved value.
    pub fn resolve(&mut self, options: &ResolveOptions) -> Result<Value, ConfigError> {
        let defaults = self
            .loader
            .load(Path::new(DEFAULTS_PATH))?
            .ok_or_else(|| ConfigError::MissingDefaults(PathBuf::from(DEFAULTS_PATH)))?;

        let path = self.config_path(options)?;
        if !self.loader.locate(&path) {
            return Err(ConfigError::InvalidConfigPath(path.display().to_string()));
        }
        let overlay = self
            .loader
            .load(&path)?
            .ok_or_else(|| ConfigError::MissingConfig(path.clone()))?;

        debug!(path = %path.display(), "merging environment document over defaults");
        let merged = deep_merge(defaults, overlay);
        let substituted = substitute(merged, self.env.as_ref())?;
        resolve_symbols(substituted, &mut self.registry)
    }

    /// Picks the environment-specific document path: explicit option first,
    /// then the override variable. An unspecified path is an error, never
    /// silently tolerated.
    fn config_path(&self, options: &ResolveOptions) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &options.config_path {
            return Ok(path.clone());
        }
        self.env
            .var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .ok_or(ConfigError::UnspecifiedSource(CONFIG_PATH_VAR))
    }
}

/// Replaces every symbolic reference with its bound value, loading modules
/// through the registry as needed. Runs once, after merge and substitution.
fn resolve_symbols(value: Value, registry: &mut Registry) -> Result<Value, ConfigError> {
    match value {
        Value::Map(map) => map
            .into_iter()
            .map(|(key, value)| Ok((key, resolve_symbols(value, registry)?)))
            .collect::<Result<_, ConfigError>>()
            .map(Value::Map),
        Value::Seq(items) => items
            .into_iter()
            .map(|item| resolve_symbols(item, registry))
            .collect::<Result<_, _>>()
            .map(Value::Seq),
        Value::Set(items) => items
            .into_iter()
            .map(|item| resolve_symbols(item, registry))
            .collect::<Result<_, _>>()
            .map(Value::Set),
        Value::SymbolRef(marker) => registry.resolve(&marker.target),
        other => Ok(other),
    }
}

/// Builder for [`Resolver`].
///
/// Every I/O boundary is injectable: embedded resources for the source
/// loader, the environment reader, and the module loader. Unset boundaries
/// default to the live process environment and an empty static module table.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ResolverBuilder {
    loader: SourceLoader,
    env: Option<Box<dyn EnvReader>>,
    modules: Option<Box<dyn ModuleLoader>>,
}

impl ResolverBuilder {
    /// Registers an embedded resource under a relative path.
    pub fn with_resource(
        mut self,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.loader = self.loader.with_resource(path, content);
        self
    }

    /// Replaces the environment reader.
    pub fn with_env_reader(mut self, env: impl EnvReader + 'static) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Replaces the module loader used for symbolic references.
    pub fn with_module_loader(mut self, loader: impl ModuleLoader + 'static) -> Self {
        self.modules = Some(Box::new(loader));
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            loader: self.loader,
            env: self.env.unwrap_or_else(|| Box::new(SystemEnv)),
            registry: Registry::new(
                self.modules
                    .unwrap_or_else(|| Box::new(StaticModules::new())),
            ),
        }
    }
}
