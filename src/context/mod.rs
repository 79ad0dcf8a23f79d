//! Application context exposing the resolved configuration.

use crate::config::{ResolveOptions, Resolver};
use crate::document::Value;
use crate::Error;

/// Holds the resolved configuration for the lifetime of the host process.
///
/// `start` runs the resolution pipeline once; the held value is immutable
/// afterwards and safe for unsynchronized concurrent reads. `stop` releases
/// the value with no I/O side effect.
///
/// ## Example
///
/// ```no_run
/// use stratum::config::{ResolveOptions, Resolver};
/// use stratum::AppContext;
///
/// let ctx = AppContext::builder()
///     .with_resolver(Resolver::builder().build())
///     .with_options(ResolveOptions::new().with_config_path("/etc/app/prod.yaml"))
///     .start()?;
///
/// let config = ctx.config();
/// # let _ = config;
/// # Ok::<(), stratum::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext {
    config: Value,
}

impl AppContext {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::default()
    }

    /// Returns the resolved configuration value.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Stops the context, releasing the held value. No I/O side effect.
    pub fn stop(self) {}
}

/// Builder for [`AppContext`].
///
/// Attach either a [`Resolver`] (resolution runs at [`start`](Self::start))
/// or an already-resolved value ([`with_value`](Self::with_value)), which
/// bypasses the pipeline for tests and static deployment.
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .start() is called"]
pub struct AppContextBuilder {
    resolver: Option<Resolver>,
    options: ResolveOptions,
    value: Option<Value>,
}

impl AppContextBuilder {
    /// Attaches a resolver whose pipeline runs at start.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the options passed to the resolver at start.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Injects an already-resolved configuration value. Takes precedence
    /// over an attached resolver.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Starts the context, resolving configuration unless a value was
    /// injected.
    pub fn start(self) -> Result<AppContext, Error> {
        if let Some(value) = self.value {
            return Ok(AppContext { config: value });
        }

        let mut resolver = self.resolver.ok_or(Error::Unconfigured)?;
        let config = resolver.resolve(&self.options)?;
        Ok(AppContext { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StaticEnv, DEFAULTS_PATH};
    use crate::document::from_str;

    #[test]
    fn test_injected_value_bypasses_resolution() {
        let value = from_str("a: 1").unwrap();
        let ctx = AppContext::builder().with_value(value.clone()).start().unwrap();

        assert_eq!(ctx.config(), &value);
        ctx.stop();
    }

    #[test]
    fn test_start_runs_the_pipeline() {
        let resolver = Resolver::builder()
            .with_resource(DEFAULTS_PATH, "a: 1\nb: 2")
            .with_resource("config/test.yaml", "b: 3")
            .with_env_reader(StaticEnv::new())
            .build();

        let ctx = AppContext::builder()
            .with_resolver(resolver)
            .with_options(ResolveOptions::new().with_config_path("config/test.yaml"))
            .start()
            .unwrap();

        assert_eq!(ctx.config(), &from_str("a: 1\nb: 3").unwrap());
    }

    #[test]
    fn test_start_without_source_fails() {
        let err = AppContext::builder().start().unwrap_err();
        assert!(matches!(err, Error::Unconfigured));
    }

    #[test]
    fn test_resolution_failure_propagates() {
        let resolver = Resolver::builder().with_env_reader(StaticEnv::new()).build();

        let err = AppContext::builder().with_resolver(resolver).start().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
