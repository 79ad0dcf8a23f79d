//! Configuration resolution.
//!
//! A resolution run merges the embedded defaults document with an
//! environment-specific document (environment wins, field by field), then
//! substitutes `!env`/`!env_parse` markers from the process environment and
//! resolves `!ref` markers through on-demand module loading. The pipeline
//! runs once at startup; the resolved value is immutable afterwards.

mod env;
mod error;
mod merge;
mod registry;
mod resolver;
mod source;
mod substitute;

pub use env::{EnvReader, StaticEnv, SystemEnv};
pub use error::ConfigError;
pub use merge::deep_merge;
pub use registry::{Bindings, ModuleLoader, Registry, StaticModules};
pub use resolver::{ResolveOptions, Resolver, ResolverBuilder, CONFIG_PATH_VAR, DEFAULTS_PATH};
pub use source::SourceLoader;
pub use substitute::substitute;
