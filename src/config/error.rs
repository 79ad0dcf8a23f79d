use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentError;

/// Errors raised while resolving configuration.
///
/// Every variant is fatal to the resolution run that produced it; nothing is
/// retried and no partial configuration is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("defaults document not found at '{0}'")]
    MissingDefaults(PathBuf),

    #[error("no config source specified: pass an explicit path or set {0}")]
    UnspecifiedSource(&'static str),

    #[error("invalid config source path '{0}'")]
    InvalidConfigPath(String),

    #[error("config document not found at '{0}'")]
    MissingConfig(PathBuf),

    #[error("failed to read config source '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config source '{path}': {source}")]
    MalformedSource {
        path: PathBuf,
        source: DocumentError,
    },

    #[error("environment variable '{name}' does not hold a readable value: {source}")]
    MalformedEnvValue {
        name: String,
        source: DocumentError,
    },

    #[error("reference '{0}' is not module-qualified")]
    InvalidReference(String),

    #[error("failed to load module '{module}': {source}")]
    ModuleLoadFailure {
        module: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("reference '{0}' is unbound after loading its module")]
    UnboundReference(String),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] serde_yaml::Error),
}
