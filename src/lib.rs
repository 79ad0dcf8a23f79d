pub mod config;
pub mod context;
pub mod document;
pub mod query;
mod error;

pub use config::{ConfigError, ResolveOptions, Resolver};
pub use context::AppContext;
pub use document::Value;
pub use error::Error;
