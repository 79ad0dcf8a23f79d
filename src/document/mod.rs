//! Document value model for configuration sources.

mod convert;
mod value;

pub use convert::{from_str, DocumentError};
pub use value::{EnvMode, EnvRef, SymbolRef, Value};

pub(crate) use convert::to_yaml;
