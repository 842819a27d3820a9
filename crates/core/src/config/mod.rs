//! Configuration loading and schema definitions
//!
//! Keyword sets used by the scanners can be overridden from a TOML file.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
