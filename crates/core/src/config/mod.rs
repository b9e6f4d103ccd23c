//! Configuration loading and schema definitions
//!
//! The TOML description of an Android app build consumed by droidplan.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
