//! Core utilities for droidplan
//!
//! Shared functionality used by the domain crate and the CLI:
//!
//! - **Error handling**: structured errors with codes, offending field and recovery suggestions
//! - **Configuration**: TOML description of an Android app build
//! - **Validation**: fluent field and invariant checks
//!
//! # Example
//!
//! ```rust,no_run
//! use droidplan_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid droidplan.toml");
//! println!("{} plugins declared", config.schema.plugins.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result, ResultExt};
