//! CLI utilities for droidplan
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Status messages and error reports
//! - Logging initialisation

#![warn(missing_docs)]

pub mod logging;
pub mod output;
