//! Utilities for sheet_schema
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{dbml_identifier, escape_block_comment, sanitize_identifier, to_key};
