//! Output writers for ig files.
//!
//! This module handles writing the populated store to disk and reading
//! ig files back for validation.

pub mod ig;

// Re-export main functions
pub use ig::{read_store, store_from_str, store_to_string, validate_path, write_store};
