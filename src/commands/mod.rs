//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;

// Re-export main command functions
pub use convert::{execute_convert, validate_args, ConvertArgs};
