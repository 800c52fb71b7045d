//! Construction of the ig store from extracted events.
//!
//! One pipeline serves both output flavours; the reconstruction mode picks
//! the schema and what each track point becomes.

pub mod ig_builder;

// Re-export main types and functions
pub use ig_builder::{build_store, collection_names, BuildOptions, BuildSummary};
