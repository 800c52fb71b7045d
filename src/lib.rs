//! xml2ig
//!
//! Converts ATLAS JiveXML event files into ig event files. Tracks from the
//! `ExtendedTracks` collection become track records linked to their points,
//! or to hits carrying a reconstructed time of flight.
//!
//! This crate provides the core implementation for the `xml2ig` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! xml2ig event.xml event.ig.json
//! xml2ig --mode positions event.xml event.ig.json
//! ```

pub mod builder;
pub mod commands;
pub mod geometry;
pub mod output;
pub mod parser;
pub mod reconstruction;
pub mod store;
pub mod utils;
