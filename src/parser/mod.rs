//! JiveXML parsing and extracted data definitions.
//!
//! This module handles:
//! - Reading the event header from the document root
//! - Selecting the track collection and reading its polyline arrays
//! - Validating the array layout

pub mod jive_xml;
pub mod schema;

// Re-export main types
pub use jive_xml::{extract_header, extract_tracks, parse_document, read_document, ExtractOptions};
pub use schema::{EventHeader, JiveEvent, TrackArrays, TrackView};
