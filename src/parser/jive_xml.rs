//! JiveXML track extraction.
//!
//! Reads the event header from the root element and the polyline arrays
//! of the `ExtendedTracks` track collection. The rest of the document is
//! ignored.

use super::schema::{EventHeader, JiveEvent, TrackArrays};
use crate::utils::config::{
    DATE_TIME_ATTR, EVENT_NUMBER_ATTR, LUMI_BLOCK_ATTR, RUN_NUMBER_ATTR, STORE_GATE_KEY_ATTR,
    TRACK_COLLECTION_KEY, TRACK_ELEMENT,
};
use crate::utils::error::{ExtractError, MalformedInput};
use log::{debug, info, warn};
use roxmltree::{Document, Node, ParsingOptions};
use std::path::Path;
use std::str::FromStr;

/// Extraction settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    /// Factor applied to polylineX/Y/Z
    pub length_scale: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { length_scale: 1.0 }
    }
}

/// Read and parse a JiveXML file
///
/// **Public** - entry point used by the convert command
///
/// # Errors
/// * `ExtractError::InputUnreadable` - file missing or unreadable
/// * everything [`parse_document`] returns
pub fn read_document(
    path: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<JiveEvent, ExtractError> {
    let path = path.as_ref();
    info!("Parsing {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|source| ExtractError::InputUnreadable {
        path: path.display().to_string(),
        source,
    })?;

    parse_document(&text, options)
}

/// Parse a JiveXML document held in memory
///
/// **Public** - main entry point for extraction
///
/// # Arguments
/// * `xml` - Document text
/// * `options` - Extraction settings
///
/// # Returns
/// Event header and the validated track arrays
///
/// # Errors
/// * `ExtractError::Xml` - not well-formed XML
/// * `ExtractError::MalformedInput` - missing attribute or inconsistent arrays
/// * `ExtractError::ParseError` - a token is not a valid number
pub fn parse_document(xml: &str, options: &ExtractOptions) -> Result<JiveEvent, ExtractError> {
    // JiveXML files reference an external DTD; it is tolerated but not loaded
    let parsing = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(xml, parsing)?;
    let root = document.root_element();

    let header = extract_header(root)?;
    debug!(
        "Event header: run {} event {} ({})",
        header.run, header.event, header.date_time
    );

    let tracks = extract_tracks(root, options)?;
    tracks.validate()?;

    debug!(
        "Extracted {} tracks with {} polyline points",
        tracks.track_count(),
        tracks.point_count()
    );

    Ok(JiveEvent { header, tracks })
}

/// Read event attributes from the root element
///
/// **Public** - exposed for tests
pub fn extract_header(root: Node<'_, '_>) -> Result<EventHeader, ExtractError> {
    let run = required_attribute(root, RUN_NUMBER_ATTR)?;
    let event = required_attribute(root, EVENT_NUMBER_ATTR)?;

    let lumi_section = match root.attribute(LUMI_BLOCK_ATTR) {
        Some(value) => parse_token(LUMI_BLOCK_ATTR, 0, value)?,
        None => 0,
    };

    Ok(EventHeader {
        run: parse_token(RUN_NUMBER_ATTR, 0, run)?,
        event: parse_token(EVENT_NUMBER_ATTR, 0, event)?,
        lumi_section,
        date_time: root.attribute(DATE_TIME_ATTR).unwrap_or_default().to_string(),
    })
}

fn required_attribute<'a>(
    root: Node<'a, '_>,
    name: &'static str,
) -> Result<&'a str, ExtractError> {
    root.attribute(name)
        .ok_or(ExtractError::MalformedInput(MalformedInput::MissingAttribute(name)))
}

/// Collect the arrays of every matching track collection
///
/// **Public** - exposed for tests
///
/// Collections are matched on their `storeGateKey`. A document without a
/// match yields empty arrays. The result is not validated here.
pub fn extract_tracks(
    root: Node<'_, '_>,
    options: &ExtractOptions,
) -> Result<TrackArrays, ExtractError> {
    let mut arrays = TrackArrays::default();
    let mut matched = 0usize;

    for collection in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == TRACK_ELEMENT)
    {
        let Some(key) = collection.attribute(STORE_GATE_KEY_ATTR) else {
            warn!("Skipping <{}> without {}", TRACK_ELEMENT, STORE_GATE_KEY_ATTR);
            continue;
        };

        if key != TRACK_COLLECTION_KEY {
            debug!("Ignoring track collection {}", key);
            continue;
        }

        matched += 1;
        read_collection(collection, options, &mut arrays)?;
    }

    match matched {
        0 => warn!("No {} track collection found", TRACK_COLLECTION_KEY),
        1 => {}
        n => warn!(
            "{} collections named {}; appending all of them",
            n, TRACK_COLLECTION_KEY
        ),
    }

    Ok(arrays)
}

/// Append the recognised children of one track collection
///
/// **Private** - internal helper for extract_tracks
fn read_collection(
    collection: Node<'_, '_>,
    options: &ExtractOptions,
    arrays: &mut TrackArrays,
) -> Result<(), ExtractError> {
    for child in collection.children().filter(|n| n.is_element()) {
        let name = child.tag_name().name();
        let text = text_content(child);

        match name {
            "pt" => append_tokens(name, &text, &mut arrays.pt)?,
            "numPolyline" => append_tokens(name, &text, &mut arrays.num_polyline)?,
            "polylineX" => {
                append_scaled(name, &text, options.length_scale, &mut arrays.polyline_x)?
            }
            "polylineY" => {
                append_scaled(name, &text, options.length_scale, &mut arrays.polyline_y)?
            }
            "polylineZ" => {
                append_scaled(name, &text, options.length_scale, &mut arrays.polyline_z)?
            }
            "id" => append_tokens(name, &text, &mut arrays.id)?,
            "phi0" => append_tokens(name, &text, &mut arrays.phi0)?,
            "cotTheta" => append_tokens(name, &text, &mut arrays.cot_theta)?,
            _ => {}
        }
    }

    Ok(())
}

/// Concatenated text of all descendant text nodes
fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn append_tokens<T: Numeric>(
    field: &str,
    text: &str,
    out: &mut Vec<T>,
) -> Result<(), ExtractError> {
    let start = out.len();
    for (offset, token) in text.split_whitespace().enumerate() {
        out.push(parse_token(field, start + offset, token)?);
    }
    Ok(())
}

fn append_scaled(
    field: &str,
    text: &str,
    scale: f64,
    out: &mut Vec<f64>,
) -> Result<(), ExtractError> {
    let start = out.len();
    append_tokens(field, text, out)?;
    for value in &mut out[start..] {
        *value *= scale;
    }
    Ok(())
}

/// Number types accepted in JiveXML token lists
trait Numeric: FromStr {
    fn is_valid(&self) -> bool {
        true
    }
}

impl Numeric for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Numeric for i64 {}
impl Numeric for usize {}

fn parse_token<T: Numeric>(field: &str, index: usize, token: &str) -> Result<T, ExtractError> {
    token
        .trim()
        .parse::<T>()
        .ok()
        .filter(|value| value.is_valid())
        .ok_or_else(|| ExtractError::ParseError {
            field: field.to_string(),
            index,
            token: token.to_string(),
        })
}
