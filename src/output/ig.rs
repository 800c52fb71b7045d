//! ig file output writer.
//!
//! An ig file is a JSON document with three tables, each keyed by name in
//! declaration order:
//!
//! ```text
//! {
//!   "Types":        { "Hits_V1": [["time", "double"], ["x", "double"], ...] },
//!   "Collections":  { "Hits_V1": [[0.0, 1.2, 3.4, 5.6], ...] },
//!   "Associations": { "ATLASTrackHits_V1": [[[1, 0], [2, 0]], ...] }
//! }
//! ```
//!
//! An association entry is a pair of `[collection index, record index]`.

use crate::store::{PropertyType, Store, Value};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value as Json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
            Value::V3d(v) => v.serialize(serializer),
        }
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("Types", &TypesTable(self))?;
        map.serialize_entry("Collections", &CollectionsTable(self))?;
        map.serialize_entry("Associations", &AssociationsTable(self))?;
        map.end()
    }
}

struct TypesTable<'a>(&'a Store);

impl Serialize for TypesTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let collections = self.0.collections();
        let mut map = serializer.serialize_map(Some(collections.len()))?;
        for collection in collections {
            let columns: Vec<(&str, &str)> = collection
                .properties()
                .iter()
                .map(|p| (p.name.as_str(), p.property_type().as_str()))
                .collect();
            map.serialize_entry(&collection.name, &columns)?;
        }
        map.end()
    }
}

struct CollectionsTable<'a>(&'a Store);

impl Serialize for CollectionsTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let collections = self.0.collections();
        let mut map = serializer.serialize_map(Some(collections.len()))?;
        for collection in collections {
            map.serialize_entry(&collection.name, collection.records())?;
        }
        map.end()
    }
}

struct AssociationsTable<'a>(&'a Store);

impl Serialize for AssociationsTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sets = self.0.associations();
        let mut map = serializer.serialize_map(Some(sets.len()))?;
        for set in sets {
            map.serialize_entry(&set.name, &Links(set.links()))?;
        }
        map.end()
    }
}

struct Links<'a>(&'a [(crate::store::RecordId, crate::store::RecordId)]);

impl Serialize for Links<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (a, b) in self.0 {
            let pair = [
                [a.collection().0, a.index()],
                [b.collection().0, b.index()],
            ];
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }
}

/// Write a store to an ig file
///
/// **Public** - main entry point for ig output
///
/// # Arguments
/// * `store` - Fully populated store
/// * `output_path` - Path to output file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_store(store: &Store, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing ig file to: {}", output_path.display());

    validate_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, store).map_err(OutputError::SerializationFailed)?;
    writeln!(writer)?;
    writer.flush()?;

    info!(
        "ig file written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Render a store exactly as [`write_store`] writes it
pub fn store_to_string(store: &Store) -> Result<String, OutputError> {
    let mut text = serde_json::to_string_pretty(store).map_err(OutputError::SerializationFailed)?;
    text.push('\n');
    Ok(text)
}

/// Validate that output path is writable
///
/// **Public** - also used by the convert command before any work starts
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read an ig file back into a store
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
/// * `OutputError::InvalidLayout` - JSON does not follow the ig layout
pub fn read_store(input_path: impl AsRef<Path>) -> Result<Store, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading ig file from: {}", input_path.display());

    let text = std::fs::read_to_string(input_path).map_err(OutputError::WriteFailed)?;
    store_from_str(&text)
}

/// Parse ig text into a store
pub fn store_from_str(text: &str) -> Result<Store, OutputError> {
    let root: Json = serde_json::from_str(text).map_err(OutputError::SerializationFailed)?;
    let mut store = Store::new();

    for (name, columns) in table(&root, "Types")? {
        let collection = store.declare_collection(name);
        for column in list(columns, name)? {
            let (property, ty) = match column.as_array().map(Vec::as_slice) {
                Some([Json::String(property), Json::String(ty)]) => (property, ty),
                _ => return Err(layout(format!("bad column {} in {}", column, name))),
            };
            let ty: PropertyType = ty.parse().map_err(layout)?;
            store
                .declare_property(collection, property, ty.default_value())
                .map_err(|e| layout(e.to_string()))?;
        }
    }

    for (name, rows) in table(&root, "Collections")? {
        let collection = store
            .collection_id(name)
            .ok_or_else(|| layout(format!("collection {} has no type entry", name)))?;

        let types: Vec<PropertyType> = store.collections()[collection.0]
            .properties()
            .iter()
            .map(|p| p.property_type())
            .collect();

        for row in list(rows, name)? {
            let cells = list(row, name)?;
            if cells.len() != types.len() {
                return Err(layout(format!(
                    "{} row has {} values for {} properties",
                    name,
                    cells.len(),
                    types.len()
                )));
            }

            let record = store.create_record(collection);
            for (index, (cell, ty)) in cells.iter().zip(&types).enumerate() {
                let value = json_to_value(cell, *ty)
                    .ok_or_else(|| layout(format!("{} is not a {} in {}", cell, ty, name)))?;
                let property = store
                    .property(collection, index)
                    .ok_or_else(|| layout(format!("missing property {} in {}", index, name)))?;
                store
                    .set_field(record, property, value)
                    .map_err(|e| layout(e.to_string()))?;
            }
        }
    }

    for (name, links) in table(&root, "Associations")? {
        let set = store.declare_associations(name);
        for link in list(links, name)? {
            let (a, b) = match serde_json::from_value::<[[usize; 2]; 2]>(link.clone()) {
                Ok([a, b]) => (a, b),
                Err(_) => return Err(layout(format!("bad link {} in {}", link, name))),
            };
            let resolve = |[c, i]: [usize; 2]| {
                store
                    .record_at(c, i)
                    .ok_or_else(|| layout(format!("link to missing record [{}, {}]", c, i)))
            };
            let (a, b) = (resolve(a)?, resolve(b)?);
            store.associate(set, a, b).map_err(|e| layout(e.to_string()))?;
        }
    }

    debug!(
        "ig file loaded: {} collections, {} association sets",
        store.collections().len(),
        store.associations().len()
    );

    Ok(store)
}

fn layout(message: String) -> OutputError {
    OutputError::InvalidLayout(message)
}

fn table<'a>(
    root: &'a Json,
    key: &str,
) -> Result<impl Iterator<Item = (&'a str, &'a Json)>, OutputError> {
    let object = root
        .get(key)
        .and_then(Json::as_object)
        .ok_or_else(|| layout(format!("missing {} table", key)))?;
    Ok(object.iter().map(|(k, v)| (k.as_str(), v)))
}

fn list<'a>(value: &'a Json, context: &str) -> Result<&'a Vec<Json>, OutputError> {
    value
        .as_array()
        .ok_or_else(|| layout(format!("expected array in {}", context)))
}

fn json_to_value(cell: &Json, ty: PropertyType) -> Option<Value> {
    match ty {
        PropertyType::Int => cell.as_i64().map(Value::Int),
        PropertyType::Double => cell.as_f64().map(Value::Double),
        PropertyType::String => cell.as_str().map(Value::from),
        PropertyType::V3d => {
            let v: [f64; 3] = serde_json::from_value(cell.clone()).ok()?;
            Some(Value::V3d(v))
        }
    }
}
