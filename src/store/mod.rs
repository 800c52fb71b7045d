//! In-memory associative store.
//!
//! The store holds:
//! - Named collections, each with an ordered property schema
//! - Records (rows of typed values) created in those collections
//! - Named association sets linking records across collections
//!
//! Handles are plain indices assigned by the store. They stay valid for
//! the lifetime of the store because nothing is ever removed.

pub mod value;

pub use value::{PropertyType, Value};

use crate::utils::error::StoreError;
use log::debug;
use std::collections::HashMap;

/// Handle to a declared collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(pub(crate) usize);

/// Handle to a property of one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyId {
    collection: usize,
    index: usize,
}

/// Handle to a record of one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    collection: usize,
    index: usize,
}

impl RecordId {
    pub fn collection(&self) -> CollectionId {
        CollectionId(self.collection)
    }

    /// Position of the record inside its collection
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Handle to an association set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociationId(pub(crate) usize);

/// A declared property
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub default: Value,
}

impl Property {
    pub fn property_type(&self) -> PropertyType {
        self.default.property_type()
    }
}

/// A named, typed set of records
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub name: String,
    properties: Vec<Property>,
    records: Vec<Vec<Value>>,
}

impl Collection {
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn records(&self) -> &[Vec<Value>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of a property by name
    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

/// A named list of record pairs, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct AssociationSet {
    pub name: String,
    links: Vec<(RecordId, RecordId)>,
}

impl AssociationSet {
    pub fn links(&self) -> &[(RecordId, RecordId)] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// All collections and associations of one conversion run
#[derive(Debug, Clone, Default)]
pub struct Store {
    collections: Vec<Collection>,
    collection_index: HashMap<String, usize>,
    associations: Vec<AssociationSet>,
    association_index: HashMap<String, usize>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a collection, or return the existing one with that name
    pub fn declare_collection(&mut self, name: &str) -> CollectionId {
        if let Some(&index) = self.collection_index.get(name) {
            return CollectionId(index);
        }

        debug!("Declaring collection {}", name);
        let index = self.collections.len();
        self.collections.push(Collection {
            name: name.to_string(),
            ..Default::default()
        });
        self.collection_index.insert(name.to_string(), index);
        CollectionId(index)
    }

    /// Declare a property whose type is fixed by `default`
    ///
    /// Records created before the declaration receive the default.
    ///
    /// # Errors
    /// * `StoreError::DuplicateProperty` - name already declared on this collection
    pub fn declare_property(
        &mut self,
        collection: CollectionId,
        name: &str,
        default: impl Into<Value>,
    ) -> Result<PropertyId, StoreError> {
        let coll = &mut self.collections[collection.0];

        if coll.property_index(name).is_some() {
            return Err(StoreError::DuplicateProperty {
                collection: coll.name.clone(),
                property: name.to_string(),
            });
        }

        let default = default.into();
        for record in &mut coll.records {
            record.push(default.clone());
        }

        let index = coll.properties.len();
        coll.properties.push(Property {
            name: name.to_string(),
            default,
        });

        Ok(PropertyId {
            collection: collection.0,
            index,
        })
    }

    /// Allocate a record with every property at its default
    pub fn create_record(&mut self, collection: CollectionId) -> RecordId {
        let coll = &mut self.collections[collection.0];
        let row = coll.properties.iter().map(|p| p.default.clone()).collect();
        coll.records.push(row);

        RecordId {
            collection: collection.0,
            index: coll.records.len() - 1,
        }
    }

    /// Assign one field of a record
    ///
    /// # Errors
    /// * `StoreError::ForeignProperty` - property declared on another collection
    /// * `StoreError::UnknownRecord` - record handle not issued by this store
    /// * `StoreError::TypeMismatch` - value variant differs from the declared type
    pub fn set_field(
        &mut self,
        record: RecordId,
        property: PropertyId,
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        let value = value.into();
        let coll = self
            .collections
            .get_mut(record.collection)
            .ok_or(StoreError::UnknownRecord {
                collection: record.collection,
                index: record.index,
            })?;

        let declared_property = match coll.properties.get(property.index) {
            Some(p) if property.collection == record.collection => p,
            _ => {
                return Err(StoreError::ForeignProperty {
                    collection: coll.name.clone(),
                    property: format!("#{}", property.index),
                })
            }
        };

        let declared = declared_property.property_type();
        if declared != value.property_type() {
            return Err(StoreError::TypeMismatch {
                collection: coll.name.clone(),
                property: declared_property.name.clone(),
                expected: declared.as_str(),
                found: value.property_type().as_str(),
            });
        }

        let row = coll
            .records
            .get_mut(record.index)
            .ok_or(StoreError::UnknownRecord {
                collection: record.collection,
                index: record.index,
            })?;
        row[property.index] = value;

        Ok(())
    }

    /// Declare an association set, or return the existing one with that name
    pub fn declare_associations(&mut self, name: &str) -> AssociationId {
        if let Some(&index) = self.association_index.get(name) {
            return AssociationId(index);
        }

        debug!("Declaring association set {}", name);
        let index = self.associations.len();
        self.associations.push(AssociationSet {
            name: name.to_string(),
            ..Default::default()
        });
        self.association_index.insert(name.to_string(), index);
        AssociationId(index)
    }

    /// Link two records; insertion order is kept
    pub fn associate(
        &mut self,
        set: AssociationId,
        a: RecordId,
        b: RecordId,
    ) -> Result<(), StoreError> {
        self.check_record(a)?;
        self.check_record(b)?;
        self.associations[set.0].links.push((a, b));
        Ok(())
    }

    fn check_record(&self, record: RecordId) -> Result<(), StoreError> {
        let known = self
            .collections
            .get(record.collection)
            .map(|c| record.index < c.records.len())
            .unwrap_or(false);

        if known {
            Ok(())
        } else {
            Err(StoreError::UnknownRecord {
                collection: record.collection,
                index: record.index,
            })
        }
    }

    // Read-back accessors

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn associations(&self) -> &[AssociationSet] {
        &self.associations
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collection_index
            .get(name)
            .map(|&index| &self.collections[index])
    }

    pub fn collection_id(&self, name: &str) -> Option<CollectionId> {
        self.collection_index.get(name).copied().map(CollectionId)
    }

    pub fn association_set(&self, name: &str) -> Option<&AssociationSet> {
        self.association_index
            .get(name)
            .map(|&index| &self.associations[index])
    }

    /// Number of records in a collection, zero if it was never declared
    pub fn record_count(&self, name: &str) -> usize {
        self.collection(name).map(Collection::len).unwrap_or(0)
    }

    /// Handle of the `index`-th record of a collection
    pub fn record(&self, collection: CollectionId, index: usize) -> Option<RecordId> {
        let coll = self.collections.get(collection.0)?;
        (index < coll.records.len()).then_some(RecordId {
            collection: collection.0,
            index,
        })
    }

    /// Handle of the `index`-th property of a collection
    pub fn property(&self, collection: CollectionId, index: usize) -> Option<PropertyId> {
        let coll = self.collections.get(collection.0)?;
        (index < coll.properties.len()).then_some(PropertyId {
            collection: collection.0,
            index,
        })
    }

    /// Current value of a named field
    pub fn field(&self, record: RecordId, property: &str) -> Option<&Value> {
        let coll = self.collections.get(record.collection)?;
        let column = coll.property_index(property)?;
        coll.records.get(record.index)?.get(column)
    }

    /// Records linked from `record` in a set, in insertion order
    pub fn associated(&self, set: &str, record: RecordId) -> Vec<RecordId> {
        self.association_set(set)
            .map(|s| {
                s.links
                    .iter()
                    .filter(|(a, _)| *a == record)
                    .map(|(_, b)| *b)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Rebuild a record handle from raw indices (used when reading files back)
    pub(crate) fn record_at(&self, collection: usize, index: usize) -> Option<RecordId> {
        self.record(CollectionId(collection), index)
    }
}
