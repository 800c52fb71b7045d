//! Populate an ig store from an extracted event.
//!
//! Construction order per document:
//! 1. Event schema and the single Event record
//! 2. Track, point/hit and association schemas
//! 3. For each track: the Track record, then one record per reconstructed
//!    element, each associated to the track right after it is created
//!
//! Association order therefore mirrors element emission order.

use crate::geometry::{LineSet, Point3, TraversalKind};
use crate::parser::{EventHeader, JiveEvent, TrackView};
use crate::reconstruction::{ReconstructionMode, TrackElement};
use crate::store::{AssociationId, CollectionId, PropertyId, RecordId, Store};
use crate::utils::config::{
    EVENT_COLLECTION, EXPERIMENT, HIT_COLLECTION, POINT_COLLECTION, POSITION_TRACK_COLLECTION,
    TIME_OF_FLIGHT_TRACK_COLLECTION, TRACK_HIT_ASSOCIATIONS, TRACK_POINT_ASSOCIATIONS,
};
use crate::utils::error::{BuildError, StoreError};
use log::debug;

/// Settings for one build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub mode: ReconstructionMode,
    pub traversal: TraversalKind,
}

/// Record counts of a finished store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub tracks: usize,
    pub hits: usize,
    pub associations: usize,
}

impl BuildSummary {
    /// Count the records produced for `mode`
    pub fn from_store(store: &Store, mode: ReconstructionMode) -> Self {
        let (tracks, hits, links) = collection_names(mode);

        Self {
            tracks: store.record_count(tracks),
            hits: store.record_count(hits),
            associations: store.association_set(links).map(|s| s.len()).unwrap_or(0),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tracks, {} hits, {} associations",
            self.tracks, self.hits, self.associations
        )
    }
}

/// Track, element and association names for a mode
pub fn collection_names(mode: ReconstructionMode) -> (&'static str, &'static str, &'static str) {
    match mode {
        ReconstructionMode::Positions => (
            POSITION_TRACK_COLLECTION,
            POINT_COLLECTION,
            TRACK_POINT_ASSOCIATIONS,
        ),
        ReconstructionMode::TimeOfFlight => (
            TIME_OF_FLIGHT_TRACK_COLLECTION,
            HIT_COLLECTION,
            TRACK_HIT_ASSOCIATIONS,
        ),
    }
}

/// Build the ig store for one event
///
/// **Public** - main entry point for store construction
///
/// # Arguments
/// * `event` - Extracted header and track arrays
/// * `options` - Reconstruction mode and point traversal
///
/// # Returns
/// A fully populated store, ready to serialize
///
/// # Errors
/// * `BuildError::MalformedInput` - the track arrays break the slicing invariant
/// * `BuildError::Store` - a field was assigned a value of the wrong type
pub fn build_store(event: &JiveEvent, options: &BuildOptions) -> Result<Store, BuildError> {
    event.tracks.validate()?;

    let mut store = Store::new();

    write_event(&mut store, &event.header)?;

    let schema = TrackSchema::declare(&mut store, options.mode)?;

    for track in event.tracks.tracks() {
        schema.write_track(&mut store, &track, options)?;
    }

    debug!(
        "Store built: {}",
        BuildSummary::from_store(&store, options.mode).summary()
    );

    Ok(store)
}

/// Declare the Event collection and write its single record
fn write_event(store: &mut Store, header: &EventHeader) -> Result<RecordId, StoreError> {
    let event = store.declare_collection(EVENT_COLLECTION);
    let experiment = store.declare_property(event, "experiment", "")?;
    let run = store.declare_property(event, "run", 0)?;
    let number = store.declare_property(event, "event", 0)?;
    let ls = store.declare_property(event, "ls", 0)?;
    store.declare_property(event, "orbit", 0)?;
    store.declare_property(event, "bx", 0)?;
    let time = store.declare_property(event, "time", "")?;
    store.declare_property(event, "localtime", "")?;
    store.declare_property(event, "mc", 0)?;

    let e = store.create_record(event);
    store.set_field(e, experiment, EXPERIMENT)?;
    store.set_field(e, run, header.run)?;
    store.set_field(e, number, header.event)?;
    store.set_field(e, ls, header.lumi_section)?;
    store.set_field(e, time, header.date_time.as_str())?;

    Ok(e)
}

/// Property handles of the element collection
#[derive(Debug, Clone, Copy)]
enum ElementSchema {
    Points {
        pos: PropertyId,
    },
    Hits {
        time: PropertyId,
        x: PropertyId,
        y: PropertyId,
        z: PropertyId,
    },
}

impl ElementSchema {
    fn collection_name(&self) -> &'static str {
        match self {
            ElementSchema::Points { .. } => POINT_COLLECTION,
            ElementSchema::Hits { .. } => HIT_COLLECTION,
        }
    }
}

/// Handles for everything written per track
#[derive(Debug, Clone, Copy)]
struct TrackSchema {
    tracks: CollectionId,
    pt: PropertyId,
    id: Option<PropertyId>,
    charge: PropertyId,
    phi: PropertyId,
    eta: PropertyId,
    elements: CollectionId,
    element_schema: ElementSchema,
    links: AssociationId,
}

impl TrackSchema {
    fn declare(store: &mut Store, mode: ReconstructionMode) -> Result<Self, StoreError> {
        let (track_name, element_name, link_name) = collection_names(mode);

        let tracks = store.declare_collection(track_name);
        let pt = store.declare_property(tracks, "pt", 0.0)?;
        let id = match mode {
            ReconstructionMode::TimeOfFlight => Some(store.declare_property(tracks, "id", 0)?),
            ReconstructionMode::Positions => None,
        };
        let charge = store.declare_property(tracks, "charge", 0)?;
        let phi = store.declare_property(tracks, "phi", 0.0)?;
        let eta = store.declare_property(tracks, "eta", 0.0)?;

        let elements = store.declare_collection(element_name);
        let element_schema = match mode {
            ReconstructionMode::Positions => ElementSchema::Points {
                pos: store.declare_property(elements, "pos", Point3::default())?,
            },
            ReconstructionMode::TimeOfFlight => ElementSchema::Hits {
                time: store.declare_property(elements, "time", 0.0)?,
                x: store.declare_property(elements, "x", 0.0)?,
                y: store.declare_property(elements, "y", 0.0)?,
                z: store.declare_property(elements, "z", 0.0)?,
            },
        };

        let links = store.declare_associations(link_name);

        Ok(Self {
            tracks,
            pt,
            id,
            charge,
            phi,
            eta,
            elements,
            element_schema,
            links,
        })
    }

    fn write_track(
        &self,
        store: &mut Store,
        track: &TrackView<'_>,
        options: &BuildOptions,
    ) -> Result<(), BuildError> {
        let t = store.create_record(self.tracks);
        store.set_field(t, self.pt, track.pt)?;
        if let Some(id) = self.id {
            store.set_field(t, id, track.id.unwrap_or(track.index as i64))?;
        }
        store.set_field(t, self.charge, track.charge())?;
        store.set_field(t, self.phi, track.phi())?;
        store.set_field(t, self.eta, track.eta())?;

        // The traversal is the only source of element order
        let line_set;
        let elements = match options.traversal {
            TraversalKind::Polyline => options.mode.reconstruct(track.points()),
            TraversalKind::LineSet => {
                line_set = LineSet::from_polyline(track.points());
                options.mode.reconstruct(line_set.traverse())
            }
        };

        let mut count = 0usize;
        for element in elements {
            let r = store.create_record(self.elements);
            self.write_element(store, r, &element)?;
            store.associate(self.links, t, r)?;
            count += 1;
        }

        debug!("Track {}: pt {} with {} elements", track.index, track.pt, count);
        Ok(())
    }

    fn write_element(
        &self,
        store: &mut Store,
        record: RecordId,
        element: &TrackElement,
    ) -> Result<(), BuildError> {
        match (self.element_schema, element) {
            (ElementSchema::Points { pos }, TrackElement::Point(point)) => {
                store.set_field(record, pos, *point)?;
            }
            (ElementSchema::Hits { time, x, y, z }, TrackElement::Hit(hit)) => {
                store.set_field(record, time, hit.time)?;
                store.set_field(record, x, hit.position.x)?;
                store.set_field(record, y, hit.position.y)?;
                store.set_field(record, z, hit.position.z)?;
            }
            (schema, element) => {
                return Err(BuildError::ElementMismatch {
                    collection: schema.collection_name(),
                    element: element.kind(),
                })
            }
        }
        Ok(())
    }
}
