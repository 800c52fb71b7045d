//! Configuration and constants for the converter.
//!
//! Nothing here is configurable at runtime. Input markers, collection
//! names and physical constants are fixed for a given output schema.

/// Speed of light in metres per nanosecond
pub const SPEED_OF_LIGHT: f64 = 0.299_792_458;

// Polyline coordinates arrive in centimetres. The time-of-flight hits are
// written in metres so that SPEED_OF_LIGHT applies directly.
pub const POSITION_LENGTH_SCALE: f64 = 1.0;
pub const TIME_OF_FLIGHT_LENGTH_SCALE: f64 = 0.01;

/// Experiment label written into every Event record
pub const EXPERIMENT: &str = "ATLAS";

// JiveXML element and attribute names
pub const TRACK_ELEMENT: &str = "Track";
pub const STORE_GATE_KEY_ATTR: &str = "storeGateKey";
pub const TRACK_COLLECTION_KEY: &str = "ExtendedTracks";
pub const RUN_NUMBER_ATTR: &str = "runNumber";
pub const EVENT_NUMBER_ATTR: &str = "eventNumber";
pub const LUMI_BLOCK_ATTR: &str = "lumiBlock";
pub const DATE_TIME_ATTR: &str = "dateTime";

// Output collection names
pub const EVENT_COLLECTION: &str = "Event_V3";
pub const POSITION_TRACK_COLLECTION: &str = "ATLASTracks_V1";
pub const POINT_COLLECTION: &str = "Points_V1";
pub const TRACK_POINT_ASSOCIATIONS: &str = "ATLASTrackPoints_V1";
pub const TIME_OF_FLIGHT_TRACK_COLLECTION: &str = "ATLASTracks_V2";
pub const HIT_COLLECTION: &str = "Hits_V1";
pub const TRACK_HIT_ASSOCIATIONS: &str = "ATLASTrackHits_V1";
