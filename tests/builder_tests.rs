use pretty_assertions::assert_eq;
use xml2ig::builder::{build_store, BuildOptions, BuildSummary};
use xml2ig::geometry::TraversalKind;
use xml2ig::parser::{EventHeader, JiveEvent, TrackArrays};
use xml2ig::reconstruction::ReconstructionMode;
use xml2ig::store::{Store, Value};
use xml2ig::utils::config::SPEED_OF_LIGHT;
use xml2ig::utils::error::{BuildError, MalformedInput};

const EPS: f64 = 1e-9;

fn header() -> EventHeader {
    EventHeader {
        run: 152166,
        event: 316199,
        lumi_section: 3,
        date_time: "2010-03-30 13:04:52 CEST".to_string(),
    }
}

fn event(tracks: TrackArrays) -> JiveEvent {
    JiveEvent {
        header: header(),
        tracks,
    }
}

/// One track through (0,0,0), (3,0,0), (3,4,0)
fn reference_track() -> TrackArrays {
    TrackArrays {
        pt: vec![4.2],
        num_polyline: vec![3],
        polyline_x: vec![0.0, 3.0, 3.0],
        polyline_y: vec![0.0, 0.0, 4.0],
        polyline_z: vec![0.0, 0.0, 0.0],
        ..Default::default()
    }
}

fn three_tracks() -> TrackArrays {
    TrackArrays {
        pt: vec![1.0, 2.0, -3.0],
        num_polyline: vec![2, 0, 3],
        polyline_x: vec![1.0, 2.0, 5.0, 1.0, 9.0],
        polyline_y: vec![0.0; 5],
        polyline_z: vec![0.0; 5],
        ..Default::default()
    }
}

fn tof() -> BuildOptions {
    BuildOptions {
        mode: ReconstructionMode::TimeOfFlight,
        traversal: TraversalKind::Polyline,
    }
}

fn hit_times(store: &Store, track_index: usize) -> Vec<f64> {
    let tracks = store.collection_id("ATLASTracks_V2").unwrap();
    let track = store.record(tracks, track_index).unwrap();
    store
        .associated("ATLASTrackHits_V1", track)
        .into_iter()
        .map(|hit| store.field(hit, "time").and_then(Value::as_double).unwrap())
        .collect()
}

fn hit_xs(store: &Store, track_index: usize) -> Vec<f64> {
    let tracks = store.collection_id("ATLASTracks_V2").unwrap();
    let track = store.record(tracks, track_index).unwrap();
    store
        .associated("ATLASTrackHits_V1", track)
        .into_iter()
        .map(|hit| store.field(hit, "x").and_then(Value::as_double).unwrap())
        .collect()
}

#[test]
fn test_reference_scenario() {
    let store = build_store(&event(reference_track()), &tof()).unwrap();

    assert_eq!(
        BuildSummary::from_store(&store, ReconstructionMode::TimeOfFlight),
        BuildSummary {
            tracks: 1,
            hits: 3,
            associations: 3
        }
    );

    let times = hit_times(&store, 0);
    assert_eq!(times.len(), 3);
    assert!(times[0].abs() < EPS);
    assert!((times[1] - 3.0 / SPEED_OF_LIGHT).abs() < EPS);
    assert!((times[2] - 5.0 / SPEED_OF_LIGHT).abs() < EPS);
    assert!((times[1] - 10.0069).abs() < 1e-3);
    assert!((times[2] - times[1] - 6.6713).abs() < 1e-3);
}

#[test]
fn test_event_record() {
    let store = build_store(&event(TrackArrays::default()), &tof()).unwrap();
    let events = store.collection_id("Event_V3").unwrap();
    let e = store.record(events, 0).unwrap();

    assert_eq!(store.record_count("Event_V3"), 1);
    assert_eq!(store.field(e, "experiment"), Some(&Value::from("ATLAS")));
    assert_eq!(store.field(e, "run"), Some(&Value::Int(152166)));
    assert_eq!(store.field(e, "event"), Some(&Value::Int(316199)));
    assert_eq!(store.field(e, "ls"), Some(&Value::Int(3)));
    assert_eq!(store.field(e, "time"), Some(&Value::from("2010-03-30 13:04:52 CEST")));
    assert_eq!(store.field(e, "mc"), Some(&Value::Int(0)));
}

#[test]
fn test_no_tracks_still_builds() {
    let store = build_store(&event(TrackArrays::default()), &tof()).unwrap();

    assert_eq!(store.record_count("Event_V3"), 1);
    assert_eq!(store.record_count("ATLASTracks_V2"), 0);
    assert_eq!(store.record_count("Hits_V1"), 0);
    assert!(store.association_set("ATLASTrackHits_V1").unwrap().is_empty());
}

#[test]
fn test_cardinality_per_track() {
    let arrays = three_tracks();
    let store = build_store(&event(arrays.clone()), &tof()).unwrap();
    let tracks = store.collection_id("ATLASTracks_V2").unwrap();

    for (i, &expected) in arrays.num_polyline.iter().enumerate() {
        let track = store.record(tracks, i).unwrap();
        assert_eq!(store.associated("ATLASTrackHits_V1", track).len(), expected);
    }
}

#[test]
fn test_clock_resets_per_track() {
    let store = build_store(&event(three_tracks()), &tof()).unwrap();

    // Track 2 starts at x = 5 even though track 0 ended at x = 2
    let times = hit_times(&store, 2);
    assert!((times[0] - 5.0 / SPEED_OF_LIGHT).abs() < EPS);
}

#[test]
fn test_hits_keep_traversal_order() {
    let store = build_store(&event(three_tracks()), &tof()).unwrap();

    // 5, 1, 9 is not sorted by distance; order must survive as given
    assert_eq!(hit_xs(&store, 2), vec![5.0, 1.0, 9.0]);

    let times = hit_times(&store, 2);
    assert!(times[1] < times[0]);
    assert!(times[2] > times[1]);
}

#[test]
fn test_monotonic_distance_gives_monotonic_time() {
    let arrays = TrackArrays {
        pt: vec![1.0],
        num_polyline: vec![4],
        polyline_x: vec![0.1, 0.2, 0.2, 0.7],
        polyline_y: vec![0.0, 0.3, 0.9, 1.2],
        polyline_z: vec![0.0, 0.0, 0.4, 2.0],
        ..Default::default()
    };
    let store = build_store(&event(arrays), &tof()).unwrap();
    let times = hit_times(&store, 0);

    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_line_set_traversal_matches_polyline_for_polylines() {
    let polyline = build_store(&event(three_tracks()), &tof()).unwrap();
    let line_set = build_store(
        &event(three_tracks()),
        &BuildOptions {
            mode: ReconstructionMode::TimeOfFlight,
            traversal: TraversalKind::LineSet,
        },
    )
    .unwrap();

    for track in 0..3 {
        assert_eq!(hit_times(&polyline, track), hit_times(&line_set, track));
    }
}

#[test]
fn test_track_ids_default_to_index() {
    let mut arrays = three_tracks();
    let store = build_store(&event(arrays.clone()), &tof()).unwrap();
    let tracks = store.collection_id("ATLASTracks_V2").unwrap();
    let third = store.record(tracks, 2).unwrap();
    assert_eq!(store.field(third, "id"), Some(&Value::Int(2)));

    arrays.id = vec![10, 20, 30];
    let store = build_store(&event(arrays), &tof()).unwrap();
    let third = store.record(tracks, 2).unwrap();
    assert_eq!(store.field(third, "id"), Some(&Value::Int(30)));
    assert_eq!(store.field(third, "charge"), Some(&Value::Int(-1)));
}

#[test]
fn test_positions_mode_schema() {
    let options = BuildOptions {
        mode: ReconstructionMode::Positions,
        traversal: TraversalKind::Polyline,
    };
    let store = build_store(&event(reference_track()), &options).unwrap();

    assert_eq!(store.record_count("ATLASTracks_V1"), 1);
    assert_eq!(store.record_count("Points_V1"), 3);
    assert!(store.collection("Hits_V1").is_none());

    let tracks = store.collection_id("ATLASTracks_V1").unwrap();
    let track = store.record(tracks, 0).unwrap();
    let positions: Vec<Value> = store
        .associated("ATLASTrackPoints_V1", track)
        .into_iter()
        .filter_map(|p| store.field(p, "pos").cloned())
        .collect();

    assert_eq!(
        positions,
        vec![
            Value::V3d([0.0, 0.0, 0.0]),
            Value::V3d([3.0, 0.0, 0.0]),
            Value::V3d([3.0, 4.0, 0.0]),
        ]
    );
    assert_eq!(store.field(track, "pt"), Some(&Value::Double(4.2)));
}

#[test]
fn test_inconsistent_arrays_are_rejected() {
    let arrays = TrackArrays {
        pt: vec![1.0, 2.0],
        num_polyline: vec![3],
        polyline_x: vec![1.0, 2.0, 3.0],
        polyline_y: vec![0.0],
        polyline_z: vec![0.0, 0.0, 0.0],
        ..Default::default()
    };

    let positions = BuildOptions {
        mode: ReconstructionMode::Positions,
        traversal: TraversalKind::LineSet,
    };
    for options in [tof(), positions] {
        assert!(matches!(
            build_store(&event(arrays.clone()), &options),
            Err(BuildError::MalformedInput(MalformedInput::DataInconsistency(_)))
        ));
    }

    // Short coordinate column alone is enough to refuse the build
    let short_y = TrackArrays {
        polyline_y: vec![0.0, 0.0],
        ..reference_track()
    };
    assert!(matches!(
        build_store(&event(short_y), &tof()),
        Err(BuildError::MalformedInput(MalformedInput::DataInconsistency(_)))
    ));
}
