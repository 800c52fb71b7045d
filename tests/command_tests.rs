use std::path::PathBuf;
use tempfile::TempDir;
use xml2ig::builder::BuildSummary;
use xml2ig::commands::{execute_convert, validate_args, ConvertArgs};
use xml2ig::geometry::TraversalKind;
use xml2ig::output::read_store;
use xml2ig::reconstruction::ReconstructionMode;
use xml2ig::store::Value;
use xml2ig::utils::config::SPEED_OF_LIGHT;
use xml2ig::utils::error::{ExtractError, MalformedInput};

const REFERENCE_EVENT: &str = r#"<?xml version="1.0"?>
<Event runNumber="7" eventNumber="11" dateTime="2010-03-30 13:04:52 CEST">
  <Track count="1" storeGateKey="ExtendedTracks">
    <pt>4.2</pt>
    <numPolyline>3</numPolyline>
    <polylineX>0 300 300</polylineX>
    <polylineY>0 0 400</polylineY>
    <polylineZ>0 0 0</polylineZ>
  </Track>
</Event>"#;

fn setup(xml: &str) -> (TempDir, ConvertArgs) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("event.xml");
    std::fs::write(&input, xml).unwrap();

    let args = ConvertArgs {
        input,
        output: dir.path().join("event.ig.json"),
        ..Default::default()
    };
    (dir, args)
}

#[test]
fn test_convert_reference_event() {
    let (_dir, args) = setup(REFERENCE_EVENT);
    validate_args(&args).unwrap();

    let summary = execute_convert(args.clone()).unwrap();
    assert_eq!(
        summary,
        BuildSummary {
            tracks: 1,
            hits: 3,
            associations: 3
        }
    );

    // Coordinates are centimetres; hits are written in metres
    let store = read_store(&args.output).unwrap();
    let tracks = store.collection_id("ATLASTracks_V2").unwrap();
    let track = store.record(tracks, 0).unwrap();
    let hits = store.associated("ATLASTrackHits_V1", track);

    let x: Vec<f64> = hits
        .iter()
        .map(|&h| store.field(h, "x").and_then(Value::as_double).unwrap())
        .collect();
    assert_eq!(x, vec![0.0, 3.0, 3.0]);

    let last = store.field(hits[2], "time").and_then(Value::as_double).unwrap();
    assert!((last - 5.0 / SPEED_OF_LIGHT).abs() < 1e-9);
}

#[test]
fn test_convert_positions_mode_keeps_units() {
    let (_dir, mut args) = setup(REFERENCE_EVENT);
    args.mode = ReconstructionMode::Positions;
    args.traversal = TraversalKind::LineSet;

    execute_convert(args.clone()).unwrap();

    let store = read_store(&args.output).unwrap();
    let points = store.collection_id("Points_V1").unwrap();
    let last = store.record(points, 2).unwrap();
    assert_eq!(store.field(last, "pos"), Some(&Value::V3d([300.0, 400.0, 0.0])));
}

#[test]
fn test_mismatched_arrays_write_nothing() {
    let xml = REFERENCE_EVENT.replace(
        "<polylineY>0 0 400</polylineY>",
        "<polylineY>0 0</polylineY>",
    );
    let (_dir, args) = setup(&xml);

    let err = execute_convert(args.clone()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::MalformedInput(MalformedInput::DataInconsistency(_)))
    ));
    assert!(!args.output.exists());
}

#[test]
fn test_no_matching_collection_writes_event_only() {
    let xml = REFERENCE_EVENT.replace("ExtendedTracks", "Tracks");
    let (_dir, args) = setup(&xml);

    let summary = execute_convert(args.clone()).unwrap();
    assert_eq!(summary, BuildSummary::default());

    let store = read_store(&args.output).unwrap();
    assert_eq!(store.record_count("Event_V3"), 1);
    assert_eq!(store.record_count("ATLASTracks_V2"), 0);
    assert_eq!(store.record_count("Hits_V1"), 0);
}

#[test]
fn test_unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let args = ConvertArgs {
        input: PathBuf::from("/definitely/not/here.xml"),
        output: dir.path().join("out.ig.json"),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());

    let err = execute_convert(args.clone()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::InputUnreadable { .. })
    ));
    assert!(!args.output.exists());
}
