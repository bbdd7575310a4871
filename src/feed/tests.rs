use super::*;
use crate::engine::EngineConfig;
use crate::geofence::RuleType;
use crate::rules::EventKind;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn forbidden_zone_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Restricted Yard",
        "rule_type": "FORBIDDEN",
        "shape": {
            "type": "circle",
            "center": {"lon": 106.80, "lat": -6.20},
            "radius_meters": 500.0
        }
    })
}

#[test]
fn test_decode_upsert_command() {
    let payload = json!({"op": "upsert", "geofence": forbidden_zone_json("gf-1")});
    let command = decode_geofence_command(payload.to_string().as_bytes()).unwrap();

    match command {
        GeofenceCommand::Upsert { geofence } => {
            assert_eq!(geofence.id, "gf-1");
            assert_eq!(geofence.rule_type, RuleType::Forbidden);
        }
        other => panic!("Expected Upsert, got {:?}", other),
    }
}

#[test]
fn test_decode_remove_and_clear() {
    let remove = decode_geofence_command(br#"{"op":"remove","id":"gf-1"}"#).unwrap();
    assert_eq!(remove, GeofenceCommand::Remove { id: "gf-1".to_string() });

    let clear = decode_geofence_command(br#"{"op":"clear"}"#).unwrap();
    assert_eq!(clear, GeofenceCommand::Clear);
}

#[test]
fn test_decode_malformed_command_fails() {
    assert!(decode_geofence_command(b"not json").is_err());
    assert!(decode_geofence_command(br#"{"op":"explode"}"#).is_err());
}

#[test]
fn test_apply_commands() {
    let engine = DetectionEngine::default();

    let upsert = decode_geofence_command(
        json!({"op": "upsert", "geofence": forbidden_zone_json("gf-1")})
            .to_string()
            .as_bytes(),
    )
    .unwrap();
    apply_geofence_command(&engine, upsert).unwrap();
    assert!(engine.registry().get("gf-1").is_some());

    apply_geofence_command(&engine, GeofenceCommand::Remove { id: "gf-1".to_string() }).unwrap();
    assert!(engine.registry().is_empty());

    // Removing an unknown geofence is not an error
    apply_geofence_command(&engine, GeofenceCommand::Remove { id: "gf-1".to_string() }).unwrap();
}

#[test]
fn test_apply_invalid_upsert_returns_validation_error() {
    let engine = DetectionEngine::default();
    let mut geofence = forbidden_zone_json("gf-1");
    geofence["shape"]["radius_meters"] = json!(-5.0);

    let command: GeofenceCommand =
        serde_json::from_value(json!({"op": "upsert", "geofence": geofence})).unwrap();

    assert_eq!(
        apply_geofence_command(&engine, command).unwrap_err(),
        ValidationError::InvalidRadius(-5.0)
    );
    assert!(engine.registry().is_empty());
}

#[test]
fn test_apply_load_command() {
    let engine = DetectionEngine::default();
    let command: GeofenceCommand = serde_json::from_value(json!({
        "op": "load",
        "geofences": [forbidden_zone_json("gf-1"), forbidden_zone_json("gf-2")]
    }))
    .unwrap();

    apply_geofence_command(&engine, command).unwrap();
    assert_eq!(engine.registry().len(), 2);
}

#[test]
fn test_decode_position_sample() {
    let payload = br#"{"vehicle_id":"truck-1","timestamp":1707668400000,"position":{"lon":106.8,"lat":-6.2}}"#;
    let sample = decode_position_sample(payload).unwrap();
    assert_eq!(sample.vehicle_id, "truck-1");
    assert_eq!(sample.timestamp, 1707668400000);

    assert!(decode_position_sample(br#"{"vehicle_id":"truck-1"}"#).is_err());
}

#[test]
fn test_position_sample_waits_for_tick_by_default() {
    let engine = DetectionEngine::default();
    apply_geofence_command(
        &engine,
        serde_json::from_value(json!({"op": "upsert", "geofence": forbidden_zone_json("gf-1")}))
            .unwrap(),
    )
    .unwrap();

    let sample = decode_position_sample(
        br#"{"vehicle_id":"truck-1","timestamp":1000,"position":{"lon":106.8,"lat":-6.2}}"#,
    )
    .unwrap();

    assert!(apply_position_sample(&engine, sample).is_empty());
    assert!(engine.vehicles().latest("truck-1").is_some());
    assert!(engine.containment().is_empty());
}

#[test]
fn test_position_sample_on_sample_mode() {
    let engine = DetectionEngine::new(EngineConfig {
        evaluate_on_sample: true,
        ..EngineConfig::default()
    });
    apply_geofence_command(
        &engine,
        serde_json::from_value(json!({"op": "upsert", "geofence": forbidden_zone_json("gf-1")}))
            .unwrap(),
    )
    .unwrap();

    let outside = decode_position_sample(
        br#"{"vehicle_id":"truck-1","timestamp":1000,"position":{"lon":106.8,"lat":-6.1}}"#,
    )
    .unwrap();
    let inside = decode_position_sample(
        br#"{"vehicle_id":"truck-1","timestamp":2000,"position":{"lon":106.8,"lat":-6.2}}"#,
    )
    .unwrap();

    assert!(apply_position_sample(&engine, outside).is_empty());
    let events = apply_position_sample(&engine, inside);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, EventKind::ViolationEnter);
}

#[test]
fn test_load_geofences_file() {
    let mut file = NamedTempFile::new().unwrap();
    let contents = json!([forbidden_zone_json("gf-1"), forbidden_zone_json("gf-2")]);
    file.write_all(contents.to_string().as_bytes()).unwrap();

    let geofences = load_geofences_file(file.path()).unwrap();
    assert_eq!(geofences.len(), 2);
    assert_eq!(geofences[1].name, "Restricted Yard");
}

#[test]
fn test_load_geofences_file_missing() {
    let result = load_geofences_file(Path::new("/nonexistent/geofences.json"));
    assert!(result.is_err());
}
