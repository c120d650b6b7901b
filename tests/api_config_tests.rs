use timeline_rs::TimelineError;
use timeline_rs::api::{BarStyle, LayoutRequest, TimelineEngine, TimelineEngineConfig};
use timeline_rs::core::{BoundingBox, ScopeKey};
use timeline_rs::render::{Color, NullRenderer};

#[test]
fn config_json_round_trip() {
    let config = TimelineEngineConfig::default()
        .with_padding(24.0)
        .with_collision_step(6.0)
        .with_time_margin_ratio(0.1)
        .with_bar_margin(12.0)
        .with_entity_offset_y(60.0)
        .with_unlock_retry(250, 8);
    let json = config.to_json_pretty().expect("serialize config");
    let parsed = TimelineEngineConfig::from_json_str(&json).expect("parse config");
    assert_eq!(parsed, config);
}

#[test]
fn partial_config_json_uses_defaults() {
    let parsed = TimelineEngineConfig::from_json_str(r#"{ "padding": 12.0 }"#).expect("parse");
    assert_eq!(parsed.padding, 12.0);
    assert_eq!(parsed.min_bar_width, 200.0);
    assert_eq!(parsed.collision_step, 10.0);
    assert_eq!(parsed.unlock_retry_max_attempts, 50);
}

#[test]
fn invalid_config_values_are_rejected() {
    for input in [
        r#"{ "padding": -5.0 }"#,
        r#"{ "min_bar_width": 0.0 }"#,
        r#"{ "unlock_retry_interval_ms": 0 }"#,
        r#"{ "unlock_retry_max_attempts": 0 }"#,
        r#"{ "padding": "wide" }"#,
    ] {
        let err = TimelineEngineConfig::from_json_str(input).expect_err(input);
        assert!(matches!(err, TimelineError::InvalidData(_)), "input {input}");
    }
}

#[test]
fn engine_rejects_invalid_bar_style() {
    let extent = BoundingBox::new(0.0, 0.0, 400.0, 300.0).expect("extent");
    let config = TimelineEngineConfig::default().with_bar_style(BarStyle {
        height: 6.0,
        color: Color::rgba(2.0, 0.0, 0.0, 1.0),
        class_name: "bar".to_owned(),
    });
    let result = TimelineEngine::new(NullRenderer::default(), config, extent);
    assert!(matches!(result, Err(TimelineError::InvalidData(_))));
}

#[test]
fn layout_request_accepts_json_from_hosts() {
    let request: LayoutRequest = serde_json::from_str(
        r#"{ "scope": { "Container": "box" }, "force_rebuild": true }"#,
    )
    .expect("request json");
    assert_eq!(request.scope, Some(ScopeKey::container("box")));
    assert!(request.force_rebuild);
    assert!(!request.restoring);
    assert!(request.entities.is_none());
}
