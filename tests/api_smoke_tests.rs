use timeline_rs::api::{LayoutMode, LayoutRequest, TimelineEngine, TimelineEngineConfig};
use timeline_rs::core::{BoundingBox, Node, NodeId, Point, ScaffoldId, ScopeKey};
use timeline_rs::render::NullRenderer;

#[test]
fn engine_smoke_flow() {
    let extent = BoundingBox::new(0.0, 0.0, 1000.0, 800.0).expect("extent");
    let mut engine = TimelineEngine::new(
        NullRenderer::default(),
        TimelineEngineConfig::default(),
        extent,
    )
    .expect("engine init");

    engine.insert_node(Node::entity("launch", Point::new(0.0, 0.0)).with_timestamp("2023-01-15"));
    engine.insert_node(
        Node::entity("review", Point::new(0.0, 0.0)).with_timestamp("2023-04-15T12:00:00Z"),
    );
    engine.insert_node(Node::entity("untimed", Point::new(5.0, 5.0)));

    let outcome = engine
        .layout(LayoutRequest::whole_graph())
        .expect("layout")
        .expect("participants");
    assert_eq!(outcome.mode, LayoutMode::FirstBuild);
    assert_eq!(outcome.scope, ScopeKey::Root);
    assert_eq!(outcome.placements.len(), 2);

    let launch = engine.graph().get(&NodeId::new("launch")).expect("launch");
    assert_eq!(launch.locked_x, Some(launch.position.x));
    let review = engine.graph().get(&NodeId::new("review")).expect("review");
    assert!(launch.position.x < review.position.x);

    assert!(engine.scaffold(&ScaffoldId::bar(&ScopeKey::Root)).is_some());
    assert!(
        engine
            .scaffolding()
            .anchor_for(&ScopeKey::Root, &NodeId::new("review"))
            .is_some()
    );
    let untimed = engine.graph().get(&NodeId::new("untimed")).expect("untimed");
    assert_eq!(untimed.position, Point::new(5.0, 5.0));
    assert_eq!(untimed.locked_x, None);

    engine.render().expect("render should succeed");
    let tick_count = outcome.ticks.ticks.len();
    let renderer = engine.into_renderer();
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_rect_count, 1);
    assert_eq!(renderer.last_line_count, tick_count + 2);
    assert_eq!(renderer.last_text_count, tick_count);
}

#[test]
fn empty_graph_renders_empty_frame() {
    let extent = BoundingBox::new(0.0, 0.0, 640.0, 480.0).expect("extent");
    let mut engine = TimelineEngine::new(
        NullRenderer::default(),
        TimelineEngineConfig::default(),
        extent,
    )
    .expect("engine init");

    assert!(engine.layout(LayoutRequest::whole_graph()).expect("layout").is_none());
    assert!(engine.build_render_frame().is_empty());
    engine.render().expect("render should succeed");
    assert_eq!(engine.renderer().frames_rendered, 1);
}

#[test]
fn render_frame_mirrors_scaffolding_geometry() {
    let extent = BoundingBox::new(0.0, 0.0, 1000.0, 800.0).expect("extent");
    let mut engine = TimelineEngine::new(
        NullRenderer::default(),
        TimelineEngineConfig::default(),
        extent,
    )
    .expect("engine init");
    engine.insert_node(Node::entity("a", Point::new(0.0, 0.0)).with_timestamp("2024-03-01"));
    engine.insert_node(Node::entity("b", Point::new(0.0, 0.0)).with_timestamp("2024-03-05"));

    let outcome = engine
        .layout(LayoutRequest::whole_graph())
        .expect("layout")
        .expect("participants");
    let frame = engine.build_render_frame();
    frame.validate().expect("valid frame");

    let bar = frame.rects.first().expect("bar rect");
    let bar_height = engine.config().bar_style.height;
    assert!((bar.x - outcome.baseline.bar_start).abs() < 1e-9);
    assert!((bar.width - outcome.baseline.bar_length).abs() < 1e-9);
    assert!((bar.y + bar_height / 2.0 - outcome.baseline.center_y).abs() < 1e-9);

    let labels: Vec<&str> = frame.texts.iter().map(|text| text.text.as_str()).collect();
    let planned: Vec<&str> = outcome
        .ticks
        .ticks
        .iter()
        .map(|tick| tick.label.as_str())
        .collect();
    assert_eq!(labels, planned);
}
