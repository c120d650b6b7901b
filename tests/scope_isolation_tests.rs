use timeline_rs::api::{GeometrySource, LayoutRequest, TimelineEngine, TimelineEngineConfig};
use timeline_rs::core::{
    BoundingBox, Node, NodeId, Point, ScaffoldElement, ScaffoldId, ScopeKey,
};
use timeline_rs::render::NullRenderer;

const T0: f64 = 1_700_000_000_000.0;

fn entity(id: &str, time: f64) -> Node {
    Node::entity(id, Point::new(0.0, 0.0)).with_timestamp(time)
}

fn populated_engine() -> TimelineEngine<NullRenderer> {
    let extent = BoundingBox::new(0.0, 0.0, 1000.0, 800.0).expect("extent");
    let mut engine = TimelineEngine::new(
        NullRenderer::default(),
        TimelineEngineConfig::default(),
        extent,
    )
    .expect("engine init");

    engine.insert_node(
        Node::container("left").with_bounds(BoundingBox::new(100.0, 100.0, 500.0, 300.0).expect("bounds")),
    );
    engine.insert_node(
        Node::container("right").with_bounds(BoundingBox::new(600.0, 100.0, 950.0, 300.0).expect("bounds")),
    );
    engine.insert_node(entity("l1", T0).with_parent("left"));
    engine.insert_node(entity("l2", T0 + 1000.0).with_parent("left"));
    engine.insert_node(entity("r1", T0 + 200.0).with_parent("right"));
    engine.insert_node(entity("r2", T0 + 900.0).with_parent("right"));
    engine.insert_node(entity("g1", T0 + 100.0));
    engine.insert_node(entity("g2", T0 + 700.0));
    engine
}

fn scope_elements(engine: &TimelineEngine<NullRenderer>, scope: &ScopeKey) -> Vec<ScaffoldElement> {
    engine.scaffolding().elements_in_scope(scope).cloned().collect()
}

fn layout_all(engine: &mut TimelineEngine<NullRenderer>) {
    for scope in [ScopeKey::container("left"), ScopeKey::container("right")] {
        engine
            .layout(LayoutRequest::for_scope(scope))
            .expect("container layout");
    }
    engine.layout(LayoutRequest::whole_graph()).expect("root layout");
}

#[test]
fn root_excludes_entities_claimed_by_containers() {
    let mut engine = populated_engine();
    layout_all(&mut engine);

    assert_eq!(
        engine.participants(&ScopeKey::Root),
        vec![NodeId::new("g1"), NodeId::new("g2")]
    );
    assert_eq!(
        engine.participants(&ScopeKey::container("left")),
        vec![NodeId::new("l1"), NodeId::new("l2")]
    );
    for scope in [
        ScopeKey::Root,
        ScopeKey::container("left"),
        ScopeKey::container("right"),
    ] {
        assert!(engine.scaffold(&ScaffoldId::bar(&scope)).is_some());
        assert!(engine.baseline(&scope).is_some());
    }
}

#[test]
fn entity_subsets_resolve_their_scope() {
    let mut engine = populated_engine();

    let outcome = engine
        .layout(LayoutRequest::for_entities([NodeId::new("l1"), NodeId::new("l2")]))
        .expect("layout")
        .expect("participants");
    assert_eq!(outcome.scope, ScopeKey::container("left"));

    let outcome = engine
        .layout(LayoutRequest::for_entities([NodeId::new("l1"), NodeId::new("r1")]))
        .expect("layout")
        .expect("participants");
    assert_eq!(outcome.scope, ScopeKey::Root);

    let outcome = engine
        .layout(
            LayoutRequest::for_entities([NodeId::new("r1"), NodeId::new("r2")])
                .with_scope(ScopeKey::container("left")),
        )
        .expect("layout")
        .expect("participants");
    assert_eq!(outcome.scope, ScopeKey::container("left"));
}

#[test]
fn relayout_of_one_container_leaves_other_scopes_untouched() {
    let mut engine = populated_engine();
    layout_all(&mut engine);

    let right = ScopeKey::container("right");
    let right_elements = scope_elements(&engine, &right);
    let right_baseline = engine.baseline(&right).copied();
    let root_elements = scope_elements(&engine, &ScopeKey::Root);
    let right_entity = engine.graph().get(&NodeId::new("r1")).cloned();

    engine
        .graph_mut()
        .get_mut(&NodeId::new("left"))
        .expect("left")
        .bounds = Some(BoundingBox::new(100.0, 100.0, 560.0, 300.0).expect("bounds"));
    let outcome = engine
        .layout(LayoutRequest::for_scope(ScopeKey::container("left")))
        .expect("layout")
        .expect("participants");
    assert_eq!(outcome.geometry, GeometrySource::Recomputed);

    engine
        .layout(LayoutRequest::for_scope(ScopeKey::container("left")).force_rebuild(true))
        .expect("rebuild");

    assert_eq!(scope_elements(&engine, &right), right_elements);
    assert_eq!(engine.baseline(&right).copied(), right_baseline);
    assert_eq!(scope_elements(&engine, &ScopeKey::Root), root_elements);
    assert_eq!(engine.graph().get(&NodeId::new("r1")).cloned(), right_entity);
}

#[test]
fn teardown_is_scoped() {
    let mut engine = populated_engine();
    layout_all(&mut engine);
    let left = ScopeKey::container("left");
    let right = ScopeKey::container("right");
    let right_elements = scope_elements(&engine, &right);

    engine.teardown_scope(&left);
    assert!(scope_elements(&engine, &left).is_empty());
    assert_eq!(engine.scaffolding().connectors_in_scope(&left).count(), 0);
    assert!(engine.baseline(&left).is_none());
    assert!(engine.participants(&left).is_empty());

    assert_eq!(scope_elements(&engine, &right), right_elements);
    assert!(engine.baseline(&ScopeKey::Root).is_some());
}

#[test]
fn each_scope_keeps_its_own_bar_style() {
    let mut engine = populated_engine();
    let left = ScopeKey::container("left");
    let right = ScopeKey::container("right");

    let styled = timeline_rs::api::BarStyleOverride {
        height: Some(14.0),
        color: None,
        class_name: Some("left-bar".to_owned()),
    };
    engine
        .layout(LayoutRequest::for_scope(left.clone()).with_bar_style(styled))
        .expect("left layout");
    engine
        .layout(LayoutRequest::for_scope(right.clone()))
        .expect("right layout");

    let left_bar = engine.scaffold(&ScaffoldId::bar(&left)).expect("left bar");
    let right_bar = engine.scaffold(&ScaffoldId::bar(&right)).expect("right bar");
    assert_eq!(left_bar.style.class_name, "left-bar");
    assert_eq!(right_bar.style.class_name, engine.config().bar_style.class_name);
}
