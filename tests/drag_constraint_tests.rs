use approx::assert_relative_eq;
use timeline_rs::TimelineError;
use timeline_rs::api::{LayoutRequest, TimelineEngine, TimelineEngineConfig};
use timeline_rs::core::{BoundingBox, Node, NodeId, Point, ScaffoldId, ScopeKey};
use timeline_rs::interaction::{ConstraintDecision, DragEvent};
use timeline_rs::render::NullRenderer;

const T0: f64 = 1_700_000_000_000.0;

fn engine() -> TimelineEngine<NullRenderer> {
    let extent = BoundingBox::new(0.0, 0.0, 1000.0, 800.0).expect("extent");
    TimelineEngine::new(
        NullRenderer::default(),
        TimelineEngineConfig::default(),
        extent,
    )
    .expect("engine init")
}

fn entity(id: &str, time: f64) -> Node {
    Node::entity(id, Point::new(0.0, 0.0)).with_timestamp(time)
}

fn laid_out_pair() -> TimelineEngine<NullRenderer> {
    let mut engine = engine();
    engine.insert_node(entity("a", T0));
    engine.insert_node(entity("b", T0 + 1000.0));
    engine.layout(LayoutRequest::whole_graph()).expect("layout");
    engine
}

#[test]
fn locked_entity_snaps_back_on_x_only() {
    let mut engine = laid_out_pair();
    let id = NodeId::new("a");
    let locked_x = engine.graph().get(&id).expect("a").locked_x.expect("locked");

    engine
        .graph_mut()
        .set_position(&id, Point::new(999.0, 123.0))
        .expect("move");
    let decision = engine.on_entity_event(&id, DragEvent::Drag).expect("event");
    assert_eq!(decision, ConstraintDecision::Snap { x: locked_x });
    assert_eq!(engine.graph().get(&id).expect("a").position, Point::new(locked_x, 123.0));

    let decision = engine.on_entity_event(&id, DragEvent::Release).expect("event");
    assert_eq!(decision, ConstraintDecision::AlreadyPinned);
}

#[test]
fn suppression_skips_exactly_one_snap() {
    let mut engine = laid_out_pair();
    let id = NodeId::new("b");
    let locked_x = engine.graph().get(&id).expect("b").locked_x.expect("locked");

    engine.suppress_next_snap(&id).expect("suppress");
    engine
        .graph_mut()
        .set_position(&id, Point::new(10.0, 10.0))
        .expect("move");
    assert_eq!(
        engine.on_entity_event(&id, DragEvent::Position).expect("event"),
        ConstraintDecision::Suppressed
    );
    assert_eq!(engine.graph().get(&id).expect("b").position.x, 10.0);

    assert_eq!(
        engine.on_entity_event(&id, DragEvent::Position).expect("event"),
        ConstraintDecision::Snap { x: locked_x }
    );
}

#[test]
fn free_nodes_and_containers_are_unconstrained() {
    let mut engine = laid_out_pair();
    engine.insert_node(Node::entity("free", Point::new(5.0, 5.0)));
    engine.insert_node(Node::container("box"));

    for id in ["free", "box"] {
        let decision = engine
            .on_entity_event(&NodeId::new(id), DragEvent::Grab)
            .expect("event");
        assert_eq!(decision, ConstraintDecision::Unconstrained);
    }

    let err = engine
        .on_entity_event(&NodeId::new("ghost"), DragEvent::Drag)
        .expect_err("unknown node");
    assert!(matches!(err, TimelineError::UnknownNode(_)));
}

#[test]
fn container_drag_carries_entities_scaffolding_and_baseline() {
    let mut engine = engine();
    let bounds = BoundingBox::new(100.0, 100.0, 700.0, 500.0).expect("bounds");
    engine.insert_node(Node::container("box").with_bounds(bounds));
    engine.insert_node(entity("c1", T0).with_parent("box"));
    engine.insert_node(entity("c2", T0 + 1000.0).with_parent("box"));

    let scope = ScopeKey::container("box");
    engine
        .layout(LayoutRequest::for_scope(scope.clone()))
        .expect("layout");
    let before = engine.graph().get(&NodeId::new("c1")).expect("c1").position;
    let baseline_before = *engine.baseline(&scope).expect("baseline");
    let anchor_id = ScaffoldId::anchor(&scope, &NodeId::new("c1"));
    let anchor_before = engine.scaffold(&anchor_id).expect("anchor").position;

    let container = NodeId::new("box");
    engine.grab_container(&container).expect("grab");
    let c1 = engine.graph().get(&NodeId::new("c1")).expect("c1");
    assert_eq!(c1.locked_x, None);
    let bar = engine.scaffold(&ScaffoldId::bar(&scope)).expect("bar");
    assert_eq!(bar.parent.as_ref(), Some(&container));
    let anchor = engine.scaffold(&anchor_id).expect("anchor");
    assert!(!anchor.locked);

    engine.drag_container(&container, 25.0, -10.0).expect("drag");
    engine.drag_container(&container, 15.0, -10.0).expect("drag");
    let outcome = engine.release_container(&container).expect("release");

    assert!(outcome.moved);
    assert_relative_eq!(outcome.dx, 40.0);
    assert_relative_eq!(outcome.dy, -20.0);
    assert_eq!(outcome.refreshed_scopes, vec![scope.clone()]);

    let c1 = engine.graph().get(&NodeId::new("c1")).expect("c1");
    assert_relative_eq!(c1.position.x, before.x + 40.0, epsilon = 1e-9);
    assert_relative_eq!(c1.position.y, before.y - 20.0, epsilon = 1e-9);
    assert_eq!(c1.locked_x, Some(c1.position.x));

    let baseline = engine.baseline(&scope).expect("baseline");
    assert_relative_eq!(baseline.start_x, baseline_before.start_x + 40.0);
    assert_relative_eq!(baseline.center_y, baseline_before.center_y - 20.0);
    assert_relative_eq!(baseline.width, baseline_before.width);

    let anchor = engine.scaffold(&anchor_id).expect("anchor");
    assert_relative_eq!(anchor.position.x, anchor_before.x + 40.0, epsilon = 1e-9);
    assert_relative_eq!(anchor.position.y, anchor_before.y - 20.0, epsilon = 1e-9);
    assert!(anchor.locked);
    assert_eq!(anchor.parent, None);
    let bar = engine.scaffold(&ScaffoldId::bar(&scope)).expect("bar");
    assert_eq!(bar.parent, None);
    assert!(!bar.locked);
}

#[test]
fn release_without_motion_only_relocks() {
    let mut engine = engine();
    let bounds = BoundingBox::new(100.0, 100.0, 700.0, 500.0).expect("bounds");
    engine.insert_node(Node::container("box").with_bounds(bounds));
    engine.insert_node(entity("c1", T0).with_parent("box"));
    let scope = ScopeKey::container("box");
    engine
        .layout(LayoutRequest::for_scope(scope.clone()))
        .expect("layout");
    let baseline_before = *engine.baseline(&scope).expect("baseline");
    let x_before = engine.graph().get(&NodeId::new("c1")).expect("c1").position.x;

    let container = NodeId::new("box");
    engine.grab_container(&container).expect("grab");
    let outcome = engine.release_container(&container).expect("release");

    assert!(!outcome.moved);
    assert!(outcome.refreshed_scopes.is_empty());
    assert_eq!(engine.baseline(&scope), Some(&baseline_before));
    let c1 = engine.graph().get(&NodeId::new("c1")).expect("c1");
    assert_eq!(c1.locked_x, Some(x_before));
    let anchor = engine
        .scaffold(&ScaffoldId::anchor(&scope, &NodeId::new("c1")))
        .expect("anchor");
    assert!(anchor.locked);
    assert_eq!(anchor.parent, None);
}

#[test]
fn root_axis_follows_a_container_holding_root_participants() {
    let mut engine = engine();
    let bounds = BoundingBox::new(100.0, 100.0, 300.0, 300.0).expect("bounds");
    engine.insert_node(Node::container("box").with_bounds(bounds));
    engine.insert_node(entity("inside", T0).with_parent("box"));
    engine.insert_node(entity("outside", T0 + 1000.0));
    engine.layout(LayoutRequest::whole_graph()).expect("root layout");
    let start_before = engine.baseline(&ScopeKey::Root).expect("baseline").start_x;

    let container = NodeId::new("box");
    engine.grab_container(&container).expect("grab");
    let bar = engine
        .scaffold(&ScaffoldId::bar(&ScopeKey::Root))
        .expect("root bar");
    assert_eq!(bar.parent.as_ref(), Some(&container));

    engine.drag_container(&container, 30.0, 0.0).expect("drag");
    let outcome = engine.release_container(&container).expect("release");
    assert_eq!(outcome.refreshed_scopes, vec![ScopeKey::Root]);
    assert_relative_eq!(
        engine.baseline(&ScopeKey::Root).expect("baseline").start_x,
        start_before + 30.0
    );
}

#[test]
fn container_drag_errors() {
    let mut engine = laid_out_pair();
    engine.insert_node(Node::container("box"));

    let err = engine
        .grab_container(&NodeId::new("a"))
        .expect_err("not a container");
    assert!(matches!(err, TimelineError::NotAContainer(_)));

    let err = engine
        .drag_container(&NodeId::new("box"), 1.0, 1.0)
        .expect_err("no session");
    assert!(matches!(err, TimelineError::NoDragSession(_)));

    let err = engine
        .release_container(&NodeId::new("box"))
        .expect_err("no session");
    assert!(matches!(err, TimelineError::NoDragSession(_)));
}
