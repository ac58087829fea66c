//! Graph document encoding over fixture graphs.

use loom_core::LoomError;
use loom_graph::{LoomGraph, TensorNode};
use loom_tests::prelude::*;
use loom_tests::fixtures_root;
use pretty_assertions::assert_eq;

fn load(name: &str) -> (Fixture, LoomGraph) {
    let fixture = Fixture::load(&fixtures_root().join("graphs").join(name)).unwrap();
    let graph = fixture.graph().unwrap();
    (fixture, graph)
}

#[test]
fn test_fixture_graph_survives_a_json_round_trip() {
    // GIVEN
    let (_, graph) = load("expression.json");

    // WHEN
    let json = graph.to_json_pretty().unwrap();
    let parsed = LoomGraph::from_json(&json).unwrap();

    // THEN
    assert_eq!(parsed.len(), graph.len());
    assert_eq!(parsed.to_value().unwrap(), graph.to_value().unwrap());
    assert_ne!(parsed.id(), graph.id());
}

#[test]
fn test_typed_bodies_decode_from_fixture() {
    let (fixture, graph) = load("expression.json");

    let x = graph.assert_node_of::<TensorNode>(fixture.id("x").unwrap()).unwrap();
    assert_eq!(x.label(), Some("x"));
    assert_eq!(x.body().dtype, "float32");
    assert_eq!(graph.by_kind::<TensorNode>().count(), 3);
}

#[test]
fn test_duplicate_ids_are_rejected() {
    // GIVEN: two nodes sharing one placeholder
    let source = r#"{"nodes": [
        {"id": "@a", "type": "NoteNode", "body": {"message": "one"}},
        {"id": "@a", "type": "NoteNode", "body": {"message": "two"}}
    ]}"#;
    let fixture = Fixture::parse(source).unwrap();

    // WHEN
    let result = fixture.graph();

    // THEN
    assert!(matches!(result, Err(ScenarioError::Loom(LoomError::DuplicateNodeId(_)))));
}

#[test]
fn test_node_cannot_join_a_second_graph() {
    // GIVEN
    let (fixture, graph) = load("chain.json");
    let owned = graph.get_node(fixture.id("t1").unwrap()).cloned().unwrap();
    let mut other = LoomGraph::new();

    // WHEN
    let result = other.add_node(owned);

    // THEN
    assert!(matches!(result, Err(LoomError::NodeAlreadyOwned { .. })));
    assert!(other.is_empty());
}
