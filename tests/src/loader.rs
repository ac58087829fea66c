//! Loader for graph fixtures.
//!
//! Fixture documents are ordinary graph JSON, except that any string of the
//! form `"@name"` is replaced by a node id. The same name always maps to the
//! same id within one fixture, so nodes can refer to each other by name.

use loom_core::NodeId;
use loom_graph::LoomGraph;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ScenarioError, ScenarioResult};

/// A parsed fixture with its names resolved to ids.
#[derive(Debug, Clone)]
pub struct Fixture {
    document: Value,
    names: BTreeMap<String, NodeId>,
}

impl Fixture {
    /// Parse a fixture from a string.
    pub fn parse(source: &str) -> ScenarioResult<Self> {
        let raw: Value = serde_json::from_str(source)
            .map_err(|e| ScenarioError::fixture_parse("<inline>", e.to_string()))?;
        let mut names = BTreeMap::new();
        let document = resolve_names(raw, &mut names);
        Ok(Self { document, names })
    }

    /// Load and parse a fixture from disk.
    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| ScenarioError::file_read(path, e))?;
        Self::parse(&source).map_err(|e| ScenarioError::fixture_parse(path, e.to_string()))
    }

    /// The resolved graph document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Decode the document into a graph.
    pub fn graph(&self) -> ScenarioResult<LoomGraph> {
        Ok(LoomGraph::from_value(self.document.clone())?)
    }

    /// The id bound to `@name`.
    pub fn id(&self, name: &str) -> ScenarioResult<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownFixtureName {
                name: name.to_string(),
            })
    }

    /// The name bound to `id`, if any.
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, bound)| **bound == id)
            .map(|(name, _)| name.as_str())
    }

    /// Replace `@name` placeholders in `text` with their ids.
    pub fn substitute(&self, text: &str) -> String {
        match text.strip_prefix('@').and_then(|name| self.names.get(name)) {
            Some(id) => id.to_string(),
            None => text.to_string(),
        }
    }
}

fn is_placeholder(text: &str) -> Option<&str> {
    let name = text.strip_prefix('@')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(name)
}

fn resolve_names(value: Value, names: &mut BTreeMap<String, NodeId>) -> Value {
    match value {
        Value::String(text) => match is_placeholder(&text) {
            Some(name) => {
                let id = *names.entry(name.to_string()).or_insert_with(NodeId::random);
                Value::String(id.to_string())
            }
            None => Value::String(text),
        },
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| resolve_names(item, names))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, item)| (key, resolve_names(item, names)))
                .collect(),
        ),
        other => other,
    }
}

/// Get the fixtures root directory.
pub fn fixtures_root() -> PathBuf {
    match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => PathBuf::from(manifest_dir).join("fixtures"),
        Err(_) => PathBuf::from("fixtures"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_names_resolve_to_shared_ids() {
        // GIVEN
        let source = r#"{"nodes": [
            {"id": "@t", "type": "TensorNode", "body": {"dtype": "int32", "shape": [1]}},
            {"id": "@op", "type": "OperationNode",
             "body": {"opName": "id",
                      "inputs": {"x": [{"tensorId": "@t", "range": {"start": [0], "end": [1]}}]},
                      "outputs": {}}}
        ]}"#;

        // WHEN
        let fixture = Fixture::parse(source).unwrap();
        let graph = fixture.graph().unwrap();

        // THEN
        let t = fixture.id("t").unwrap();
        let op = fixture.id("op").unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(
            fixture.document()["nodes"][1]["body"]["inputs"]["x"][0]["tensorId"],
            Value::String(t.to_string())
        );
        assert_eq!(fixture.name_of(op), Some("op"));
        assert_eq!(fixture.substitute("@t"), t.to_string());
        assert_eq!(fixture.substitute("plain"), "plain");
    }

    #[test]
    fn test_email_like_strings_are_not_names() {
        let fixture = Fixture::parse(r#"{"nodes": [], "note": "a@b", "odd": "@"}"#).unwrap();
        assert_eq!(fixture.document()["note"], "a@b");
        assert_eq!(fixture.document()["odd"], "@");
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let fixture = Fixture::parse(r#"{"nodes": []}"#).unwrap();
        assert!(matches!(
            fixture.id("missing"),
            Err(ScenarioError::UnknownFixtureName { .. })
        ));
    }
}
