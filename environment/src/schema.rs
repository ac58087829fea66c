//! Field schemas and reference schemas.

use loom_core::jsonpath::{concat_json_path, json_path_member, json_pointer_to_json_path, JsonPath};
use loom_core::{LoomError, LoomResult, NodeId};
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{display_list, issue_types, Context, ValidationIssue, ValidationIssueCollector};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Values whose rendered JSON is shorter than this are quoted in summaries.
const INLINE_DATA_LIMIT: usize = 50;

// ==================== JSON Schema ====================

/// A compiled JSON schema together with its source document.
#[derive(Clone)]
pub struct JsonSchema {
    source: Value,
    validator: Arc<jsonschema::Validator>,
}

impl JsonSchema {
    /// Compile a schema; `name` is only used in the error.
    pub fn compile(name: &str, source: Value) -> LoomResult<Self> {
        let validator = jsonschema::validator_for(&source)
            .map_err(|err| LoomError::invalid_schema(name, err.to_string()))?;
        Ok(Self {
            source,
            validator: Arc::new(validator),
        })
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Turns JSON schema errors into validation issues.
///
/// Each error becomes one issue whose `Data` context points at the offending
/// sub-value, followed by the scan's own contexts.
#[derive(Debug, Clone)]
pub struct IssueScan<'s> {
    schema: &'s JsonSchema,
    issue_type: String,
    summary_prefix: String,
    json_path_prefix: String,
    params: Vec<(String, Value)>,
    contexts: Vec<Context>,
}

impl<'s> IssueScan<'s> {
    pub fn new(schema: &'s JsonSchema, issue_type: impl Into<String>) -> Self {
        Self {
            schema,
            issue_type: issue_type.into(),
            summary_prefix: String::new(),
            json_path_prefix: "$".to_string(),
            params: Vec::new(),
            contexts: Vec::new(),
        }
    }

    pub fn summary_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.summary_prefix = prefix.into();
        self
    }

    /// Path of the scanned value inside the graph document.
    pub fn json_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.json_path_prefix = prefix.into();
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.contexts.push(context);
        self
    }

    /// Validate `data`, adding one issue per schema error. Returns the number added.
    pub fn scan(&self, data: &Value, collector: &mut ValidationIssueCollector) -> usize {
        let mut added = 0;
        for error in self.schema.validator.iter_errors(data) {
            let relative = json_pointer_to_json_path(&error.instance_path.to_string(), data);
            let absolute = concat_json_path([self.json_path_prefix.as_str(), relative.as_str()]);
            let schema_path = error.schema_path.to_string();
            let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
            let actual: Value = error.instance.clone().into_owned();

            let mut summary = format!("{}[{}] :: {}", self.summary_prefix, keyword, relative);
            let rendered = actual.to_string();
            if rendered.len() < INLINE_DATA_LIMIT {
                summary.push_str(": ");
                summary.push_str(&rendered);
            }

            let mut issue = ValidationIssue::builder(&self.issue_type)
                .summary(summary)
                .message(error.to_string())
                .param("path", &absolute)
                .param("schemaPath", &schema_path)
                .param("keyword", &keyword);
            for (key, value) in &self.params {
                issue = issue.param(key, value);
            }
            collector.add(
                issue
                    .context(Context::new("Data").with_jsonpath(absolute).with_data(actual))
                    .contexts(self.contexts.iter().cloned()),
            );
            added += 1;
        }
        added
    }
}

// ==================== Reference Schemas ====================

/// Declares that the values at `paths` are ids of nodes with one of `types`.
///
/// An empty `types` list accepts any node type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSchema {
    paths: Vec<JsonPath>,
    types: Vec<String>,
}

impl ReferenceSchema {
    pub fn new<I, S>(paths: I) -> LoomResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .map(|p| JsonPath::parse(p.as_ref()))
            .collect::<LoomResult<Vec<_>>>()?;
        Ok(Self {
            paths,
            types: Vec::new(),
        })
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn paths(&self) -> &[JsonPath] {
        &self.paths
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn allows_type(&self, node_type: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t == node_type)
    }

    /// Well-formed ids found in `data`, with their paths. Malformed values are skipped.
    pub fn collect_ids(&self, data: &Value) -> Vec<(String, NodeId)> {
        self.paths
            .iter()
            .flat_map(|path| path.select(data))
            .filter_map(|found| {
                let id = found.value.as_str()?.parse().ok()?;
                Some((found.path, id))
            })
            .collect()
    }

    pub fn to_value(&self) -> Value {
        let paths: Vec<&str> = self.paths.iter().map(JsonPath::as_str).collect();
        json!({"paths": paths, "types": self.types})
    }
}

// ==================== Type Schemas ====================

/// Where a schema-checked value lives, and how its issues are labelled.
#[derive(Debug, Clone)]
pub struct SchemaSite {
    label: &'static str,
    json_path: String,
    params: Vec<(&'static str, Value)>,
}

impl SchemaSite {
    /// The body of `node`.
    pub fn body(node: &LoomNode) -> Self {
        Self {
            label: "Body",
            json_path: concat_json_path([node.json_path().as_str(), "body"]),
            params: vec![("nodeType", Value::from(node.node_type()))],
        }
    }

    /// The annotation `key` of `node`.
    pub fn annotation(node: &LoomNode, key: &str) -> Self {
        let annotations = concat_json_path([node.json_path().as_str(), "annotations"]);
        Self {
            label: "Annotation",
            json_path: json_path_member(&annotations, key),
            params: vec![("annotationType", Value::from(key))],
        }
    }

    pub fn json_path(&self) -> &str {
        &self.json_path
    }

    fn data_context(&self, data: &Value) -> Context {
        Context::new(self.label)
            .with_jsonpath(&self.json_path)
            .with_data(data)
    }
}

/// The schema of one node or annotation type: an optional JSON schema plus
/// named reference schemas.
#[derive(Debug, Clone, Default)]
pub struct TypeSchema {
    json_schema: Option<JsonSchema>,
    reference_schemas: BTreeMap<String, ReferenceSchema>,
}

impl TypeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json_schema(mut self, schema: JsonSchema) -> Self {
        self.json_schema = Some(schema);
        self
    }

    pub fn with_reference(mut self, name: impl Into<String>, schema: ReferenceSchema) -> Self {
        self.reference_schemas.insert(name.into(), schema);
        self
    }

    pub fn json_schema(&self) -> Option<&JsonSchema> {
        self.json_schema.as_ref()
    }

    pub fn reference_schemas(&self) -> &BTreeMap<String, ReferenceSchema> {
        &self.reference_schemas
    }

    pub fn reference_schema(&self, name: &str) -> Option<&ReferenceSchema> {
        self.reference_schemas.get(name)
    }

    /// The reference schema one of whose paths selects `path` in `data`.
    ///
    /// `path` is a normalized path relative to `data`, such as
    /// `$.inputs.x[0].tensorId`.
    pub fn reference_at(&self, data: &Value, path: &str) -> Option<(&str, &ReferenceSchema)> {
        self.reference_schemas
            .iter()
            .find(|(_, reference)| {
                reference
                    .paths
                    .iter()
                    .any(|p| p.select(data).iter().any(|found| found.path == path))
            })
            .map(|(name, reference)| (name.as_str(), reference))
    }

    /// Check `data` against the JSON schema and every reference schema.
    ///
    /// Returns the number of JSON schema issues added; reference issues are
    /// not counted.
    pub fn validate_value(
        &self,
        graph: &LoomGraph,
        site: &SchemaSite,
        data: &Value,
        collector: &mut ValidationIssueCollector,
    ) -> usize {
        let mut schema_issues = 0;

        if let Some(schema) = &self.json_schema {
            let mut scan = IssueScan::new(schema, issue_types::NODE_SCHEMA_ERROR)
                .summary_prefix(format!("{} ", site.label))
                .json_path_prefix(&site.json_path)
                .context(site.data_context(data));
            for (key, value) in &site.params {
                scan = scan.param(*key, value.clone());
            }
            schema_issues = scan.scan(data, collector);
        }

        for (name, reference) in &self.reference_schemas {
            self.check_references(graph, site, name, reference, data, collector);
        }

        schema_issues
    }

    fn check_references(
        &self,
        graph: &LoomGraph,
        site: &SchemaSite,
        name: &str,
        reference: &ReferenceSchema,
        data: &Value,
        collector: &mut ValidationIssueCollector,
    ) {
        let trailing = [
            Context::new("ReferenceSchema")
                .with_message(name)
                .with_data(reference.to_value()),
            site.data_context(data),
        ];

        for found in reference.paths.iter().flat_map(|path| path.select(data)) {
            let reference_path = concat_json_path([site.json_path.as_str(), found.path.as_str()]);
            let at = Context::new("Reference").with_jsonpath(reference_path);

            let parsed = found.value.as_str().and_then(|s| s.parse::<NodeId>().ok());
            let Some(id) = parsed else {
                collector.add(
                    ValidationIssue::builder(issue_types::NODE_REFERENCE_ERROR)
                        .summary("Malformed node reference is not an ID")
                        .context(at.with_data(found.value))
                        .contexts(trailing.iter().cloned()),
                );
                continue;
            };

            match graph.get_node(id) {
                None => collector.add(
                    ValidationIssue::builder(issue_types::NODE_REFERENCE_ERROR)
                        .summary("Referenced node does not exist")
                        .param("nodeId", id)
                        .param("nodeType", display_list(&reference.types))
                        .context(at.with_data(id))
                        .contexts(trailing.iter().cloned()),
                ),
                Some(target) if !reference.allows_type(target.node_type()) => collector.add(
                    ValidationIssue::builder(issue_types::NODE_REFERENCE_ERROR)
                        .summary("Referenced node has the wrong type")
                        .param("nodeId", id)
                        .param("expectedType", display_list(&reference.types))
                        .param("actualType", target.node_type())
                        .context(at.with_data(id))
                        .context(target.as_validation_context("Target"))
                        .contexts(trailing.iter().cloned()),
                ),
                Some(_) => {}
            }
        }
    }
}
