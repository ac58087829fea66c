//! EnvironmentBuilder for constructing an immutable LoomEnvironment.

use crate::environment::{ConstraintEntry, TypeBinding};
use crate::{JsonSchema, LoomConstraint, LoomEnvironment, NodeCheck, ReferenceSchema, TypeSchema};
use loom_core::{LoomError, LoomResult};
use loom_graph::{LoomGraph, LoomNode};
use loom_validation::{CheckResult, ValidationIssueCollector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builder for constructing an immutable LoomEnvironment.
#[derive(Default)]
pub struct EnvironmentBuilder {
    types: BTreeMap<String, TypeBinding>,
    annotation_types: BTreeMap<String, TypeSchema>,
    constraints: Vec<ConstraintEntry>,
    type_aliases: BTreeMap<String, String>,
    url_aliases: BTreeMap<String, String>,
}

impl fmt::Debug for EnvironmentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentBuilder")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("annotation_types", &self.annotation_types.keys().collect::<Vec<_>>())
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

impl EnvironmentBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start registering a node type.
    pub fn register_type(&mut self, name: impl Into<String>) -> TypeBuilder<'_> {
        TypeBuilder {
            builder: self,
            name: name.into(),
            schema: TypeSchema::new(),
            json_schema: None,
            references: Vec::new(),
            check: None,
        }
    }

    /// Register the schema for an annotation key.
    pub fn register_annotation_type(
        &mut self,
        key: impl Into<String>,
        schema: TypeSchema,
    ) -> LoomResult<&mut Self> {
        let key = key.into();
        if self.annotation_types.contains_key(&key) {
            return Err(LoomError::DuplicateType(key));
        }
        self.annotation_types.insert(key, schema);
        Ok(self)
    }

    /// Append a whole-graph constraint.
    pub fn add_constraint<C: LoomConstraint>(&mut self, constraint: C) -> &mut Self {
        self.constraints.push(ConstraintEntry::new(constraint));
        self
    }

    /// Display `node_type` as `alias`.
    pub fn type_alias(&mut self, node_type: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.type_aliases.insert(node_type.into(), alias.into());
        self
    }

    /// Display types of the form `<url>#.../Name` as `<alias>:Name`.
    pub fn url_alias(&mut self, url: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.url_aliases.insert(url.into(), alias.into());
        self
    }

    pub fn supports_node_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Build the environment and check every constraint's requirements.
    pub fn build(self) -> LoomResult<LoomEnvironment> {
        let env = LoomEnvironment {
            types: self.types,
            annotation_types: self.annotation_types,
            constraints: self.constraints,
            type_aliases: self.type_aliases,
            url_aliases: self.url_aliases,
        };

        for entry in &env.constraints {
            entry.constraint.check_requirements(&env)?;
        }

        debug!(
            types = env.types.len(),
            constraints = env.constraints.len(),
            "built environment"
        );
        Ok(env)
    }
}

/// Builder for a node type binding.
pub struct TypeBuilder<'a> {
    builder: &'a mut EnvironmentBuilder,
    name: String,
    schema: TypeSchema,
    json_schema: Option<Value>,
    references: Vec<(String, Vec<String>, Vec<String>)>,
    check: Option<NodeCheck>,
}

impl<'a> TypeBuilder<'a> {
    /// Use a prepared type schema.
    pub fn schema(mut self, schema: TypeSchema) -> Self {
        self.schema = schema;
        self
    }

    /// JSON schema for the node body, compiled by [`done`](Self::done).
    pub fn json_schema(mut self, schema: Value) -> Self {
        self.json_schema = Some(schema);
        self
    }

    /// Declare a reference schema: values at `paths` are ids of nodes of one
    /// of `types` (any type when empty).
    pub fn reference<P, T>(mut self, name: impl Into<String>, paths: P, types: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        self.references.push((
            name.into(),
            paths.into_iter().map(Into::into).collect(),
            types.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Custom check run on every node of this type.
    pub fn check<F>(mut self, check: F) -> Self
    where
        F: Fn(&LoomEnvironment, &LoomGraph, &LoomNode, &mut ValidationIssueCollector) -> CheckResult
            + Send
            + Sync
            + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    /// Finish building this type.
    pub fn done(self) -> LoomResult<()> {
        // Check for duplicate name
        if self.builder.types.contains_key(&self.name) {
            return Err(LoomError::DuplicateType(self.name));
        }

        let mut schema = self.schema;
        if let Some(source) = self.json_schema {
            schema = schema.with_json_schema(JsonSchema::compile(&self.name, source)?);
        }
        for (name, paths, types) in self.references {
            schema = schema.with_reference(name, ReferenceSchema::new(paths)?.with_types(types));
        }

        self.builder.types.insert(
            self.name.clone(),
            TypeBinding {
                name: self.name,
                schema,
                check: self.check,
            },
        );
        Ok(())
    }
}
