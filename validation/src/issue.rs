//! Validation issue types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known issue type names.
pub mod issue_types {
    /// A node body or annotation does not conform to its schema.
    pub const NODE_SCHEMA_ERROR: &str = "NodeSchemaError";
    /// A reference field is malformed, dangling, or targets the wrong kind.
    pub const NODE_REFERENCE_ERROR: &str = "NodeReferenceError";
    /// A node violates a semantic rule.
    pub const NODE_VALIDATION_ERROR: &str = "NodeValidationError";
    /// The tensor/operation link graph contains a cycle.
    pub const REFERENCE_CYCLE_ERROR: &str = "ReferenceCycleError";
    /// A node's type has no registered binding.
    pub const UNKNOWN_NODE_TYPE: &str = "UnknownNodeType";
}

/// A named piece of supporting detail attached to an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Context {
    /// Create a context with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: None,
            jsonpath: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_jsonpath(mut self, jsonpath: impl Into<String>) -> Self {
        self.jsonpath = Some(jsonpath.into());
        self
    }

    /// Attach data; anything serializable is converted to a JSON tree.
    pub fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
}

impl ValidationIssue {
    /// Start building an issue of the given type.
    pub fn builder(issue_type: impl Into<String>) -> ValidationIssueBuilder {
        ValidationIssueBuilder {
            issue: ValidationIssue {
                issue_type: issue_type.into(),
                summary: String::new(),
                message: None,
                params: BTreeMap::new(),
                contexts: Vec::new(),
            },
        }
    }

    /// Look up a context by name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }
}

/// Builder for [`ValidationIssue`].
#[derive(Debug, Clone)]
pub struct ValidationIssueBuilder {
    issue: ValidationIssue,
}

impl ValidationIssueBuilder {
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.issue.summary = summary.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.issue.message = Some(message.into());
        self
    }

    /// Add a param; the value is stored as a JSON tree.
    pub fn param(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.issue.params.insert(key.into(), value);
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.issue.contexts.push(context);
        self
    }

    pub fn contexts(mut self, contexts: impl IntoIterator<Item = Context>) -> Self {
        self.issue.contexts.extend(contexts);
        self
    }

    pub fn build(self) -> ValidationIssue {
        self.issue
    }
}

impl From<ValidationIssueBuilder> for ValidationIssue {
    fn from(builder: ValidationIssueBuilder) -> Self {
        builder.build()
    }
}

/// Render a param value for display; strings are shown without quotes.
pub fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a list of names as `[a, b]`.
pub fn display_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    format!("[{}]", parts.join(", "))
}
