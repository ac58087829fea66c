//! Text rendering of validation issues.

use crate::{param_text, Context, ValidationIssue};
use serde_json::Value;

/// Renders issues to a human-readable form.
pub trait IssueFormatter {
    fn format_issue_list(&self, issues: &[ValidationIssue]) -> String;
    fn format_issue(&self, issue: &ValidationIssue) -> String;
    fn format_context(&self, context: &Context) -> String;
}

/// The default multi-line formatter.
///
/// ```text
/// * Error [NodeReferenceError]: Referenced node does not exist
///    └> nodeId: 5e0c…
///
///   - Reference:: $.nodes[@.id=='…'].body.inputs.x[0]
///
///     |> "5e0c…"
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl IssueFormatter for TextFormatter {
    fn format_issue_list(&self, issues: &[ValidationIssue]) -> String {
        if issues.is_empty() {
            return "No Validation Issues".to_string();
        }

        let blocks: Vec<String> = issues.iter().map(|i| self.format_issue(i)).collect();
        format!(
            "Validation failed with {} issues:\n\n{}\n",
            issues.len(),
            blocks.join("\n\n")
        )
    }

    fn format_issue(&self, issue: &ValidationIssue) -> String {
        let mut out = format!("* Error [{}]: {}", issue.issue_type, issue.summary);

        if !issue.params.is_empty() {
            // BTreeMap iteration is already key-sorted.
            let lines: Vec<String> = issue
                .params
                .iter()
                .map(|(k, v)| format!("   └> {k}: {}", param_text(v)))
                .collect();
            out.push('\n');
            out.push_str(&lines.join("\n"));
        }

        if let Some(message) = &issue.message {
            out.push_str("\n\n");
            out.push_str(&reindent(2, message));
        }

        for context in &issue.contexts {
            out.push_str("\n\n");
            out.push_str(&reindent(2, &self.format_context(context)));
        }

        out
    }

    fn format_context(&self, context: &Context) -> String {
        let mut out = format!("- {}::", context.name);
        if let Some(path) = &context.jsonpath {
            out.push(' ');
            out.push_str(path);
        }

        if let Some(message) = &context.message {
            let m = message.trim();
            if !m.is_empty() {
                out.push_str("\n\n");
                out.push_str(&indent("  ", &split_and_remove_common_indent(m)));
            }
        }

        if let Some(data) = &context.data {
            out.push_str("\n\n");
            let pretty = pretty_json(data);
            let lines: Vec<&str> = pretty.split('\n').collect();
            out.push_str(&indent("  |> ", &lines));
        }

        out
    }
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Split into lines, drop trailing whitespace and remove the common indent.
///
/// Blank lines do not participate in the common indent.
pub fn split_and_remove_common_indent(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.trim_end().split('\n').map(str::trim_end).collect();
    let common = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .into_iter()
        .map(|l| l.get(common..).unwrap_or(l))
        .collect()
}

/// Prefix every line; lines that end up blank carry no trailing whitespace.
pub fn indent<S: AsRef<str>>(prefix: &str, lines: &[S]) -> String {
    lines
        .iter()
        .map(|l| format!("{prefix}{}", l.as_ref()).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove the common indent, then indent by `n` spaces.
pub fn reindent(n: usize, text: &str) -> String {
    indent(&" ".repeat(n), &split_and_remove_common_indent(text))
}
