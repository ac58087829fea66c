//! Validation pass properties over fixture graphs.

use loom_tests::prelude::*;
use loom_validation::issue_types;
use std::collections::BTreeSet;

mod collect_all {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_independent_schema_errors_are_all_reported() {
        init_tracing();

        // GIVEN: three broken tensors and one good one
        let outcome = Scenario::new("schema_errors")
            .graph("graphs/schema_errors.json")
            .expect(|r| {
                r.issue_types([issue_types::NODE_SCHEMA_ERROR; 3])
                    .param(0, "nodeType", "TensorNode")
                    .param(1, "keyword", "required")
                    .param(2, "keyword", "additionalProperties")
                    .context(0, "Data")
                    .context(0, "Body")
            })
            .run()
            .unwrap();

        // THEN: each issue points into a different node
        let paths: BTreeSet<String> = outcome
            .report
            .iter()
            .filter_map(|issue| issue.context("Body")?.jsonpath.clone())
            .collect();
        assert_eq!(paths.len(), 3);
        for name in ["bad_shape", "no_dtype", "extra"] {
            let id = outcome.fixture.id(name).unwrap();
            assert!(paths.iter().any(|p| p.contains(&id.to_string())), "{name}");
        }
    }

    #[test]
    fn test_schema_and_reference_errors_in_one_pass() {
        init_tracing();

        Scenario::new("dangling")
            .graph("graphs/dangling.json")
            .expect(|r| {
                r.summaries([
                    "Referenced node does not exist",
                    "Malformed node reference is not an ID",
                    "Referenced node has the wrong type",
                    "Body does not match OperationNode",
                ])
                .param(0, "nodeId", "@ghost")
                .param(2, "nodeId", "@note")
                .param(2, "actualType", "NoteNode")
                .context(2, "Target")
                .context(2, "ReferenceSchema")
            })
            .run()
            .unwrap();
    }
}

mod unknown_type {
    use super::*;

    #[test]
    fn test_unknown_type_yields_exactly_one_issue() {
        init_tracing();

        Scenario::new("unknown_type")
            .graph("graphs/unknown_type.json")
            .expect(|r| {
                r.issue_types([issue_types::UNKNOWN_NODE_TYPE])
                    .summaries(["Unknown node type: MysteryNode"])
                    .param(0, "nodeType", "MysteryNode")
                    .context(0, "Node")
            })
            .run()
            .unwrap();
    }
}

mod references {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolving_references_produce_no_issues() {
        init_tracing();

        let outcome = Scenario::new("expression")
            .graph("graphs/expression.json")
            .expect(|r| r.valid())
            .run()
            .unwrap();
        assert_eq!(outcome.graph.len(), 6);
    }
}

mod idempotence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_validating_twice_gives_identical_reports() {
        init_tracing();

        // GIVEN
        let outcome = Scenario::new("dangling")
            .graph("graphs/dangling.json")
            .expect(|r| r.issues(4))
            .run()
            .unwrap();

        // WHEN
        let again = outcome.environment.validate(&outcome.graph).unwrap();

        // THEN
        assert_eq!(again, outcome.report);
        assert_eq!(again.to_text(), outcome.report.to_text());
    }
}

mod aliases {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alias_lookup_and_fallback() {
        init_tracing();

        let outcome = Scenario::new("aliases")
            .graph("graphs/chain.json")
            .config("configs/strict.yaml")
            .run()
            .unwrap();
        let env = &outcome.environment;

        assert_eq!(env.get_type_alias("TensorNode"), "loom:tensor");
        assert_eq!(
            env.get_type_alias("http://loom.example/schemas/nodes.jsd#/nodes/Tensor"),
            "loom:Tensor"
        );
        assert_eq!(env.get_type_alias("OperationNode"), "OperationNode");
        assert_eq!(env.get_type_alias("Unregistered"), "Unregistered");
    }
}

mod rendering {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_renders_as_text() {
        init_tracing();

        let outcome = Scenario::new("unknown_type")
            .graph("graphs/unknown_type.json")
            .run()
            .unwrap();
        let text = outcome.report.to_text();

        assert!(text.starts_with("Validation failed with 1 issues:"), "{text}");
        assert!(text.contains("* Error [UnknownNodeType]: Unknown node type: MysteryNode"));
        assert!(text.contains("- Node:: $.nodes[@.id=="));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_valid_graph_renders_no_issues() {
        let outcome = Scenario::new("expression")
            .graph("graphs/expression.json")
            .run()
            .unwrap();
        assert_eq!(outcome.report.to_text(), "No Validation Issues");
    }
}
