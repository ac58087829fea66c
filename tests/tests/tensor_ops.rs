//! Tensor-ops dialect constraints, driven by environment configs.

use loom_constraint::{
    AllTensorsHaveExactlyOneSourceConstraint, EnvironmentConfig, NoTensorOperationCyclesConstraint,
    TensorDTypesAreValidConstraint,
};
use loom_tests::prelude::*;
use loom_validation::issue_types;

mod selections {
    use super::*;

    #[test]
    fn test_selection_problems_are_reported() {
        init_tracing();

        Scenario::new("selections")
            .graph("graphs/selections.json")
            .expect(|r| {
                r.summaries([
                    "Selection group is empty: empty",
                    "Tensor selection is out of bounds",
                    "Tensor selection has the wrong number of dimensions",
                ])
                .issue_types([issue_types::NODE_VALIDATION_ERROR; 3])
                .context(0, "Selection Group")
                .context(1, "Selection Range")
                .context(1, "Tensor Node")
                .context(1, "Application Node")
                .param(2, "expectedDimensions", "1")
                .param(2, "actualDimensions", "2")
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_bad_group_name_with_custom_pattern() {
        init_tracing();

        let graph = r#"{"nodes": [
            {"id": "@x", "type": "TensorNode", "body": {"dtype": "int32", "shape": [2]}},
            {"id": "@op", "type": "OperationNode", "body": {
                "opName": "read",
                "inputs": {"x": [{"tensorId": "@x", "range": {"start": [0], "end": [2]}}]},
                "outputs": {}
            }},
            {"id": "@app", "type": "ApplicationNode", "body": {
                "operationId": "@op",
                "inputs": {"2x": [{"tensorId": "@x", "range": {"start": [0], "end": [2]}}]}
            }}
        ]}"#;

        Scenario::new("bad_group_name")
            .graph_source(graph)
            .expect(|r| {
                r.summaries(["Selection name is not an identifier: 2x"])
                    .param(0, "nodeType", "ApplicationNode")
                    .custom(|report, _| {
                        report.issues()[0]
                            .context("Selection Group")
                            .and_then(|c| c.jsonpath.as_deref())
                            .is_some_and(|path| path.ends_with(".body.inputs['2x']"))
                    })
            })
            .run()
            .unwrap();
    }
}

mod sources {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = "constraints: [operation_tensors, single_source]\n";

    #[test]
    fn test_orphan_and_shared_tensors() {
        init_tracing();

        let outcome = Scenario::new("sources")
            .graph("graphs/sources.json")
            .config_source(CONFIG)
            .expect(|r| {
                r.summaries([
                    "Tensor (orphan) has no Operation source",
                    "Tensor (shared) has too many Operation sources: 2",
                ])
                .context(1, "Source Operation #0 (alpha)")
                .context(1, "Source Operation #1 (zeta)")
            })
            .run()
            .unwrap();

        let shared = outcome.fixture.id("shared").unwrap();
        assert_eq!(
            outcome.report.issues()[1].message.as_deref(),
            Some(format!("Tensor id: {shared}").as_str())
        );
    }

    #[test]
    fn test_dangling_operation_input_is_reported_once() {
        init_tracing();

        let graph = r#"{"nodes": [
            {"id": "@y", "type": "TensorNode", "body": {"dtype": "int32", "shape": [1]}},
            {"id": "@op", "type": "OperationNode", "body": {
                "opName": "copy",
                "inputs": {"x": [{"tensorId": "@ghost", "range": {"start": [0], "end": [1]}}]},
                "outputs": {"y": [{"tensorId": "@y", "range": {"start": [0], "end": [1]}}]}
            }}
        ]}"#;

        Scenario::new("dangling_input")
            .graph_source(graph)
            .config_source(CONFIG)
            .expect(|r| {
                r.summaries(["Referenced node does not exist"])
                    .param(0, "nodeId", "@ghost")
                    .context(0, "ReferenceSchema")
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_single_source_without_operation_tensors_fails_to_build() {
        let config = EnvironmentConfig::from_yaml_str("constraints: [single_source]\n").unwrap();
        assert!(config.build_environment().is_err());
    }
}

mod strict {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strict_config_registers_every_constraint() {
        init_tracing();

        let outcome = Scenario::new("strict")
            .graph("graphs/chain.json")
            .config("configs/strict.yaml")
            .run()
            .unwrap();
        let env = &outcome.environment;

        assert_eq!(env.constraints().count(), 5);
        assert!(env.lookup_constraint::<NoTensorOperationCyclesConstraint>().is_some());
        assert!(env.lookup_constraint::<AllTensorsHaveExactlyOneSourceConstraint>().is_some());
        let dtypes = env.lookup_constraint::<TensorDTypesAreValidConstraint>().unwrap();
        assert_eq!(dtypes.valid_dtypes().iter().collect::<Vec<_>>(), vec!["float32"]);
    }

    #[test]
    fn test_strict_dtypes_reject_int32() {
        init_tracing();

        // GIVEN: chain tensors are int32; t1 also has no source
        Scenario::new("strict_chain")
            .graph("graphs/chain.json")
            .config("configs/strict.yaml")
            .expect(|r| {
                r.summary_matches(r"^Tensor dtype \(int32\) not a recognized type$")
                    .summary_matches(r"has no Operation source$")
                    .custom(|report, _| {
                        report
                            .iter()
                            .filter(|i| i.summary.starts_with("Tensor dtype"))
                            .count()
                            == 3
                    })
            })
            .run()
            .unwrap();
    }

    #[test]
    fn test_strict_expression_reports_input_tensors_without_source() {
        init_tracing();

        Scenario::new("strict_expression")
            .graph("graphs/expression.json")
            .config("configs/strict.yaml")
            .expect(|r| {
                r.summaries([
                    "Tensor (x) has no Operation source",
                    "Tensor (w) has no Operation source",
                ])
            })
            .run()
            .unwrap();
    }
}

mod agreement {
    use super::*;

    const CONFIG: &str =
        "constraints: [tensor_operations, operation_applications, output_coverage]\n";

    #[test]
    fn test_expression_application_covers_its_operation() {
        init_tracing();

        Scenario::new("expression_agreement")
            .graph("graphs/expression.json")
            .config_source(CONFIG)
            .expect(|r| r.valid())
            .run()
            .unwrap();
    }

    #[test]
    fn test_chain_operations_have_no_shards() {
        init_tracing();

        Scenario::new("chain_agreement")
            .graph("graphs/chain.json")
            .config_source(CONFIG)
            .expect(|r| {
                r.summaries([
                    "Operation has no Application shards",
                    "Operation has no Application shards",
                ])
                .context(0, "Operation Node")
            })
            .run()
            .unwrap();
    }
}

mod overflow {
    use super::*;

    #[test]
    fn test_unrepresentable_tensor_range_is_reported_not_fatal() {
        init_tracing();

        // GIVEN: origin + shape leaves i64
        let graph = r#"{"nodes": [
            {"id": "@x", "type": "TensorNode", "body": {
                "dtype": "float32", "shape": [2], "origin": [9223372036854775807]
            }},
            {"id": "@op", "type": "OperationNode", "body": {
                "opName": "read",
                "inputs": {"x": [{"tensorId": "@x", "range": {"start": [0], "end": [1]}}]},
                "outputs": {}
            }},
            {"id": "@app", "type": "ApplicationNode", "body": {
                "operationId": "@op",
                "inputs": {"x": [{"tensorId": "@x", "range": {"start": [0], "end": [1]}}]}
            }}
        ]}"#;

        Scenario::new("overflow")
            .graph_source(graph)
            .expect(|r| {
                r.issues(1)
                    .summary_matches(r"^tensor range is not representable: Coordinate overflow")
                    .context(0, "Tensor")
            })
            .run()
            .unwrap();
    }
}

mod config {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_constraint_names_are_skipped() {
        init_tracing();

        let outcome = Scenario::new("unknown_constraint")
            .graph("graphs/cycle.json")
            .config("configs/unknown_constraint.yaml")
            .expect(|r| r.issue_types([issue_types::REFERENCE_CYCLE_ERROR]))
            .run()
            .unwrap();
        assert_eq!(outcome.environment.constraints().count(), 1);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = Scenario::new("missing_config")
            .graph("graphs/chain.json")
            .config("configs/does_not_exist.yaml")
            .run();
        assert!(matches!(result, Err(ScenarioError::Loom(_))));
    }
}
