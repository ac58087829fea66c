//! Tensor/operation cycle detection over fixture graphs.

use loom_tests::prelude::*;
use loom_validation::issue_types;
use serde_json::Value;

mod two_operation_loop {
    use super::*;
    use pretty_assertions::assert_eq;

    pub fn scenario() -> Scenario {
        Scenario::new("cycle")
            .graph("graphs/cycle.json")
            .expect(|r| {
                r.issue_types([issue_types::REFERENCE_CYCLE_ERROR])
                    .summaries(["Reference Cycle detected"])
                    .context(0, "Cycle")
            })
    }

    #[test]
    fn test_loop_is_reported_once() {
        init_tracing();
        scenario().run().unwrap();
    }

    #[test]
    fn test_cycle_lists_every_member() {
        init_tracing();

        // GIVEN
        let outcome = scenario().run().unwrap();

        // WHEN
        let cycle = outcome.report.issues()[0].context("Cycle").unwrap();
        let members = cycle.data.as_ref().and_then(Value::as_array).unwrap();

        // THEN
        let mut labels: Vec<&str> = members
            .iter()
            .filter_map(|m| m.get("label").and_then(Value::as_str))
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["Op1", "Op2", "T1", "T2"]);

        for name in ["t1", "t2", "op1", "op2"] {
            let id = outcome.fixture.id(name).unwrap().to_string();
            assert!(members.iter().any(|m| m["id"] == Value::String(id.clone())), "{name}");
        }
    }
}

mod chain {
    use super::*;

    #[test]
    fn test_acyclic_chain_is_valid() {
        init_tracing();

        Scenario::new("chain")
            .graph("graphs/chain.json")
            .expect(|r| r.valid())
            .run()
            .unwrap();
    }
}
