//! Loom Integration Test Framework
//!
//! Provides a fluent API for validating fixture graphs against an environment.
//!
//! # Structure
//!
//! - **fixtures/graphs/** - Graph documents; `"@name"` strings stand for node ids
//! - **fixtures/configs/** - YAML environment configurations
//! - **tests/** - Scenarios: graph + config + expected report
//!
//! # Example
//!
//! ```ignore
//! use loom_tests::prelude::*;
//!
//! #[test]
//! fn test_cycle() {
//!     Scenario::new("cycle")
//!         .graph("graphs/cycle.json")
//!         .expect(|r| r.issues(1).issue_types(["ReferenceCycleError"]))
//!         .run()
//!         .unwrap();
//! }
//! ```

mod assertion;
mod error;
mod loader;
mod scenario;

pub use assertion::{ReportAssertion, ReportAssertionBuilder};
pub use error::{ScenarioError, ScenarioResult};
pub use loader::{fixtures_root, Fixture};
pub use scenario::{Outcome, Scenario};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{ReportAssertion, ReportAssertionBuilder};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::init_tracing;
    pub use crate::loader::Fixture;
    pub use crate::scenario::{Outcome, Scenario};
}

/// Install a test-friendly tracing subscriber, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
