//! Loom Validation Diagnostics
//!
//! Structured, context-rich validation records and the machinery that lets
//! many independent checks run to completion before anything is reported.
//!
//! Responsibilities:
//! - Describe a single problem (`ValidationIssue`, `Context`)
//! - Accumulate problems across checks (`ValidationIssueCollector`)
//! - Separate data-validity failures from programming errors (`CheckError`)
//! - Render reports as deterministic text (`TextFormatter`)

mod collector;
mod error;
mod format;
mod issue;
mod report;

pub use collector::*;
pub use error::*;
pub use format::*;
pub use issue::*;
pub use report::*;
