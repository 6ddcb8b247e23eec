//! bisect-core
//!
//! Core library for shrinking a failing test file down to the smallest
//! leading run of test cases that still fails.
//!
//! The pipeline for each search step is one-directional:
//! source text -> [`locator`] -> [`materialize`] -> [`oracle`] -> [`bisect`].
//! [`config`] and [`report`] handle the project-local files around a run.
//!
//! The goal is to keep all substantive logic here so it is fully testable
//! with synthetic oracles and reusable from the CLI.

pub mod bisect;
pub mod config;
pub mod locator;
pub mod materialize;
pub mod oracle;
pub mod report;
pub mod scratch;

pub use bisect::{
    BisectError, BisectEvent, BisectOutcome, BisectReport, Bisector, InconclusivePolicy,
    ProbeRecord, SearchRange,
};
pub use locator::{locate, Keyword, TestCase};
pub use materialize::{Materializer, NameFilter, SkipRewrite, SourceVariant, Strategy};
pub use oracle::{classify, CommandOracle, Oracle, OracleError, OracleExit, RunOutcome};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
