//! Binary search for the smallest failing prefix of a test file.
//!
//! The driver runs strictly one probe at a time: every step needs the previous
//! outcome to pick its midpoint, and scratch files are only isolated per step.
//!
//! States:
//! - locate test cases; none found ends the run ("nothing to bisect")
//! - sanity probe with the whole suite; a clean run ends it ("suite does not fail")
//! - binary search over the proper prefixes `1..=total-1`
//! - report the smallest reproducing prefix, if any

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::locator::{locate, TestCase};
use crate::materialize::Materializer;
use crate::oracle::{classify, Oracle, OracleError, RunOutcome};
use crate::scratch::ScratchPlan;

#[derive(Debug, Error)]
pub enum BisectError {
    #[error("Failed to write scratch file at {}: {source}", .path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("Test run for prefix #{keep_count} was inconclusive (exit code {})", display_code(.code))]
    Inconclusive { keep_count: usize, code: Option<i32> },
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
}

/// What to do when a probe is classified [`RunOutcome::Inconclusive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconclusivePolicy {
    /// Count it as a reproduction, like any other non-zero exit.
    #[default]
    Reproduced,
    /// Stop the run with [`BisectError::Inconclusive`].
    Abort,
}

/// Inclusive bounds over keep counts still under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub low: usize,
    pub high: usize,
}

impl SearchRange {
    pub fn new(low: usize, high: usize) -> Self {
        Self { low, high }
    }

    pub fn is_active(&self) -> bool {
        self.low <= self.high
    }

    pub fn midpoint(&self) -> usize {
        (self.low + self.high) / 2
    }

    /// Shrink the range after probing `mid`.
    pub fn narrow(&mut self, mid: usize, reproduced: bool) {
        if reproduced {
            // mid >= low >= 1, so this cannot underflow.
            self.high = mid - 1;
        } else {
            self.low = mid + 1;
        }
    }
}

/// One oracle invocation and how it was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRecord {
    pub keep_count: usize,
    pub exit_code: Option<i32>,
    pub outcome: RunOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Terminal state of a bisect run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BisectOutcome {
    NothingToBisect,
    SuiteDoesNotFail,
    NoFailingPrefix,
    FailingPrefix { ordinal: usize, display_name: String, line: usize },
}

impl BisectOutcome {
    /// Process exit code for the CLI: `2` when a prefix was isolated.
    pub fn exit_code(&self) -> u8 {
        match self {
            BisectOutcome::FailingPrefix { .. } => 2,
            _ => 0,
        }
    }

    pub fn failing_ordinal(&self) -> Option<usize> {
        match self {
            BisectOutcome::FailingPrefix { ordinal, .. } => Some(*ordinal),
            _ => None,
        }
    }
}

impl fmt::Display for BisectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BisectOutcome::NothingToBisect => write!(f, "No test cases found; nothing to bisect."),
            BisectOutcome::SuiteDoesNotFail => write!(
                f,
                "Full test suite did not fail (exit code 0); suite does not fail as a whole."
            ),
            BisectOutcome::NoFailingPrefix => write!(
                f,
                "No failing prefix isolated; failure may depend on interaction outside prefix semantics."
            ),
            BisectOutcome::FailingPrefix { ordinal, display_name, line } => write!(
                f,
                "Found failing prefix at test #{ordinal}: {display_name} (line {line})"
            ),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BisectReport {
    pub total: usize,
    pub probes: Vec<ProbeRecord>,
    pub outcome: BisectOutcome,
}

/// Progress notifications emitted while the driver runs.
#[derive(Debug)]
pub enum BisectEvent<'e> {
    Located { total: usize },
    SanityCheck { total: usize },
    Step { keep_count: usize, range: SearchRange },
    Probed(&'e ProbeRecord),
}

/// Coordinator tying a materialization strategy to an oracle.
pub struct Bisector<'a> {
    source_path: &'a Path,
    materializer: &'a dyn Materializer,
    oracle: &'a mut dyn Oracle,
    scratch: ScratchPlan,
    inconclusive_codes: Vec<i32>,
    inconclusive_policy: InconclusivePolicy,
}

impl<'a> Bisector<'a> {
    /// `source_path` is what the oracle runs when the strategy needs no
    /// scratch file; scratch files are planned by `scratch`.
    pub fn new(
        source_path: &'a Path,
        materializer: &'a dyn Materializer,
        oracle: &'a mut dyn Oracle,
        scratch: ScratchPlan,
    ) -> Self {
        Self {
            source_path,
            materializer,
            oracle,
            scratch,
            inconclusive_codes: Vec::new(),
            inconclusive_policy: InconclusivePolicy::default(),
        }
    }

    pub fn with_inconclusive(mut self, codes: Vec<i32>, policy: InconclusivePolicy) -> Self {
        self.inconclusive_codes = codes;
        self.inconclusive_policy = policy;
        self
    }

    /// Smallest reproducing prefix size, if one was isolated.
    pub fn bisect(&mut self, source: &str) -> Result<Option<usize>, BisectError> {
        Ok(self.bisect_with(source, |_| {})?.outcome.failing_ordinal())
    }

    /// Run the full search, reporting progress through `on_event`.
    pub fn bisect_with<F>(&mut self, source: &str, mut on_event: F) -> Result<BisectReport, BisectError>
    where
        F: FnMut(&BisectEvent<'_>),
    {
        let cases = locate(source);
        let total = cases.len();
        on_event(&BisectEvent::Located { total });

        let mut probes = Vec::new();
        if total == 0 {
            return Ok(BisectReport { total, probes, outcome: BisectOutcome::NothingToBisect });
        }

        on_event(&BisectEvent::SanityCheck { total });
        let sanity = self.probe(source, &cases, total)?;
        on_event(&BisectEvent::Probed(&sanity));
        let suite_fails = self.reproduced(&sanity)?;
        probes.push(sanity);
        if !suite_fails {
            return Ok(BisectReport { total, probes, outcome: BisectOutcome::SuiteDoesNotFail });
        }

        // The sanity probe already covered keep_count == total.
        let mut range = SearchRange::new(1, total - 1);
        let mut best: Option<usize> = None;
        while range.is_active() {
            let mid = range.midpoint();
            on_event(&BisectEvent::Step { keep_count: mid, range });

            let record = self.probe(source, &cases, mid)?;
            on_event(&BisectEvent::Probed(&record));
            let reproduced = self.reproduced(&record)?;
            probes.push(record);

            if reproduced {
                best = Some(mid);
            }
            range.narrow(mid, reproduced);
        }

        let outcome = match best {
            Some(ordinal) => {
                let case = &cases[ordinal - 1];
                BisectOutcome::FailingPrefix {
                    ordinal,
                    display_name: case.display_name.clone(),
                    line: case.line,
                }
            }
            None => BisectOutcome::NoFailingPrefix,
        };
        Ok(BisectReport { total, probes, outcome })
    }

    fn probe(
        &mut self,
        source: &str,
        cases: &[TestCase],
        keep_count: usize,
    ) -> Result<ProbeRecord, BisectError> {
        let variant = self.materializer.materialize(source, cases, keep_count);

        let scratch_path = if self.materializer.writes_scratch() {
            Some(self.scratch.create(keep_count, cases.len(), &variant.text)?)
        } else {
            None
        };

        let target = scratch_path.as_deref().unwrap_or(self.source_path);
        let result = self.oracle.run(target, variant.filter.as_deref());
        if let Some(path) = &scratch_path {
            self.scratch.discard(path);
        }
        let exit = result?;

        let outcome = classify(exit, &self.inconclusive_codes);
        info!(keep_count, code = ?exit.code, outcome = outcome.as_str(), "probe finished");

        Ok(ProbeRecord {
            keep_count,
            exit_code: exit.code,
            outcome,
            scratch_path,
            filter: variant.filter,
        })
    }

    fn reproduced(&self, record: &ProbeRecord) -> Result<bool, BisectError> {
        match record.outcome {
            RunOutcome::Reproduced => Ok(true),
            RunOutcome::Clean => Ok(false),
            RunOutcome::Inconclusive => match self.inconclusive_policy {
                InconclusivePolicy::Reproduced => {
                    warn!(
                        keep_count = record.keep_count,
                        code = ?record.exit_code,
                        "inconclusive test run counted as reproduction"
                    );
                    Ok(true)
                }
                InconclusivePolicy::Abort => Err(BisectError::Inconclusive {
                    keep_count: record.keep_count,
                    code: record.exit_code,
                }),
            },
        }
    }
}
