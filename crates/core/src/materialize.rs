//! Prefix variants of a test source.
//!
//! Two interchangeable strategies produce a variant that runs only the first
//! `keep_count` test cases:
//! - [`SkipRewrite`] inserts `.skip` after the keyword of every later
//!   declaration. The variant has to be written to a scratch file and run.
//! - [`NameFilter`] leaves the source untouched and instead builds a name
//!   pattern for the runner, anchored at the end of the full test name. No
//!   scratch file is involved.
//!
//! Both panic when `keep_count` is outside `1..=cases.len()`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::locator::TestCase;

/// Token inserted directly after a declaration keyword to skip it.
pub const SKIP_MARKER: &str = ".skip";

/// Materialized source for one search step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceVariant<'a> {
    pub keep_count: usize,
    /// Source text to execute. Borrowed when identical to the original.
    pub text: Cow<'a, str>,
    /// Name-selection expression for the runner, if the strategy uses one.
    pub filter: Option<String>,
}

/// Strategy for turning a full suite into a prefix-only run.
pub trait Materializer {
    fn materialize<'a>(
        &self,
        source: &'a str,
        cases: &[TestCase],
        keep_count: usize,
    ) -> SourceVariant<'a>;

    /// Whether the variant text must be written to disk before the oracle runs.
    fn writes_scratch(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Rewrites declarations past the prefix into their skip spelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipRewrite;

impl Materializer for SkipRewrite {
    fn materialize<'a>(
        &self,
        source: &'a str,
        cases: &[TestCase],
        keep_count: usize,
    ) -> SourceVariant<'a> {
        assert_keep_count(cases, keep_count);

        // Already-skipped declarations stay as they are.
        let to_skip: Vec<&TestCase> =
            cases.iter().skip(keep_count).filter(|case| !case.skipped).collect();
        if to_skip.is_empty() {
            return SourceVariant { keep_count, text: Cow::Borrowed(source), filter: None };
        }

        let mut out = String::with_capacity(source.len() + SKIP_MARKER.len() * to_skip.len());
        let mut cursor = 0;
        for case in to_skip {
            let at = case.skip_insertion_offset();
            out.push_str(&source[cursor..at]);
            out.push_str(SKIP_MARKER);
            cursor = at;
        }
        out.push_str(&source[cursor..]);

        SourceVariant { keep_count, text: Cow::Owned(out), filter: None }
    }

    fn writes_scratch(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        Strategy::SkipRewrite.as_str()
    }
}

/// Selects the prefix through the runner's name filter instead of the source.
///
/// Display names need not be unique, so a later test sharing a name with one
/// inside the prefix is selected too.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameFilter;

impl Materializer for NameFilter {
    fn materialize<'a>(
        &self,
        source: &'a str,
        cases: &[TestCase],
        keep_count: usize,
    ) -> SourceVariant<'a> {
        assert_keep_count(cases, keep_count);
        SourceVariant {
            keep_count,
            text: Cow::Borrowed(source),
            filter: Some(name_filter(&cases[..keep_count])),
        }
    }

    fn writes_scratch(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        Strategy::NameFilter.as_str()
    }
}

/// Build `(?:^| )(?:a|b|...)$` over the escaped display names, first occurrence order.
///
/// Runners match the pattern against the full test name, which starts with
/// the enclosing `describe` titles joined by spaces. The end stays anchored;
/// the start accepts either the bare name or any describe path before it.
pub fn name_filter(cases: &[TestCase]) -> String {
    let mut names: Vec<&str> = Vec::with_capacity(cases.len());
    for case in cases {
        if !names.contains(&case.display_name.as_str()) {
            names.push(&case.display_name);
        }
    }
    let alternation: Vec<String> = names.into_iter().map(regex::escape).collect();
    format!("(?:^| )(?:{})$", alternation.join("|"))
}

fn assert_keep_count(cases: &[TestCase], keep_count: usize) {
    assert!(
        (1..=cases.len()).contains(&keep_count),
        "keep count {keep_count} outside 1..={}",
        cases.len()
    );
}

/// Serializable selector for the materialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    SkipRewrite,
    NameFilter,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::SkipRewrite => "skip-rewrite",
            Strategy::NameFilter => "name-filter",
        }
    }

    pub fn materializer(self) -> Box<dyn Materializer> {
        match self {
            Strategy::SkipRewrite => Box::new(SkipRewrite),
            Strategy::NameFilter => Box::new(NameFilter),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip-rewrite" => Ok(Strategy::SkipRewrite),
            "name-filter" => Ok(Strategy::NameFilter),
            other => {
                Err(anyhow!("Invalid strategy '{}'. Allowed: skip-rewrite, name-filter", other))
            }
        }
    }
}
