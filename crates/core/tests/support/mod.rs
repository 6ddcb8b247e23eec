#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use bisect_core::{locate, Oracle, OracleError, OracleExit};
use regex::Regex;
use tempfile::TempDir;

/// Build a jest-style suite with `n` cases named `case 1..=n`, alternating
/// between the `it` and `test` spellings.
pub fn suite(n: usize) -> String {
    let mut out = String::new();
    out.push_str("import { renderHook } from '@testing-library/react-native';\n");
    out.push_str("import { useStore } from '../store';\n\n");
    out.push_str("jest.mock('../storage', () => ({ get: jest.fn() }));\n\n");
    out.push_str("describe('store', () => {\n");
    out.push_str("  beforeEach(() => {\n    jest.clearAllMocks();\n  });\n\n");
    for i in 1..=n {
        let keyword = if i % 2 == 1 { "it" } else { "test" };
        out.push_str(&format!(
            "  {keyword}('case {i}', async () => {{\n    expect({i}).toBe({i});\n  }});\n\n"
        ));
    }
    out.push_str("});\n");
    out
}

/// Write `source` as `store.test.ts` in a fresh temp dir.
pub fn write_suite(source: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("store.test.ts");
    fs::write(&path, source).expect("write suite");
    (dir, path)
}

/// How many leading cases a probe actually runs.
///
/// With a filter, count cases whose full name (`store <title>`, as a runner
/// reports it under the suite's `describe`) the filter selects; otherwise
/// count declarations that are not skipped.
pub fn kept_count(variant: &Path, filter: Option<&str>) -> usize {
    let text = fs::read_to_string(variant).expect("read variant");
    let cases = locate(&text);
    match filter {
        Some(expr) => {
            let re = Regex::new(expr).expect("filter is a valid regex");
            cases.iter().filter(|c| re.is_match(&format!("store {}", c.display_name))).count()
        }
        None => cases.iter().filter(|c| !c.skipped).count(),
    }
}

/// Synthetic oracle whose exit status is a function of the kept count.
pub struct ScriptedOracle<F: FnMut(usize) -> OracleExit> {
    respond: F,
    /// Kept count seen by each invocation, in order.
    pub calls: Vec<usize>,
    /// Path and filter handed to each invocation.
    pub invocations: Vec<(PathBuf, Option<String>)>,
}

impl<F: FnMut(usize) -> OracleExit> ScriptedOracle<F> {
    pub fn new(respond: F) -> Self {
        Self { respond, calls: Vec::new(), invocations: Vec::new() }
    }
}

impl<F: FnMut(usize) -> OracleExit> Oracle for ScriptedOracle<F> {
    fn run(&mut self, variant: &Path, filter: Option<&str>) -> Result<OracleExit, OracleError> {
        let kept = kept_count(variant, filter);
        self.calls.push(kept);
        self.invocations.push((variant.to_path_buf(), filter.map(str::to_string)));
        Ok((self.respond)(kept))
    }
}

/// Fails iff at least `threshold` leading cases run.
pub fn threshold_oracle(threshold: usize) -> ScriptedOracle<impl FnMut(usize) -> OracleExit> {
    ScriptedOracle::new(move |kept| {
        if kept >= threshold {
            OracleExit::with_code(1)
        } else {
            OracleExit::with_code(0)
        }
    })
}
