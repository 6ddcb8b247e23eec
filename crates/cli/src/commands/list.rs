use anyhow::Result;
use bisect_core::{locate, TestCase};
use serde::Serialize;

use crate::commands::util::{read_source, BisectContext};

#[derive(Debug, Serialize)]
pub struct TestCaseListing {
    pub source: String,
    pub total: usize,
    pub cases: Vec<TestCase>,
}

/// List the test cases the locator finds in the configured source.
pub fn list_tests_command(
    root: &str,
    config: Option<&str>,
    source: Option<&str>,
    json: bool,
) -> Result<Vec<TestCase>> {
    let mut ctx = BisectContext::load(root, config)?;
    ctx.override_with(source, None)?;
    let source_path = ctx.source_path();
    let cases = locate(&read_source(&source_path)?);

    if json {
        let listing = TestCaseListing {
            source: source_path.display().to_string(),
            total: cases.len(),
            cases: cases.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(cases);
    }

    println!("Test cases ({}) in {}:", cases.len(), source_path.display());
    if cases.is_empty() {
        println!("  (none)");
        return Ok(cases);
    }
    for case in &cases {
        let skipped = if case.skipped { " [skipped]" } else { "" };
        println!("  #{} L{} {}{}", case.ordinal, case.line, case.display_name, skipped);
    }

    Ok(cases)
}
