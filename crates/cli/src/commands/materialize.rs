use std::fs;

use anyhow::{anyhow, Context, Result};
use bisect_core::locate;

use crate::commands::util::{read_source, BisectContext};

/// Materialize the variant for one keep count.
///
/// For skip-rewrite this is the rewritten source (written to `out` or stdout);
/// for name-filter it is the filter expression handed to the runner.
pub fn materialize_command(
    root: &str,
    config: Option<&str>,
    source: Option<&str>,
    strategy: Option<&str>,
    keep: usize,
    out: Option<&str>,
) -> Result<()> {
    let mut ctx = BisectContext::load(root, config)?;
    ctx.override_with(source, strategy)?;
    let source_path = ctx.source_path();
    let text = read_source(&source_path)?;
    let cases = locate(&text);

    if cases.is_empty() {
        return Err(anyhow!("No test cases found in {}", source_path.display()));
    }
    if keep == 0 || keep > cases.len() {
        return Err(anyhow!(
            "--keep must be between 1 and {} (test cases in {})",
            cases.len(),
            source_path.display()
        ));
    }

    let materializer = ctx.config.strategy.materializer();
    let variant = materializer.materialize(&text, &cases, keep);
    let body = match &variant.filter {
        Some(filter) => format!("{filter}\n"),
        None => variant.text.into_owned(),
    };

    match out {
        Some(path) => {
            let out_path = ctx.root.join(path);
            fs::write(&out_path, &body)
                .with_context(|| format!("Failed to write variant to {}", out_path.display()))?;
            println!("Wrote {} variant (keep {keep}) to {}", materializer.name(), out_path.display());
        }
        None => print!("{body}"),
    }

    Ok(())
}
