use std::path::Path;

use anyhow::Result;
use bisect_core::report::{write_report, RunReport};
use bisect_core::scratch::ScratchPlan;
use bisect_core::{BisectEvent, BisectOutcome, Bisector, CommandOracle, Oracle};
use chrono::Utc;
use tracing::info;

use crate::commands::util::{read_source, BisectContext};

/// Flags accepted by the bisect run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Config file to use instead of `.prefix-bisect/config.{json,yaml}`.
    pub config: Option<String>,
    pub source: Option<String>,
    pub strategy: Option<String>,
    pub keep_scratch: bool,
    pub no_report: bool,
    /// Print the run report as JSON instead of human-readable lines.
    pub json: bool,
}

/// Bisect the configured test source using the configured runner command.
pub fn run_bisect_command(root: &str, opts: &RunOptions) -> Result<BisectOutcome> {
    let mut ctx = BisectContext::load(root, opts.config.as_deref())?;
    ctx.override_with(opts.source.as_deref(), opts.strategy.as_deref())?;
    if opts.keep_scratch {
        ctx.config.scratch.keep = true;
    }
    if opts.no_report {
        ctx.config.write_report = false;
    }
    if opts.json {
        // Runner output would corrupt the JSON document on stdout.
        ctx.config.runner.echo_output = false;
    }

    let mut oracle = CommandOracle::from_config(&ctx.config.runner, &ctx.root);
    run_with_oracle(&ctx, &mut oracle, opts.json)
}

/// Run the bisect state machine against any oracle and print the result.
pub fn run_with_oracle(
    ctx: &BisectContext,
    oracle: &mut dyn Oracle,
    json: bool,
) -> Result<BisectOutcome> {
    let config = &ctx.config;
    let source_path = ctx.source_path();
    let source_text = read_source(&source_path)?;

    let materializer = config.strategy.materializer();
    let scratch = ScratchPlan::for_source(
        &source_path,
        config.scratch_dir(&ctx.root).as_deref(),
        config.scratch.prefix.clone(),
        config.scratch.keep,
    );

    let started_at = Utc::now();
    let mut bisector = Bisector::new(&source_path, materializer.as_ref(), oracle, scratch)
        .with_inconclusive(config.inconclusive.exit_codes.clone(), config.inconclusive.policy);
    let report = bisector.bisect_with(&source_text, |event| {
        if !json {
            print_event(event, &source_path);
        }
    })?;

    let outcome = report.outcome.clone();
    let run_report = RunReport::new(&source_path, &source_text, config.strategy, started_at, report);

    if json {
        println!("{}", serde_json::to_string_pretty(&run_report)?);
    } else {
        println!("{outcome}");
    }

    if config.write_report {
        let path = write_report(&ctx.layout, started_at, &run_report)?;
        info!(path = %path.display(), "run report written");
        if !json {
            println!("Report: {}", path.display());
        }
    }

    Ok(outcome)
}

fn print_event(event: &BisectEvent<'_>, source_path: &Path) {
    match event {
        BisectEvent::Located { total } => {
            println!("Found {total} test cases in {}", source_path.display());
        }
        BisectEvent::SanityCheck { total } => {
            println!("Checking full suite ({total} test cases)");
        }
        BisectEvent::Step { keep_count, range } => {
            println!(
                "Checking prefix up to test #{keep_count} (range {}-{})",
                range.low, range.high
            );
        }
        BisectEvent::Probed(_) => {}
    }
}
