use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use prefix_bisect::commands::{
    init_command, list_tests_command, materialize_command, run_bisect_command, RunOptions,
};

/// Find the smallest leading run of test cases that still fails.
///
/// This CLI is a thin wrapper around `bisect-core` (exposed in code as
/// `bisect_core`). Running it without a subcommand bisects the configured
/// test file.
#[derive(Parser, Debug)]
#[command(
    name = "prefix-bisect",
    version,
    about = "Bisect a failing test file down to its smallest failing prefix",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Project root directory. Defaults to the current working directory.
    #[arg(long, default_value = ".")]
    root: String,

    /// Config file (JSON or YAML), relative to the root. Defaults to `.prefix-bisect/config.*`.
    #[arg(long)]
    config: Option<String>,

    /// Test file to bisect, overriding the configured source.
    #[arg(long)]
    source: Option<String>,

    /// Materialization strategy: `skip-rewrite` or `name-filter`.
    #[arg(long)]
    strategy: Option<String>,

    /// Leave probe scratch files on disk for inspection.
    #[arg(long, default_value_t = false)]
    keep_scratch: bool,

    /// Do not write a run report under `.prefix-bisect/reports`.
    #[arg(long, default_value_t = false)]
    no_report: bool,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bisect the configured test file (the default when no subcommand is given).
    Run(RunArgs),

    /// Write a default config to `.prefix-bisect/config.json`.
    Init {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Overwrite an existing config.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List the test cases found in the test file.
    List {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        source: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the variant that a given prefix size would run.
    Materialize {
        /// Project root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        strategy: Option<String>,

        /// Number of leading test cases to keep.
        #[arg(long)]
        keep: usize,

        /// Write the variant here instead of stdout.
        #[arg(long)]
        out: Option<String>,
    },
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout is reserved for results.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Run(cli.run)) {
        Command::Run(args) => {
            let opts = RunOptions {
                config: args.config,
                source: args.source,
                strategy: args.strategy,
                keep_scratch: args.keep_scratch,
                no_report: args.no_report,
                json: args.json,
            };
            let outcome = run_bisect_command(&args.root, &opts)?;
            return Ok(ExitCode::from(outcome.exit_code()));
        }
        Command::Init { root, force } => {
            init_command(&root, force)?;
        }
        Command::List { root, config, source, json } => {
            list_tests_command(&root, config.as_deref(), source.as_deref(), json)?;
        }
        Command::Materialize { root, config, source, strategy, keep, out } => {
            materialize_command(
                &root,
                config.as_deref(),
                source.as_deref(),
                strategy.as_deref(),
                keep,
                out.as_deref(),
            )?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
