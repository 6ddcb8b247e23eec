//! The external test runner, seen as a pass/fail oracle.
//!
//! The driver only ever looks at the exit status. Output is captured and
//! echoed for humans but never parsed.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::RunnerConfig;

/// Placeholder in runner args replaced by the path of the file to execute.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Exit status of one runner invocation. `code` is `None` when the process
/// was terminated without an exit code (e.g. by a signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleExit {
    pub code: Option<i32>,
}

impl OracleExit {
    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn terminated() -> Self {
        Self { code: None }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for OracleExit {
    fn from(status: ExitStatus) -> Self {
        Self { code: status.code() }
    }
}

/// Classification of one oracle invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Failure observed.
    Reproduced,
    /// All selected tests passed.
    Clean,
    /// The runner errored in a way configured as unrelated to the target failure.
    Inconclusive,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Reproduced => "reproduced",
            RunOutcome::Clean => "clean",
            RunOutcome::Inconclusive => "inconclusive",
        }
    }
}

/// Map an exit status to an outcome.
///
/// `0` is clean. No exit code, or a code listed in `inconclusive_codes`, is
/// inconclusive. Every other non-zero code counts as a reproduction.
pub fn classify(exit: OracleExit, inconclusive_codes: &[i32]) -> RunOutcome {
    match exit.code {
        Some(0) => RunOutcome::Clean,
        Some(code) if inconclusive_codes.contains(&code) => RunOutcome::Inconclusive,
        Some(_) => RunOutcome::Reproduced,
        None => RunOutcome::Inconclusive,
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Failed to spawn test runner '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can execute a test file and report an exit status.
///
/// Invocations are blocking; no timeout is imposed here.
pub trait Oracle {
    fn run(&mut self, variant: &Path, filter: Option<&str>) -> Result<OracleExit, OracleError>;
}

/// Oracle that shells out to a configured test-runner command.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
    filter_flag: Option<String>,
    current_dir: Option<PathBuf>,
    echo_output: bool,
}

impl CommandOracle {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            filter_flag: None,
            current_dir: None,
            echo_output: true,
        }
    }

    pub fn from_config(runner: &RunnerConfig, current_dir: &Path) -> Self {
        Self {
            program: runner.program.clone(),
            args: runner.args.clone(),
            filter_flag: runner.filter_flag.clone(),
            current_dir: Some(current_dir.to_path_buf()),
            echo_output: runner.echo_output,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter_flag(mut self, flag: Option<String>) -> Self {
        self.filter_flag = flag;
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Resolve the argument list for one invocation.
    ///
    /// Every `{file}` is replaced by the variant path; if no argument mentions
    /// it, the path is appended. The filter goes last, after `filter_flag`.
    pub fn command_args(&self, variant: &Path, filter: Option<&str>) -> Vec<String> {
        let file = variant.display().to_string();
        let mut args: Vec<String> =
            self.args.iter().map(|arg| arg.replace(FILE_PLACEHOLDER, &file)).collect();
        if !self.args.iter().any(|arg| arg.contains(FILE_PLACEHOLDER)) {
            args.push(file);
        }
        if let Some(filter) = filter {
            if let Some(flag) = &self.filter_flag {
                args.push(flag.clone());
            }
            args.push(filter.to_string());
        }
        args
    }
}

impl Oracle for CommandOracle {
    fn run(&mut self, variant: &Path, filter: Option<&str>) -> Result<OracleExit, OracleError> {
        let args = self.command_args(variant, filter);
        debug!(program = %self.program, ?args, "spawning test runner");

        let mut command = Command::new(&self.program);
        command.args(&args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|source| OracleError::Spawn { program: self.program.clone(), source })?;

        if self.echo_output {
            let label = variant
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| self.program.clone());
            for line in String::from_utf8_lossy(&output.stdout).lines().filter(|l| !l.is_empty()) {
                println!("[{label}] {line}");
            }
            for line in String::from_utf8_lossy(&output.stderr).lines().filter(|l| !l.is_empty()) {
                eprintln!("[{label}] ERR: {line}");
            }
        }

        Ok(OracleExit::from(output.status))
    }
}
