//! Project-local configuration and on-disk layout.
//!
//! Config lives (optionally) at `.prefix-bisect/config.json` or
//! `.prefix-bisect/config.yaml` under the project root. Without either file
//! every field takes its default, which targets the project's known
//! troublesome suite and runs it through `npm test`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::bisect::InconclusivePolicy;
use crate::materialize::Strategy;

pub const DEFAULT_SOURCE: &str = "stores/__tests__/parentalStore.test.ts";
pub const DEFAULT_SCRATCH_PREFIX: &str = "prefix_";

/// Logical layout of the tool's files under a project root.
///
/// This does *not* perform any IO itself.
#[derive(Debug, Clone)]
pub struct BisectLayout {
    pub root: PathBuf,
    /// Directory for tool metadata (.prefix-bisect).
    pub meta_dir: PathBuf,
    pub config_json_path: PathBuf,
    pub config_yaml_path: PathBuf,
    /// Directory for per-run JSON reports.
    pub reports_dir: PathBuf,
}

impl BisectLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".prefix-bisect");
        let config_json_path = meta_dir.join("config.json");
        let config_yaml_path = meta_dir.join("config.yaml");
        let reports_dir = meta_dir.join("reports");

        Self { root, meta_dir, config_json_path, config_yaml_path, reports_dir }
    }

    /// The config file that would be loaded, if any exists.
    pub fn existing_config_path(&self) -> Option<&Path> {
        [&self.config_json_path, &self.config_yaml_path]
            .into_iter()
            .find(|p| p.is_file())
            .map(PathBuf::as_path)
    }
}

/// How to invoke the external test runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub program: String,
    /// `{file}` is replaced with the path of the file under test.
    pub args: Vec<String>,
    /// Flag placed before the name filter (name-filter strategy only).
    pub filter_flag: Option<String>,
    /// Echo the runner's captured output, prefixed with the probe file name.
    pub echo_output: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: "npm".to_string(),
            args: ["test", "--", "{file}", "-i", "--runInBand", "--detectOpenHandles"]
                .into_iter()
                .map(String::from)
                .collect(),
            filter_flag: Some("--testNamePattern".to_string()),
            echo_output: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScratchConfig {
    /// Defaults to the directory of the source file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    pub prefix: String,
    pub keep: bool,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self { dir: None, prefix: DEFAULT_SCRATCH_PREFIX.to_string(), keep: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InconclusiveConfig {
    /// Runner exit codes that mean "the runner broke", not "a test failed".
    pub exit_codes: Vec<i32>,
    pub policy: InconclusivePolicy,
}

/// Serializable configuration for a bisect run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BisectConfig {
    /// Test file to bisect, relative to the project root unless absolute.
    pub source: String,
    pub strategy: Strategy,
    pub runner: RunnerConfig,
    pub scratch: ScratchConfig,
    pub inconclusive: InconclusiveConfig,
    pub write_report: bool,
}

impl Default for BisectConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            strategy: Strategy::default(),
            runner: RunnerConfig::default(),
            scratch: ScratchConfig::default(),
            inconclusive: InconclusiveConfig::default(),
            write_report: true,
        }
    }
}

impl BisectConfig {
    pub fn source_path(&self, root: &Path) -> PathBuf {
        resolve_against(root, &self.source)
    }

    pub fn scratch_dir(&self, root: &Path) -> Option<PathBuf> {
        self.scratch.dir.as_deref().map(|dir| resolve_against(root, dir))
    }
}

fn resolve_against(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load the config for a layout, falling back to defaults when none exists.
pub fn load_config(layout: &BisectLayout) -> Result<BisectConfig> {
    match layout.existing_config_path() {
        Some(path) => load_config_file(path),
        None => Ok(BisectConfig::default()),
    }
}

/// Load a config file, picking the format from its extension (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<BisectConfig> {
    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bisect config at {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        "json" => serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse bisect config JSON at {}", path.display())),
        "yaml" | "yml" => serde_yaml::from_str(&body)
            .with_context(|| format!("Failed to parse bisect config YAML at {}", path.display())),
        other => Err(anyhow!(
            "Unsupported config format '{}' for {}; use .json, .yaml or .yml",
            other,
            path.display()
        )),
    }
}

/// Write `config` as pretty JSON to the layout's config path.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_config(layout: &BisectLayout, config: &BisectConfig, force: bool) -> Result<PathBuf> {
    if !force {
        if let Some(existing) = layout.existing_config_path() {
            return Err(anyhow!(
                "Config already exists at {}; pass --force to overwrite",
                existing.display()
            ));
        }
    }
    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&layout.config_json_path, json).with_context(|| {
        format!("Failed to write bisect config: {}", layout.config_json_path.display())
    })?;
    Ok(layout.config_json_path.clone())
}
