use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::bisect::{BisectOutcome, BisectReport, ProbeRecord};
use crate::config::BisectLayout;
use crate::materialize::Strategy;

/// Persisted record of one bisect run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub tool_version: String,
    pub started_at: String,
    pub finished_at: String,
    pub source: String,
    /// SHA-256 of the source text the run was based on.
    pub source_hash: String,
    pub strategy: Strategy,
    pub total: usize,
    pub probes: Vec<ProbeRecord>,
    pub outcome: BisectOutcome,
}

impl RunReport {
    pub fn new(
        source: &Path,
        source_text: &str,
        strategy: Strategy,
        started_at: DateTime<Utc>,
        report: BisectReport,
    ) -> Self {
        Self {
            tool_version: crate::version().to_string(),
            started_at: started_at.to_rfc3339(),
            finished_at: Utc::now().to_rfc3339(),
            source: source.display().to_string(),
            source_hash: sha256_hex(source_text.as_bytes()),
            strategy,
            total: report.total,
            probes: report.probes,
            outcome: report.outcome,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write `report` under the layout's reports dir as `run-<timestamp>.json`.
///
/// A numeric suffix is added if a report from the same second already exists.
pub fn write_report(
    layout: &BisectLayout,
    started_at: DateTime<Utc>,
    report: &RunReport,
) -> Result<PathBuf> {
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;

    let stamp = started_at.format("%Y%m%dT%H%M%SZ").to_string();
    let mut path = layout.reports_dir.join(format!("run-{stamp}.json"));
    let mut n = 1;
    while path.exists() {
        path = layout.reports_dir.join(format!("run-{stamp}-{n}.json"));
        n += 1;
    }

    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write run report: {}", path.display()))?;
    Ok(path)
}
