use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::bisect::BisectError;

/// Where probe variants are written for the skip-rewrite strategy.
///
/// Each keep count gets its own file (`<prefix><k><suffix>`, or
/// `<prefix>full<suffix>` for the whole suite), so probes never share a path.
/// Files already on disk are never reused: a taken name gets `_1`, `_2`, ...
/// appended to its stem.
/// `suffix` is the source file name from its first `.` onward, which keeps
/// runner test-file globs like `*.test.ts` matching.
#[derive(Debug, Clone)]
pub struct ScratchPlan {
    pub dir: PathBuf,
    pub prefix: String,
    pub suffix: String,
    /// Leave files on disk after each probe for inspection.
    pub keep: bool,
}

impl ScratchPlan {
    /// Plan scratch files next to `source` unless `dir` overrides it.
    ///
    /// The default location matters: variants must resolve relative imports
    /// exactly like the original.
    pub fn for_source(
        source: &Path,
        dir: Option<&Path>,
        prefix: impl Into<String>,
        keep: bool,
    ) -> Self {
        let dir = match dir {
            Some(d) => d.to_path_buf(),
            None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let file_name = source.file_name().map(|n| n.to_string_lossy().to_string());
        let suffix = file_name
            .as_deref()
            .and_then(|name| name.find('.').map(|idx| name[idx..].to_string()))
            .unwrap_or_default();
        Self { dir, prefix: prefix.into(), suffix, keep }
    }

    /// Planned path for a probe, before any collision handling.
    pub fn path_for(&self, keep_count: usize, total: usize) -> PathBuf {
        self.candidate(keep_count, total, 0)
    }

    fn candidate(&self, keep_count: usize, total: usize, attempt: usize) -> PathBuf {
        let mut stem = if keep_count == total {
            format!("{}full", self.prefix)
        } else {
            format!("{}{}", self.prefix, keep_count)
        };
        if attempt > 0 {
            stem.push_str(&format!("_{attempt}"));
        }
        self.dir.join(format!("{stem}{}", self.suffix))
    }

    /// Create a fresh file for this probe and write the whole variant to it.
    ///
    /// Returns the path actually used, which is the only path [`discard`]
    /// may later remove.
    ///
    /// [`discard`]: ScratchPlan::discard
    pub fn create(
        &self,
        keep_count: usize,
        total: usize,
        text: &str,
    ) -> Result<PathBuf, BisectError> {
        let mut attempt = 0;
        loop {
            let path = self.candidate(keep_count, total, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    if let Err(source) = file.write_all(text.as_bytes()) {
                        drop(file);
                        let _ = fs::remove_file(&path);
                        return Err(BisectError::Scratch { path, source });
                    }
                    return Ok(path);
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "scratch path already exists; trying next name");
                    attempt += 1;
                }
                Err(source) => return Err(BisectError::Scratch { path, source }),
            }
        }
    }

    /// Remove a probe file unless the plan keeps them. Failures are only logged.
    pub fn discard(&self, path: &Path) {
        if self.keep {
            return;
        }
        if let Err(err) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %err, "failed to remove scratch file");
        }
    }
}
