use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bisect_core::config::{load_config, load_config_file, BisectConfig, BisectLayout};
use bisect_core::Strategy;
use tracing::debug;

use crate::canonicalize_or_current;

/// Convenience wrapper bundling root, layout and the loaded config.
#[derive(Debug, Clone)]
pub struct BisectContext {
    pub root: PathBuf,
    pub layout: BisectLayout,
    pub config: BisectConfig,
}

impl BisectContext {
    /// Resolve `root` and load config from `config_path`, or from the layout.
    pub fn load(root: &str, config_path: Option<&str>) -> Result<Self> {
        let root = canonicalize_or_current(root)?;
        let layout = BisectLayout::new(&root);
        let config = match config_path {
            Some(path) => load_config_file(&resolve_path(&root, path))?,
            None => load_config(&layout)?,
        };
        debug!(
            root = %root.display(),
            source = %config.source,
            strategy = %config.strategy,
            "loaded bisect config"
        );
        Ok(Self { root, layout, config })
    }

    /// Apply command-line overrides on top of the loaded config.
    pub fn override_with(&mut self, source: Option<&str>, strategy: Option<&str>) -> Result<()> {
        if let Some(source) = source {
            self.config.source = source.to_string();
        }
        if let Some(strategy) = strategy {
            self.config.strategy = strategy.parse::<Strategy>()?;
        }
        Ok(())
    }

    pub fn source_path(&self) -> PathBuf {
        self.config.source_path(&self.root)
    }
}

/// Read the test source to bisect.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read test source at {}", path.display()))
}

fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}
