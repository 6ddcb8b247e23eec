use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bisect_core::config::{write_config, BisectConfig, BisectLayout};

use crate::canonicalize_or_current;

/// Write a default config under `<root>/.prefix-bisect/`.
pub fn init_command(root: &str, force: bool) -> Result<PathBuf> {
    let root_path = canonicalize_or_current(root)?;
    let layout = BisectLayout::new(&root_path);
    let config = BisectConfig::default();

    let config_path = write_config(&layout, &config, force)?;
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;

    println!("Initialized prefix-bisect config:");
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", config_path.display());
    println!("  Source: {}", config.source);
    println!("  Strategy: {}", config.strategy);
    println!("  Runner: {} {}", config.runner.program, config.runner.args.join(" "));
    println!("  Reports dir: {}", layout.reports_dir.display());

    Ok(config_path)
}
