//! Command handler modules for the `sra` CLI.
//!
//! Shared config helpers live here; `replay` holds the session replay path.

pub mod replay;

use anyhow::{Context, Result};
use sra_config::{LoadedConfig, UnusedKeyPolicy};
use tracing::warn;

pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    sra_config::load_layered_yaml(&path_refs).context("config load failed")
}

/// Warn about (or with `strict`, reject) config leaves nothing reads.
pub fn check_unused_keys(loaded: &LoadedConfig, strict: bool) -> Result<()> {
    let policy = if strict {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = sra_config::report_unused_keys(&loaded.config_json, policy)?;
    if !report.is_clean() {
        warn!(
            unused = ?report.unused_leaf_pointers,
            "config contains keys nothing reads"
        );
    }
    Ok(())
}
