//! `merge` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::plural_count;
use crate::asset::PathResolver;
use crate::config::Config;
use crate::css::StylesheetMerger;
use crate::{debug, log};

/// Merge `files` and their imports into `output`.
pub fn merge_stylesheets(config: &Config, files: &[PathBuf], output: &Path) -> Result<()> {
    let resolver = PathResolver::new(config.resolver_options())
        .context("invalid asset path options")?;
    let mut merger = StylesheetMerger::new(resolver, config.url_mode());

    let report = merger
        .merge(files, output)
        .with_context(|| format!("failed to merge into {}", output.display()))?;

    for file in &report.files {
        debug!("merge"; "{}", file.display());
    }
    log!(
        "merge";
        "merged {} into {}",
        plural_count(report.files.len(), "stylesheet"),
        report.output.display()
    );
    Ok(())
}
