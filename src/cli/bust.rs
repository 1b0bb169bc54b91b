//! `bust` command.

use std::path::Path;

use anyhow::{Context, Result};

use super::plural_count;
use crate::asset::PathResolver;
use crate::config::Config;
use crate::css::CssCacheBuster;
use crate::{debug, log};

/// Add cache busters to `file`, writing to `output` or back in place.
pub fn bust_stylesheet(config: &Config, file: &Path, output: Option<&Path>) -> Result<()> {
    let resolver = PathResolver::new(config.resolver_options())
        .context("invalid asset path options")?;
    let mut buster = CssCacheBuster::new(resolver, config.cache_buster());

    let report = buster
        .save(file, output)
        .with_context(|| format!("failed to bust {}", file.display()))?;

    for (original, busted) in &report.rewritten {
        debug!("bust"; "{} -> {}", original, busted);
    }

    if report.skipped.is_empty() {
        log!("bust"; "{} in {}", plural_count(report.rewritten.len(), "url"), report.output.display());
    } else {
        log!(
            "bust";
            "{} in {}, {} skipped",
            plural_count(report.rewritten.len(), "url"),
            report.output.display(),
            report.skipped.len()
        );
    }
    Ok(())
}
