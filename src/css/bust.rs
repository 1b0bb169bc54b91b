//! Cache busters for stylesheet references.
//!
//! Rewrites every `url(...)` in a stylesheet so it carries the referenced
//! file's modification time, which lets servers send far-future expiry
//! headers. References to absolute paths (`/images/1.png`) need a document
//! root; full URLs need their host listed as a local host.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::asset::{AssetError, CacheBuster, PathOptions, PathResolver, Reference, path};
use crate::{debug, log};

/// Outcome of one [`CssCacheBuster::save`] call.
#[derive(Debug, Default)]
pub struct BustReport {
    /// File the result was written to.
    pub output: PathBuf,
    /// `(original, busted)` pairs, in order of first appearance.
    pub rewritten: Vec<(String, String)>,
    /// References left untouched because they could not be resolved.
    pub skipped: Vec<(String, AssetError)>,
}

/// Adds cache busters to the `url(...)` references of a stylesheet.
#[derive(Debug)]
pub struct CssCacheBuster {
    resolver: PathResolver,
    buster: CacheBuster,
}

impl CssCacheBuster {
    pub fn new(resolver: PathResolver, buster: CacheBuster) -> Self {
        Self { resolver, buster }
    }

    /// Distinct `url(...)` references in `file`, in order of appearance.
    #[allow(dead_code)]
    pub fn urls(&self, file: &Path) -> Result<Vec<String>, AssetError> {
        let contents = read(file)?;
        Ok(super::urls(&contents))
    }

    /// Bust every reference in `file` and write the result to `output`, or
    /// back to `file` when no output is given.
    ///
    /// References that cannot be resolved are logged and left as written;
    /// they never abort the rest of the file. A full URL on a host that is
    /// not configured fails with [`AssetError::HostMismatch`].
    pub fn save(&mut self, file: &Path, output: Option<&Path>) -> Result<BustReport, AssetError> {
        if !file.is_file() {
            return Err(AssetError::FileNotFound(file.to_path_buf()));
        }
        let contents = read(file)?;

        let file = path::absolutize(file);
        self.resolver.set_base(parent_dir(&file));

        let output = output.map_or_else(|| file.clone(), path::absolutize);
        let target = Some(parent_dir(&output)).filter(|target| target != self.resolver.base());

        let mut report = BustReport {
            output: output.clone(),
            ..Default::default()
        };
        let mut replacements = FxHashMap::default();

        for url in super::urls(&contents) {
            if !Reference::parse(&url).is_rewritable() {
                continue;
            }

            let asset = self.resolver.resolve(&self.buster.clean(&url));
            let asset = match &target {
                Some(target) => asset.rebase(target),
                None => asset,
            };

            match asset.path(PathOptions::with_cache_buster(&self.buster)) {
                Ok(busted) if busted == url => {}
                Ok(busted) => {
                    debug!("bust"; "{} -> {}", url, busted);
                    replacements.insert(url.clone(), busted.clone());
                    report.rewritten.push((url, busted));
                }
                // A foreign host is a configuration error, not a missing file
                Err(err @ AssetError::HostMismatch { .. }) => return Err(err),
                Err(err) => {
                    log!("warning"; "unable to locate {}, skipping cache buster ({})", url, err);
                    report.skipped.push((url, err));
                }
            }
        }

        let busted = super::rewrite_urls(&contents, |url| replacements.get(url).cloned());

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|err| AssetError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(&output, busted).map_err(|err| AssetError::Io(output.clone(), err))?;

        Ok(report)
    }
}

fn read(file: &Path) -> Result<String, AssetError> {
    fs::read_to_string(file).map_err(|err| AssetError::Io(file.to_path_buf(), err))
}

fn parent_dir(file: &Path) -> PathBuf {
    file.parent().map_or_else(|| PathBuf::from("/"), Path::to_path_buf)
}
