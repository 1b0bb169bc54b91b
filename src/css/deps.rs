//! Stylesheet dependency ordering.
//!
//! Follows `@import` statements depth-first and yields every stylesheet
//! after the stylesheets it imports. Each file appears once, no matter how
//! many times it is imported, and import cycles are cut at the first
//! revisit.
//!
//! Only local stylesheets are followed. Imports of other URI schemes,
//! protocol-relative URLs and full URLs on hosts that are not configured
//! are external: they are never read and stay `@import`s in the output.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::asset::{Asset, AssetError, AssetOptions, ReferenceKind, path};
use crate::debug;

/// Resolves `@import` graphs into merge order.
#[derive(Debug, Clone, Default)]
pub struct CssDependencyResolver {
    /// Used for imports' document root and local hosts; `base` is replaced
    /// by each importing file's directory.
    options: AssetOptions,
}

impl CssDependencyResolver {
    pub fn new(options: AssetOptions) -> Self {
        Self { options }
    }

    /// All stylesheets reachable from `files`, dependencies first.
    pub fn resolve(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>, AssetError> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::new();
        for file in files {
            self.visit(&path::absolutize(file), &mut visited, &mut order)?;
        }
        Ok(order)
    }

    /// Whether `import`, written in a stylesheet in `dir`, names a local
    /// stylesheet that gets inlined.
    pub fn is_inlined(&self, import: &str, dir: &Path) -> bool {
        self.local_import(import, dir).is_some()
    }

    fn local_import(&self, import: &str, dir: &Path) -> Option<Asset> {
        let asset = Asset::new(
            import,
            AssetOptions {
                base: Some(dir.to_path_buf()),
                ..self.options.clone()
            },
        );
        let reference = asset.reference();
        let local = reference.is_rewritable()
            && (reference.kind() != ReferenceKind::HostQualified
                || asset.written_host().is_some());
        local.then_some(asset)
    }

    fn visit(
        &self,
        file: &Path,
        visited: &mut FxHashSet<PathBuf>,
        order: &mut Vec<PathBuf>,
    ) -> Result<(), AssetError> {
        if !visited.insert(file.to_path_buf()) {
            return Ok(());
        }
        if !file.is_file() {
            return Err(AssetError::FileNotFound(file.to_path_buf()));
        }

        let contents =
            fs::read_to_string(file).map_err(|err| AssetError::Io(file.to_path_buf(), err))?;
        let dir = file.parent().unwrap_or(Path::new("/"));

        for import in super::imports(&contents) {
            let Some(asset) = self.local_import(&import.target, dir) else {
                debug!("merge"; "keeping external import {} in {}", import.target, file.display());
                continue;
            };
            let dependency = asset.filename()?.to_path_buf();
            self.visit(&dependency, visited, order)?;
        }

        order.push(file.to_path_buf());
        Ok(())
    }
}
