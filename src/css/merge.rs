//! Stylesheet merging.
//!
//! Concatenates a stylesheet and everything it imports into one file, in
//! dependency order. Inlined `@import`s are dropped; external ones are
//! hoisted to the top of the output, once each. Every `url(...)` is
//! recalculated for the merged file's location:
//!
//! | Mode       | Relative / absolute path | Full URL                          |
//! |------------|--------------------------|-----------------------------------|
//! | `path`     | relative to output       | as written, or hosts cycled       |
//! | `absolute` | absolute, hosts cycled   | absolute, hosts cycled            |
//! | `relative` | relative to output       | relative to output                |
//!
//! In `path` mode full URLs are only resolved when hosts are configured.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::CssDependencyResolver;
use crate::asset::{
    AssetError, AssetOptions, PathOptions, PathResolver, Reference, ReferenceKind, path,
};
use crate::debug;

/// How merged `url(...)` references are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    /// Document-root-absolute URLs.
    Absolute,
    /// Paths relative to the merged file.
    Relative,
    /// Keep each reference's shape.
    #[default]
    Path,
}

impl UrlMode {
    /// Mode from the `absolute_urls` / `relative_urls` switches.
    pub fn from_flags(absolute_urls: bool, relative_urls: bool) -> Self {
        match (absolute_urls, relative_urls) {
            (true, _) => Self::Absolute,
            (false, true) => Self::Relative,
            (false, false) => Self::Path,
        }
    }
}

/// Outcome of one [`StylesheetMerger::merge`] call.
#[derive(Debug)]
pub struct MergeReport {
    pub output: PathBuf,
    /// Merged stylesheets, in the order their bodies appear.
    pub files: Vec<PathBuf>,
}

/// Merges stylesheets and their imports into one file.
#[derive(Debug)]
pub struct StylesheetMerger {
    resolver: PathResolver,
    dependencies: CssDependencyResolver,
    mode: UrlMode,
}

impl StylesheetMerger {
    pub fn new(resolver: PathResolver, mode: UrlMode) -> Self {
        let dependencies = CssDependencyResolver::new(AssetOptions {
            base: None,
            document_root: resolver.document_root().map(Path::to_path_buf),
            hosts: resolver.hosts().to_vec(),
        });
        Self {
            resolver,
            dependencies,
            mode,
        }
    }

    /// Merge `files` (and their imports) and write the result to `output`.
    pub fn merge(&mut self, files: &[PathBuf], output: &Path) -> Result<MergeReport, AssetError> {
        let output = path::absolutize(output);
        let (merged, files) = self.merge_to_string(files, &output)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|err| AssetError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(&output, merged).map_err(|err| AssetError::Io(output.clone(), err))?;

        Ok(MergeReport { output, files })
    }

    /// Merge `files` as if written to `output`, without writing.
    ///
    /// Returns the merged text and the stylesheets it contains, in order.
    pub fn merge_to_string(
        &mut self,
        files: &[PathBuf],
        output: &Path,
    ) -> Result<(String, Vec<PathBuf>), AssetError> {
        let output = path::absolutize(output);
        let target = output
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

        let order = self.dependencies.resolve(files)?;
        let mut external = Vec::new();
        let mut bodies = String::new();
        for file in &order {
            let body = self.merge_file(file, &target, &mut external)?;
            bodies.push_str(&body);
            if !bodies.is_empty() && !bodies.ends_with('\n') {
                bodies.push('\n');
            }
        }

        let mut merged = String::new();
        for statement in &external {
            merged.push_str(statement);
            merged.push('\n');
        }
        merged.push_str(&bodies);

        Ok((merged, order))
    }

    /// One stylesheet's body with imports stripped and URLs recalculated
    /// relative to `target`. External imports are collected in `external`.
    fn merge_file(
        &mut self,
        file: &Path,
        target: &Path,
        external: &mut Vec<String>,
    ) -> Result<String, AssetError> {
        let contents =
            fs::read_to_string(file).map_err(|err| AssetError::Io(file.to_path_buf(), err))?;
        let (contents, imports) = super::split_imports(&contents);

        let dir = file.parent().unwrap_or(Path::new("/"));
        self.resolver.set_base(dir);

        for import in imports {
            if self.dependencies.is_inlined(&import.target, dir)
                || external.contains(&import.statement)
            {
                continue;
            }
            debug!("merge"; "hoisting external import {}", import.target);
            external.push(import.statement);
        }

        let mut replacements = FxHashMap::default();
        for url in super::urls(&contents) {
            let reference = Reference::parse(&url);
            if !reference.is_rewritable() {
                continue;
            }

            let asset = self.resolver.resolve(&url).rebase(target);
            let rewritten = match (self.mode, reference.kind()) {
                (UrlMode::Path, ReferenceKind::HostQualified) if self.resolver.hosts().is_empty() => {
                    continue;
                }
                (UrlMode::Absolute, _) | (UrlMode::Path, ReferenceKind::HostQualified) => {
                    let host = self.resolver.cycle_hosts();
                    asset.absolute_path(PathOptions::with_host(host.as_ref()))?
                }
                (UrlMode::Relative | UrlMode::Path, _) => {
                    asset.relative_path(PathOptions::default())?
                }
            };

            if rewritten != url {
                debug!("merge"; "{}: {} -> {}", file.display(), url, rewritten);
                replacements.insert(url, rewritten);
            }
        }

        Ok(super::rewrite_urls(&contents, |url| replacements.get(url).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::ResolverOptions;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let file = dir.join(name);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file, contents).unwrap();
        file
    }

    fn merger(root: Option<&Path>, hosts: &[&str], mode: UrlMode) -> StylesheetMerger {
        let resolver = PathResolver::new(ResolverOptions {
            document_root: root.map(Path::to_path_buf),
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        })
        .unwrap();
        StylesheetMerger::new(resolver, mode)
    }

    #[test]
    fn test_url_mode_from_flags() {
        assert_eq!(UrlMode::from_flags(true, false), UrlMode::Absolute);
        assert_eq!(UrlMode::from_flags(false, true), UrlMode::Relative);
        assert_eq!(UrlMode::from_flags(false, false), UrlMode::Path);
    }

    #[test]
    fn test_merge_in_dependency_order() {
        let dir = TempDir::new().unwrap();
        let a1 = write(
            dir.path(),
            "a1.css",
            "@import \"b1.css\";\n@import \"c1.css\";\n\nh1 { a: 1; }\n",
        );
        write(dir.path(), "b1.css", "@import 'd1.css';\n\nh2 { b: 1; }\n");
        write(dir.path(), "c1.css", "h3 { c: 1; }\n");
        write(dir.path(), "d1.css", "h4 { d: 1; }");
        let output = dir.path().join("a2.css");

        let report = merger(None, &[], UrlMode::Path)
            .merge(&[a1], &output)
            .unwrap();

        assert_eq!(report.files.len(), 4);
        let merged = fs::read_to_string(&output).unwrap();
        assert!(!merged.contains("@import"));

        let positions: Vec<_> = ["h4 { d: 1; }", "h2 { b: 1; }", "h3 { c: 1; }", "h1 { a: 1; }"]
            .iter()
            .map(|body| merged.find(body).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{merged}");
    }

    #[test]
    fn test_relative_urls_follow_output() {
        let dir = TempDir::new().unwrap();
        let css = write(
            dir.path(),
            "css/a.css",
            "a { b: url(../images/1.png); }\nc { d: url('sprites/2.gif'); }\n",
        );
        let output = dir.path().join("a.min.css");

        merger(None, &[], UrlMode::Path).merge(&[css], &output).unwrap();

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.contains("url(images/1.png)"), "{merged}");
        assert!(merged.contains("url('css/sprites/2.gif')"), "{merged}");
    }

    #[test]
    fn test_unchanged_urls_untouched() {
        let dir = TempDir::new().unwrap();
        let body = "a { b: url( \"../images/1.png\" ); }\n";
        let css = write(dir.path(), "css/a.css", body);
        let output = dir.path().join("out/a.css");

        merger(None, &[], UrlMode::Path).merge(&[css], &output).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), body);
    }

    #[test]
    fn test_absolute_mode() {
        let dir = TempDir::new().unwrap();
        let css = write(dir.path(), "css/a.css", "a { b: url(../images/1.png); }\n");
        let output = dir.path().join("out/a.css");

        merger(Some(dir.path()), &[], UrlMode::Absolute)
            .merge(&[css], &output)
            .unwrap();

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.contains("url(/images/1.png)"), "{merged}");
    }

    #[test]
    fn test_absolute_mode_requires_document_root() {
        let dir = TempDir::new().unwrap();
        let css = write(dir.path(), "css/a.css", "a { b: url(../images/1.png); }\n");

        let err = merger(None, &[], UrlMode::Absolute)
            .merge(&[css], &dir.path().join("out.css"))
            .unwrap_err();
        assert!(matches!(err, AssetError::MissingOption { option: "document_root" }));
    }

    #[test]
    fn test_absolute_mode_cycles_hosts() {
        let dir = TempDir::new().unwrap();
        let css = write(
            dir.path(),
            "css/a.css",
            "a { b: url(../images/1.png); }\nc { d: url(../images/2.png); }\ne { f: url(/images/3.png); }\n",
        );
        let output = dir.path().join("a.css");

        merger(Some(dir.path()), &["assets1.site", "assets2.site"], UrlMode::Absolute)
            .merge(&[css], &output)
            .unwrap();

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.contains("url(http://assets1.site/images/1.png)"), "{merged}");
        assert!(merged.contains("url(http://assets2.site/images/2.png)"), "{merged}");
        assert!(merged.contains("url(http://assets1.site/images/3.png)"), "{merged}");
    }

    #[test]
    fn test_relative_mode_converts_absolute() {
        let dir = TempDir::new().unwrap();
        let css = write(dir.path(), "css/a.css", "a { b: url(/images/1.png); }\n");
        let output = dir.path().join("out/min/a.css");

        merger(Some(dir.path()), &["localhost"], UrlMode::Relative)
            .merge(&[css], &output)
            .unwrap();

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.contains("url(../../images/1.png)"), "{merged}");
    }

    #[test]
    fn test_path_mode_renders_relative() {
        let dir = TempDir::new().unwrap();
        let css = write(
            dir.path(),
            "css/a.css",
            "a { b: url(/images/1.png); }\nc { d: url(1.png); }\n",
        );
        let output = dir.path().join("out/a.css");

        for hosts in [&[][..], &["localhost"][..]] {
            let (merged, _) = merger(Some(dir.path()), hosts, UrlMode::Path)
                .merge_to_string(&[css.clone()], &output)
                .unwrap();
            assert!(merged.contains("url(../images/1.png)"), "{merged}");
            assert!(merged.contains("url(../css/1.png)"), "{merged}");
        }
    }

    #[test]
    fn test_path_mode_cycles_hosts_for_full_urls() {
        let dir = TempDir::new().unwrap();
        let css = write(
            dir.path(),
            "css/a.css",
            "a { b: url(http://localhost/images/1.png); }\nc { d: url(http://localhost/images/2.png); }\ne { f: url(/images/3.png); }\n",
        );
        let output = dir.path().join("a.css");

        merger(Some(dir.path()), &["localhost", "cdn.site"], UrlMode::Path)
            .merge(&[css], &output)
            .unwrap();

        let merged = fs::read_to_string(&output).unwrap();
        assert!(merged.contains("url(http://localhost/images/1.png)"), "{merged}");
        assert!(merged.contains("url(http://cdn.site/images/2.png)"), "{merged}");
        assert!(merged.contains("url(images/3.png)"), "{merged}");
    }

    #[test]
    fn test_path_mode_keeps_full_urls_without_hosts() {
        let dir = TempDir::new().unwrap();
        let body = "@font-face { src: url(https://fonts.gstatic.com/x.woff2); }\n";
        let css = write(dir.path(), "css/fonts.css", body);

        let (merged, _) = merger(None, &[], UrlMode::Path)
            .merge_to_string(&[css], &dir.path().join("out/all.css"))
            .unwrap();

        assert_eq!(merged, body);
    }

    #[test]
    fn test_external_imports_hoisted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b.css", "@import 'https://cdn.example.com/reset.css';\nb { c: 1; }\n");
        let a = write(
            dir.path(),
            "a.css",
            "@import url(//fonts.example.com/css?family=Roboto);\n@import \"b.css\";\n@import 'https://cdn.example.com/reset.css';\nbody { color: red; }\n",
        );

        let (merged, files) = merger(None, &[], UrlMode::Path)
            .merge_to_string(&[a], &dir.path().join("all.css"))
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(
            merged.starts_with(
                "@import 'https://cdn.example.com/reset.css';\n@import url(//fonts.example.com/css?family=Roboto);\n"
            ),
            "{merged}"
        );
        assert_eq!(merged.matches("@import").count(), 2, "{merged}");
        assert!(merged.find("b { c: 1; }").unwrap() < merged.find("body {").unwrap());
    }

    #[test]
    fn test_foreign_host_fails() {
        let dir = TempDir::new().unwrap();
        let css = write(
            dir.path(),
            "a.css",
            "a { b: url(http://localhost/images/1.png); }\n",
        );

        let err = merger(Some(dir.path()), &["example.com"], UrlMode::Path)
            .merge(&[css], &dir.path().join("out.css"))
            .unwrap_err();
        assert!(matches!(err, AssetError::HostMismatch { .. }));
    }

    #[test]
    fn test_merge_to_string_does_not_write() {
        let dir = TempDir::new().unwrap();
        let css = write(dir.path(), "a.css", "a {}\n");
        let output = dir.path().join("never.css");

        let (merged, files) = merger(None, &[], UrlMode::Path)
            .merge_to_string(&[css], &output)
            .unwrap();

        assert_eq!(merged, "a {}\n");
        assert_eq!(files.len(), 1);
        assert!(!output.exists());
    }
}
