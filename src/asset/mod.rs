//! Asset references and their path forms.
//!
//! An [`Asset`] is one file referenced from a stylesheet plus the options
//! needed to locate it on disk and to render it back as a URL:
//!
//! | Form              | Example                             | Needs           |
//! |-------------------|-------------------------------------|-----------------|
//! | `filename`        | `/var/www/public/images/logo.png`   | base / root     |
//! | `relative_path`   | `../images/logo.png`                | base            |
//! | `absolute_path`   | `/images/logo.png`                  | document root   |
//! | with host         | `http://assets1.example.com/...`    | document root   |
//! | with cache buster | `/images/logo.png?cb=1234567890`    | existing file   |
//!
//! Assets are usually created through [`PathResolver::resolve`], which
//! stamps a shared option set onto each of them:
//!
//! ```ignore
//! let resolver = PathResolver::new(ResolverOptions {
//!     base: Some("/var/www/public/stylesheets".into()),
//!     document_root: Some("/var/www/public".into()),
//!     hosts: vec!["assets1.example.com".into()],
//!     ..Default::default()
//! })?;
//! let asset = resolver.resolve("../images/logo.png");
//! asset.absolute_path(PathOptions::default())?; // "/images/logo.png"
//! ```

mod error;
mod host;
pub mod path;
mod reference;
mod resolver;
pub mod version;

pub use error::AssetError;
pub use host::Host;
pub use reference::{Reference, ReferenceKind};
pub use resolver::{PathResolver, ResolverOptions};
pub use version::{BusterKind, CacheBuster};

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Options shared by every asset a resolver creates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetOptions {
    /// Directory relative paths are computed from.
    pub base: Option<PathBuf>,
    /// Server root for absolute URLs.
    pub document_root: Option<PathBuf>,
    /// Hosts considered local (normalized, scheme-qualified).
    pub hosts: Vec<Host>,
}

/// Per-call rendering options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOptions<'a> {
    /// Prefix absolute paths with this host.
    pub host: Option<&'a Host>,
    /// Embed the file's version token.
    pub cache_buster: Option<&'a CacheBuster>,
}

impl<'a> PathOptions<'a> {
    pub fn with_host(host: Option<&'a Host>) -> Self {
        Self {
            host,
            cache_buster: None,
        }
    }

    pub fn with_cache_buster(cache_buster: &'a CacheBuster) -> Self {
        Self {
            host: None,
            cache_buster: Some(cache_buster),
        }
    }
}

/// A file referenced from a stylesheet.
///
/// Derived paths are computed on first access and cached for the lifetime
/// of the value. [`Asset::rebase`] returns a fresh value instead of
/// mutating, so caches never go stale.
#[derive(Debug)]
pub struct Asset {
    reference: Reference,
    options: AssetOptions,
    /// Directory the raw reference was written relative to. Stays fixed
    /// across rebases, while `options.base` moves.
    origin: Option<PathBuf>,
    filename: OnceCell<PathBuf>,
    relative_path: OnceCell<String>,
    absolute_path: OnceCell<String>,
}

impl Asset {
    pub fn new(reference: &str, options: AssetOptions) -> Self {
        let options = AssetOptions {
            base: options.base.as_deref().map(path::absolutize),
            document_root: options.document_root.as_deref().map(path::absolutize),
            hosts: options.hosts,
        };
        Self {
            reference: Reference::parse(reference),
            origin: options.base.clone(),
            options,
            filename: OnceCell::new(),
            relative_path: OnceCell::new(),
            absolute_path: OnceCell::new(),
        }
    }

    #[inline]
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    #[inline]
    pub fn base(&self) -> Option<&Path> {
        self.options.base.as_deref()
    }

    #[inline]
    pub fn document_root(&self) -> Option<&Path> {
        self.options.document_root.as_deref()
    }

    #[allow(dead_code)]
    #[inline]
    pub fn hosts(&self) -> &[Host] {
        &self.options.hosts
    }

    /// Same file, with relative paths computed from `base`.
    ///
    /// Used to move a reference found in one stylesheet into another file
    /// living in a different directory.
    pub fn rebase(&self, base: impl AsRef<Path>) -> Self {
        let mut rebased = Self::new(
            self.reference.raw(),
            AssetOptions {
                base: Some(base.as_ref().to_path_buf()),
                ..self.options.clone()
            },
        );
        rebased.origin = self.origin.clone();
        if let Some(filename) = self.filename.get() {
            let _ = rebased.filename.set(filename.clone());
        }
        rebased
    }

    /// Absolute path of the file on disk.
    ///
    /// Relative references need `base`; absolute and host-qualified ones
    /// need `document_root`. A host-qualified reference must name one of
    /// the configured hosts, otherwise resolution fails rather than guess.
    pub fn filename(&self) -> Result<&Path, AssetError> {
        if let Some(filename) = self.filename.get() {
            return Ok(filename.as_path());
        }
        let resolved = self.resolve_filename()?;
        Ok(self.filename.get_or_init(|| resolved).as_path())
    }

    fn resolve_filename(&self) -> Result<PathBuf, AssetError> {
        let raw_path = self.reference.path();

        let (root, path) = match self.reference.kind() {
            ReferenceKind::Relative => {
                let origin = self.origin.as_deref().ok_or(AssetError::missing("base"))?;
                (origin, raw_path)
            }
            ReferenceKind::Absolute => (self.require_document_root()?, raw_path),
            ReferenceKind::HostQualified => {
                let root = self.require_document_root()?;
                if self.options.hosts.is_empty() {
                    return Err(AssetError::missing("hosts"));
                }
                let path = self
                    .options
                    .hosts
                    .iter()
                    .find_map(|host| host.strip_from(raw_path))
                    .ok_or_else(|| AssetError::HostMismatch {
                        reference: self.reference.raw().to_string(),
                        hosts: self.options.hosts.iter().map(ToString::to_string).collect(),
                    })?;
                (root, path)
            }
        };

        Ok(path::normalize(&root.join(path.trim_start_matches('/'))))
    }

    /// The configured host this reference was written with, if any.
    pub fn written_host(&self) -> Option<&Host> {
        if self.reference.kind() != ReferenceKind::HostQualified {
            return None;
        }
        self.options
            .hosts
            .iter()
            .find(|host| host.strip_from(self.reference.path()).is_some())
    }

    /// Path from `base` to the file, e.g. `../images/logo.png`.
    pub fn relative_path(&self, options: PathOptions<'_>) -> Result<String, AssetError> {
        let plain = match self.relative_path.get() {
            Some(plain) => plain,
            None => {
                let base = self.base().ok_or(AssetError::missing("base"))?;
                let computed = path::to_url(&path::relative_to(self.filename()?, base));
                self.relative_path.get_or_init(|| computed)
            }
        };
        self.decorate(plain, options.cache_buster)
    }

    /// Document-root-relative URL, e.g. `/images/logo.png`, optionally
    /// prefixed with a host.
    pub fn absolute_path(&self, options: PathOptions<'_>) -> Result<String, AssetError> {
        let plain = match self.absolute_path.get() {
            Some(plain) => plain,
            None => {
                let root = self.require_document_root()?;
                let filename = self.filename()?;
                let stripped = filename.strip_prefix(root).map_err(|_| {
                    AssetError::OutsideDocumentRoot {
                        filename: filename.to_path_buf(),
                        document_root: root.to_path_buf(),
                    }
                })?;
                let computed = format!("/{}", path::to_url(stripped));
                self.absolute_path.get_or_init(|| computed)
            }
        };

        let url = self.decorate(plain, options.cache_buster)?;
        Ok(match options.host {
            Some(host) => format!("{host}{url}"),
            None => url,
        })
    }

    /// Render the reference in the form it was written in.
    ///
    /// Relative references stay relative (to `base`), absolute ones stay
    /// absolute. Host-qualified references keep their own host unless
    /// `options.host` replaces it.
    pub fn path(&self, options: PathOptions<'_>) -> Result<String, AssetError> {
        match self.reference.kind() {
            ReferenceKind::Relative => self.relative_path(options),
            ReferenceKind::Absolute => self.absolute_path(options),
            ReferenceKind::HostQualified => {
                // Resolve first so a foreign host fails with HostMismatch
                self.filename()?;
                let host = options.host.or_else(|| self.written_host());
                self.absolute_path(PathOptions { host, ..options })
            }
        }
    }

    #[allow(dead_code)]
    pub fn basename(&self) -> Result<String, AssetError> {
        Ok(self
            .filename()?
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default())
    }

    #[allow(dead_code)]
    pub fn dirname(&self) -> Result<&Path, AssetError> {
        let filename = self.filename()?;
        Ok(filename.parent().unwrap_or(filename))
    }

    #[allow(dead_code)]
    pub fn exists(&self) -> bool {
        self.filename().is_ok_and(Path::exists)
    }

    /// Re-attach query and fragment, embedding a version token if asked.
    fn decorate(&self, plain: &str, buster: Option<&CacheBuster>) -> Result<String, AssetError> {
        let mut path = plain.to_string();
        let mut query = self.reference.query().map(str::to_string);

        if let Some(buster) = buster {
            let token = CacheBuster::token(self.filename()?)?;
            buster.apply(&mut path, &mut query, token);
        }

        Ok(self.reference.render(&path, query.as_deref()))
    }

    fn require_document_root(&self) -> Result<&Path, AssetError> {
        self.document_root()
            .ok_or(AssetError::missing("document_root"))
    }
}
