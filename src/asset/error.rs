//! Asset resolution error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or rendering an asset reference.
#[derive(Debug, Error)]
pub enum AssetError {
    /// A required option was not configured.
    #[error("no {} set", .option.replace('_', " "))]
    MissingOption { option: &'static str },

    /// The reference names a host that is not one of the local hosts.
    #[error("unable to resolve filename for `{reference}` using hosts [{}]", .hosts.join(", "))]
    HostMismatch {
        reference: String,
        hosts: Vec<String>,
    },

    #[error("file not found: `{}`", .0.display())]
    FileNotFound(PathBuf),

    /// The file lives outside the document root, so it has no URL.
    #[error("`{}` is outside document root `{}`", .filename.display(), .document_root.display())]
    OutsideDocumentRoot {
        filename: PathBuf,
        document_root: PathBuf,
    },

    #[error("IO error when accessing `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl AssetError {
    pub(crate) const fn missing(option: &'static str) -> Self {
        Self::MissingOption { option }
    }
}
