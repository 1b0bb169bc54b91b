//! Asset version tokens for cache busting.
//!
//! Uses the file's modification time (seconds since the Unix epoch) as the
//! version. When an asset changes, its URL changes, triggering a re-fetch.
//!
//! | Kind   | Input       | Output                 |
//! |--------|-------------|------------------------|
//! | `soft` | `a/logo.png` | `a/logo.png?cb=1234`  |
//! | `hard` | `a/logo.png` | `a/logo-cb1234.png`   |

use std::io::ErrorKind;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use super::AssetError;

/// Default query parameter / infix name.
pub const DEFAULT_PARAM: &str = "cb";

/// How the version token is embedded into a URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BusterKind {
    /// Append a query parameter.
    #[default]
    Soft,
    /// Rewrite the file name.
    Hard,
}

/// Renders mtime-based version tokens into asset URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBuster {
    kind: BusterKind,
    param: Option<String>,
}

impl Default for CacheBuster {
    fn default() -> Self {
        Self::new(BusterKind::Soft)
    }
}

impl CacheBuster {
    pub fn new(kind: BusterKind) -> Self {
        Self {
            kind,
            param: Some(DEFAULT_PARAM.to_string()),
        }
    }

    /// Override the parameter name. `None` renders the bare token.
    pub fn with_param(mut self, param: Option<String>) -> Self {
        self.param = param.filter(|p| !p.is_empty());
        self
    }

    /// Version token for `filename`: its mtime in whole seconds.
    pub fn token(filename: &Path) -> Result<u64, AssetError> {
        let modified = filename
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => AssetError::FileNotFound(filename.to_path_buf()),
                _ => AssetError::Io(filename.to_path_buf(), err),
            })?;

        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0))
    }

    /// Embed `token` into a URL path and its query string.
    pub fn apply(&self, path: &mut String, query: &mut Option<String>, token: u64) {
        let param = self.param.as_deref();
        match self.kind {
            BusterKind::Soft => {
                let pair = match param {
                    Some(name) => format!("{name}={token}"),
                    None => token.to_string(),
                };
                *query = Some(match query.take().filter(|q| !q.is_empty()) {
                    Some(existing) => format!("{existing}&{pair}"),
                    None => pair,
                });
            }
            BusterKind::Hard => {
                let infix = format!("-{}{token}", param.unwrap_or_default());
                let (stem, ext) = split_extension(path);
                *path = format!("{stem}{infix}{ext}");
            }
        }
    }

    /// Remove tokens a previous run left in `reference`, in either form.
    ///
    /// Soft tokens are the `<param>=<digits>` query pair (or a bare
    /// `<digits>` pair when no parameter name is used). Hard tokens are a
    /// `-<param><digits>` infix before the extension; without a parameter
    /// name hard tokens are kept, since `icon-16.png` is indistinguishable.
    pub fn clean(&self, reference: &str) -> String {
        let (rest, fragment) = match reference.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (reference, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };

        let path = match &self.param {
            Some(param) => strip_hard_token(path, param),
            None => path.to_string(),
        };

        let mut cleaned = path;
        if let Some(query) = query {
            let kept: Vec<_> = query
                .split('&')
                .filter(|pair| !self.is_soft_token(pair))
                .collect();
            if query.is_empty() {
                // A bare `?` (`font.eot?#iefix`) is kept as written
                cleaned.push('?');
            } else if !kept.is_empty() {
                cleaned.push('?');
                cleaned.push_str(&kept.join("&"));
            }
        }
        if let Some(fragment) = fragment {
            cleaned.push('#');
            cleaned.push_str(fragment);
        }
        cleaned
    }

    fn is_soft_token(&self, pair: &str) -> bool {
        let value = match &self.param {
            Some(param) => match pair.split_once('=') {
                Some((name, value)) if name == param => value,
                _ => return false,
            },
            None => pair,
        };
        !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Split the last path segment at its extension dot.
///
/// Dotfiles (`.htaccess`) and names without a dot have no extension.
fn split_extension(path: &str) -> (&str, &str) {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => path.split_at(segment_start + dot),
        _ => (path, ""),
    }
}

fn strip_hard_token(path: &str, param: &str) -> String {
    let (stem, ext) = split_extension(path);
    let marker = format!("-{param}");
    if let Some(pos) = stem.rfind(&marker) {
        let digits = &stem[pos + marker.len()..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return format!("{}{ext}", &stem[..pos]);
        }
    }
    path.to_string()
}
