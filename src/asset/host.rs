//! Scheme-qualified asset hosts.
//!
//! Hosts are normalized on construction: a missing scheme is filled in from
//! the configured protocol and trailing slashes are dropped, so
//! `localhost/`, `localhost` and `http://localhost` are the same host.

use std::fmt;

use super::AssetError;

/// A local asset host such as `http://assets1.example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    scheme: String,
    name: String,
}

impl Host {
    /// Normalize `raw`, using `default_scheme` when it carries none.
    pub fn parse(raw: &str, default_scheme: &str) -> Result<Self, AssetError> {
        let trimmed = raw.trim().trim_end_matches('/');

        let (scheme, name) = match trimmed.split_once("://") {
            Some((scheme, name)) => (scheme, name),
            None if default_scheme.is_empty() => return Err(AssetError::missing("protocol")),
            None => (default_scheme.trim_end_matches("://"), trimmed),
        };

        if name.is_empty() {
            return Err(AssetError::missing("hosts"));
        }

        Ok(Self {
            scheme: scheme.to_string(),
            name: name.to_string(),
        })
    }

    /// Normalize a list of raw host strings, preserving order.
    pub fn parse_all<S: AsRef<str>>(raw: &[S], default_scheme: &str) -> Result<Vec<Self>, AssetError> {
        raw.iter()
            .map(|host| Self::parse(host.as_ref(), default_scheme))
            .collect()
    }

    /// Strip this host from the front of `reference`.
    ///
    /// Scheme and host must match exactly (ASCII case-insensitive) and be
    /// followed by a path separator or the end of the reference, so
    /// `http://example.com.evil` never matches `http://example.com`.
    pub fn strip_from<'a>(&self, reference: &'a str) -> Option<&'a str> {
        let (scheme, rest) = reference.split_once("://")?;
        if !scheme.eq_ignore_ascii_case(&self.scheme) {
            return None;
        }

        let head = rest.get(..self.name.len())?;
        let tail = &rest[self.name.len()..];
        if !head.eq_ignore_ascii_case(&self.name) {
            return None;
        }

        (tail.is_empty() || tail.starts_with('/')).then_some(tail)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.name)
    }
}
