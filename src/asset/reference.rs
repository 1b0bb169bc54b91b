//! Syntactic classification of asset references.

/// Shape of an asset reference as written in a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// File-relative path (`../images/logo.png`, `logo.png`).
    Relative,
    /// Document-root-relative path (`/images/logo.png`).
    Absolute,
    /// Full URL with scheme and host (`http://localhost/images/logo.png`).
    HostQualified,
}

/// A raw reference split into its path, query string and fragment.
///
/// Only the path takes part in filesystem resolution; query and fragment
/// are carried through to rendered URLs (`font.eot?#iefix`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    raw: String,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Reference {
    pub fn parse(raw: &str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (raw, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        Self {
            raw: raw.to_string(),
            path: path.to_string(),
            query,
            fragment,
        }
    }

    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Classify the path part. Host-qualified wins over absolute, which
    /// wins over relative.
    pub fn kind(&self) -> ReferenceKind {
        if has_host_scheme(&self.path) {
            ReferenceKind::HostQualified
        } else if self.path.starts_with('/') {
            ReferenceKind::Absolute
        } else {
            ReferenceKind::Relative
        }
    }

    /// Whether the reference names a file that can be resolved.
    ///
    /// Inline data (`data:`), other URI schemes, protocol-relative URLs
    /// (`//cdn/...`) and fragment-only references (`#filter`) are not.
    pub fn is_rewritable(&self) -> bool {
        if self.path.is_empty() || self.path.starts_with("//") {
            return false;
        }
        has_host_scheme(&self.path) || !has_any_scheme(&self.path)
    }

    /// Reassemble a URL from a rendered path and query, keeping the
    /// original fragment.
    pub fn render(&self, path: &str, query: Option<&str>) -> String {
        let mut url = path.to_string();
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }
}

/// `[a-zA-Z]{3,5}://` prefix (http, https, ftp, ...).
fn has_host_scheme(path: &str) -> bool {
    path.find("://").is_some_and(|pos| {
        (3..=5).contains(&pos) && path[..pos].chars().all(|c| c.is_ascii_alphabetic())
    })
}

/// Any `scheme:` prefix before the first slash (`data:`, `mailto:`).
fn has_any_scheme(path: &str) -> bool {
    let head = path.split('/').next().unwrap_or(path);
    head.find(':').is_some_and(|pos| {
        pos > 0
            && head[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_relative() {
        assert_eq!(Reference::parse("../images/1.png").kind(), ReferenceKind::Relative);
        assert_eq!(Reference::parse("1.png").kind(), ReferenceKind::Relative);
    }

    #[test]
    fn test_kind_absolute() {
        assert_eq!(Reference::parse("/images/1.png").kind(), ReferenceKind::Absolute);
    }

    #[test]
    fn test_kind_host_qualified() {
        assert_eq!(
            Reference::parse("http://localhost/images/1.png").kind(),
            ReferenceKind::HostQualified
        );
        assert_eq!(
            Reference::parse("https://localhost/images/1.png").kind(),
            ReferenceKind::HostQualified
        );
    }

    #[test]
    fn test_parse_query_and_fragment() {
        let reference = Reference::parse("fonts/a.eot?#iefix");
        assert_eq!(reference.path(), "fonts/a.eot");
        assert_eq!(reference.query(), Some(""));
        assert_eq!(reference.render("x/a.eot", Some("cb=1")), "x/a.eot?cb=1#iefix");
    }

    #[test]
    fn test_render_without_suffix() {
        let reference = Reference::parse("a.png");
        assert_eq!(reference.render("../a.png", None), "../a.png");
    }

    #[test]
    fn test_is_rewritable() {
        assert!(Reference::parse("a.png").is_rewritable());
        assert!(Reference::parse("/a.png").is_rewritable());
        assert!(Reference::parse("http://localhost/a.png").is_rewritable());
        assert!(!Reference::parse("data:image/png;base64,iVBOR").is_rewritable());
        assert!(!Reference::parse("#filter").is_rewritable());
        assert!(!Reference::parse("//cdn.example.com/a.png").is_rewritable());
        assert!(!Reference::parse("").is_rewritable());
    }
}
