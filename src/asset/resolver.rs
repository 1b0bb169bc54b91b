//! Factory for assets sharing one option set, plus asset host cycling.

use std::path::{Path, PathBuf};

use super::{Asset, AssetError, AssetOptions, Host, path};

/// Raw resolver options, before host normalization.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Defaults to the current directory.
    pub base: Option<PathBuf>,
    pub document_root: Option<PathBuf>,
    /// Local host aliases, with or without scheme.
    pub hosts: Vec<String>,
    /// Scheme for hosts written without one.
    pub protocol: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            base: None,
            document_root: None,
            hosts: Vec::new(),
            protocol: "http".into(),
        }
    }
}

/// Creates [`Asset`]s from a common option snapshot.
///
/// Each run (merge, cache bust) owns its resolver: the host cursor and the
/// assets' memoized paths assume sequential, single-threaded use.
#[derive(Debug)]
pub struct PathResolver {
    options: AssetOptions,
    current_host: usize,
}

impl PathResolver {
    pub fn new(options: ResolverOptions) -> Result<Self, AssetError> {
        let base = match options.base {
            Some(base) => path::absolutize(&base),
            None => std::env::current_dir()
                .map_err(|err| AssetError::Io(PathBuf::from("."), err))?,
        };

        Ok(Self {
            options: AssetOptions {
                base: Some(base),
                document_root: options.document_root.as_deref().map(path::absolutize),
                hosts: Host::parse_all(options.hosts.as_slice(), &options.protocol)?,
            },
            current_host: 0,
        })
    }

    /// Asset for `reference` carrying a copy of the current options.
    pub fn resolve(&self, reference: &str) -> Asset {
        Asset::new(reference, self.options.clone())
    }

    /// Next host in round-robin order, or `None` without hosts.
    pub fn cycle_hosts(&mut self) -> Option<Host> {
        let host = self.options.hosts.get(self.current_host)?.clone();
        self.current_host = (self.current_host + 1) % self.options.hosts.len();
        Some(host)
    }

    /// Change the base for assets resolved from now on.
    pub fn set_base(&mut self, base: impl AsRef<Path>) {
        self.options.base = Some(path::absolutize(base.as_ref()));
    }

    pub fn base(&self) -> &Path {
        self.options.base.as_deref().unwrap_or(Path::new("."))
    }

    pub fn document_root(&self) -> Option<&Path> {
        self.options.document_root.as_deref()
    }

    pub fn hosts(&self) -> &[Host] {
        &self.options.hosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_hosts(hosts: &[&str]) -> PathResolver {
        PathResolver::new(ResolverOptions {
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_base_defaults_to_current_dir() {
        let resolver = PathResolver::new(ResolverOptions::default()).unwrap();
        assert_eq!(resolver.base(), std::env::current_dir().unwrap());
    }

    #[test]
    fn test_hosts_get_scheme() {
        let resolver = with_hosts(&["localhost", "my.project", "https://x/"]);
        let hosts: Vec<_> = resolver.hosts().iter().map(ToString::to_string).collect();
        assert_eq!(hosts, ["http://localhost", "http://my.project", "https://x"]);
    }

    #[test]
    fn test_protocol_applies_to_schemeless_hosts() {
        let resolver = PathResolver::new(ResolverOptions {
            hosts: vec!["localhost".into()],
            protocol: "https".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(resolver.hosts()[0].to_string(), "https://localhost");
    }

    #[test]
    fn test_missing_protocol() {
        let result = PathResolver::new(ResolverOptions {
            hosts: vec!["localhost".into()],
            protocol: String::new(),
            ..Default::default()
        });
        assert!(matches!(result, Err(AssetError::MissingOption { option: "protocol" })));
    }

    #[test]
    fn test_resolve_shares_options() {
        let resolver = PathResolver::new(ResolverOptions {
            document_root: Some("/var/www".into()),
            hosts: vec!["localhost".into(), "mysite.com".into()],
            ..Default::default()
        })
        .unwrap();
        let asset = resolver.resolve("../images/logo.png");

        assert_eq!(asset.base(), Some(resolver.base()));
        assert_eq!(asset.document_root(), resolver.document_root());
        assert_eq!(asset.hosts(), resolver.hosts());
    }

    #[test]
    fn test_set_base_affects_later_assets_only() {
        let mut resolver = PathResolver::new(ResolverOptions {
            base: Some("/a".into()),
            ..Default::default()
        })
        .unwrap();
        let before = resolver.resolve("x.png");
        resolver.set_base("/b");
        let after = resolver.resolve("x.png");

        assert_eq!(before.filename().unwrap(), Path::new("/a/x.png"));
        assert_eq!(after.filename().unwrap(), Path::new("/b/x.png"));
    }

    #[test]
    fn test_cycle_hosts_round_robin() {
        let mut resolver = with_hosts(&["localhost", "my.project", "cdn.site"]);
        let cycled: Vec<_> = (0..6)
            .map(|_| resolver.cycle_hosts().unwrap().to_string())
            .collect();
        assert_eq!(
            cycled,
            [
                "http://localhost",
                "http://my.project",
                "http://cdn.site",
                "http://localhost",
                "http://my.project",
                "http://cdn.site",
            ]
        );
    }

    #[test]
    fn test_cycle_hosts_without_hosts() {
        let mut resolver = with_hosts(&[]);
        assert!(resolver.cycle_hosts().is_none());
        assert!(resolver.cycle_hosts().is_none());
    }
}
