//! Filesystem path algebra for asset references.
//!
//! - `absolutize` - make a path absolute against the current directory
//! - `normalize` - resolve `.` and `..` lexically (no symlink resolution)
//! - `relative_to` - shortest relative path between two absolute paths
//! - `to_url` - render a path with forward slashes

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute and lexically normalized.
///
/// Relative paths are joined with the current directory. Falls back to the
/// path as-is if the current directory cannot be read.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        std::env::current_dir().map_or_else(|_| normalize(path), |cwd| normalize(&cwd.join(path)))
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root, matching how URLs resolve.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path from directory `base` to `target`.
///
/// Both paths are expected to be absolute and normalized. Shared leading
/// components are elided and every remaining `base` component becomes `..`.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target: Vec<_> = target.components().collect();
    let base: Vec<_> = base.components().collect();

    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &target[common..] {
        out.push(component.as_os_str());
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Render a path for use inside a URL (forward slashes on every platform).
pub fn to_url(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_parent_and_current() {
        assert_eq!(
            normalize(Path::new("/var/www/public/stylesheets/../images/./logo.png")),
            PathBuf::from("/var/www/public/images/logo.png")
        );
    }

    #[test]
    fn test_normalize_parent_at_root() {
        assert_eq!(normalize(Path::new("/../a.png")), PathBuf::from("/a.png"));
    }

    #[test]
    fn test_absolutize_relative() {
        let abs = absolutize(Path::new("relative/path/file.css"));
        assert!(abs.is_absolute());
        assert!(abs.ends_with("relative/path/file.css"));
    }

    #[test]
    fn test_relative_to_sibling_directory() {
        let rel = relative_to(
            Path::new("/var/www/public/images/logo.png"),
            Path::new("/var/www/public/stylesheets"),
        );
        assert_eq!(rel, PathBuf::from("../images/logo.png"));
    }

    #[test]
    fn test_relative_to_nested() {
        let rel = relative_to(
            Path::new("/var/www/public/images/logo.png"),
            Path::new("/var/www/public"),
        );
        assert_eq!(rel, PathBuf::from("images/logo.png"));
    }

    #[test]
    fn test_relative_to_deeply_divergent() {
        let rel = relative_to(Path::new("/a/b/c.png"), Path::new("/x/y/z"));
        assert_eq!(rel, PathBuf::from("../../../a/b/c.png"));
    }

    #[test]
    fn test_relative_to_self() {
        assert_eq!(relative_to(Path::new("/a/b"), Path::new("/a/b")), PathBuf::from("."));
    }

    #[test]
    fn test_to_url() {
        assert_eq!(to_url(Path::new("../images/1.png")), "../images/1.png");
    }
}
