//! Lexical scanning of stylesheets.
//!
//! Not a CSS parser: only `url(...)` references and `@import` statements
//! are recognized, with optional quotes and whitespace.
//!
//! | Module  | Purpose                                         |
//! |---------|-------------------------------------------------|
//! | `bust`  | Rewrite `url(...)` references with cache busters |
//! | `deps`  | Order stylesheets by their `@import` graph      |
//! | `merge` | Inline imports into one stylesheet              |

pub mod bust;
pub mod deps;
pub mod merge;

pub use bust::CssCacheBuster;
pub use deps::CssDependencyResolver;
pub use merge::{StylesheetMerger, UrlMode};

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `url(...)` with the payload in group 1. Regex is built without Unicode
/// perl classes, so whitespace is spelled out.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\([ \t\r\n\x0C"']*([^)"' \t\r\n\x0C]*)[ \t\r\n\x0C"']*\)"#)
        .expect("url pattern is valid")
});

/// `@import "a.css";`, `@import 'a.css';`, `@import url(a.css) screen;`
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*@import[ \t]+(?:url\([ \t]*["']?([^"')]+?)["']?[ \t]*\)|"([^"]+)"|'([^']+)')[^;\n]*;?"#,
    )
    .expect("import pattern is valid")
});

/// Distinct `url(...)` payloads in order of first appearance.
pub fn urls(css: &str) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for caps in URL_RE.captures_iter(css) {
        let url = &caps[1];
        if !seen.iter().any(|s| s == url) {
            seen.push(url.to_string());
        }
    }
    seen
}

/// Rewrite every `url(...)` payload in one pass.
///
/// `rewrite` returns the replacement, or `None` to keep the reference as
/// written. Quotes and whitespace around the payload are preserved.
pub fn rewrite_urls(css: &str, mut rewrite: impl FnMut(&str) -> Option<String>) -> String {
    URL_RE
        .replace_all(css, |caps: &Captures| {
            let whole = caps.get(0).expect("group 0 always matches");
            let url = caps.get(1).expect("group 1 always participates");
            match rewrite(url.as_str()) {
                Some(new) => {
                    let start = url.start() - whole.start();
                    let end = url.end() - whole.start();
                    let text = whole.as_str();
                    format!("{}{}{}", &text[..start], new, &text[end..])
                }
                None => whole.as_str().to_string(),
            }
        })
        .into_owned()
}

/// One `@import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported reference as written, without quotes.
    pub target: String,
    /// Whole statement, trimmed and `;`-terminated.
    pub statement: String,
}

impl Import {
    fn from_captures(caps: &Captures) -> Option<Self> {
        let target = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
        let mut statement = caps[0].trim().to_string();
        if !statement.ends_with(';') {
            statement.push(';');
        }
        Some(Self {
            target: target.as_str().trim().to_string(),
            statement,
        })
    }
}

/// Every `@import` statement, in source order.
pub fn imports(css: &str) -> Vec<Import> {
    IMPORT_RE
        .captures_iter(css)
        .filter_map(|caps| Import::from_captures(&caps))
        .collect()
}

/// Remove every `@import` statement, returning the remaining text and the
/// removed statements in source order.
pub fn split_imports(css: &str) -> (String, Vec<Import>) {
    let mut removed = Vec::new();
    let body = IMPORT_RE
        .replace_all(css, |caps: &Captures| {
            removed.extend(Import::from_captures(caps));
            String::new()
        })
        .into_owned();
    (body, removed)
}
