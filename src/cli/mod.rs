//! Command-line interface module.

mod args;
pub mod bust;
pub mod merge;

pub use args::{Cli, Commands, DEFAULT_CONFIG};

/// Format count with noun, handling pluralization
///
/// - `plural_count(0, "file")` -> `"0 files"`
/// - `plural_count(1, "file")` -> `"1 file"`
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{} {}{}", count, noun, if count == 1 { "" } else { "s" })
}
