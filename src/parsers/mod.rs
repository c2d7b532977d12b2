pub mod pairs;


use regex::Regex;
use std::sync::LazyLock;

static BEFORE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\s*\-•]*before:\s*(\S.*)$").expect("valid regex"));

static AFTER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\s*\-•]*after:\s*(\S.*)$").expect("valid regex"));

/// Which side of a pair a line declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `Before: <url>` line, the reference page
    Before,
    /// `After: <url>` line, the page under test
    After,
}

impl Marker {
    /// Classifies a single trimmed line.
    ///
    /// Returns the marker together with the trimmed remainder of the line, or
    /// `None` when the line declares neither side. The keyword is matched
    /// case-insensitively and may be preceded by bullets (`*`, `-`, `•`) or
    /// whitespace.
    pub fn classify(line: &str) -> Option<(Marker, &str)> {
        if let Some(caps) = BEFORE_LINE.captures(line) {
            let value = caps.get(1)?.as_str().trim();
            ::log::trace!("Classified as Before: {}", value);
            return Some((Marker::Before, value));
        }

        if let Some(caps) = AFTER_LINE.captures(line) {
            let value = caps.get(1)?.as_str().trim();
            ::log::trace!("Classified as After: {}", value);
            return Some((Marker::After, value));
        }

        None
    }
}
