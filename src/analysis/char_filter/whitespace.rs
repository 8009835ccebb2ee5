use lazy_static::lazy_static;
use regex::Regex;

use super::CharFilter;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("whitespace pattern is valid");
}

/// Collapses every whitespace run to a single space and trims both ends.
#[derive(Clone, Debug, Default)]
pub struct CollapseWhitespaceCharFilter;

impl CollapseWhitespaceCharFilter {
    pub fn new() -> Self {
        CollapseWhitespaceCharFilter
    }
}

impl CharFilter for CollapseWhitespaceCharFilter {
    fn filter(&self, input: &str) -> String {
        WHITESPACE_RUN.replace_all(input, " ").trim().to_string()
    }

    fn name(&self) -> &str {
        "collapse_whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        let filter = CollapseWhitespaceCharFilter::new();
        assert_eq!(filter.filter("  a \t\n  b\r\nc  "), "a b c");
        assert_eq!(filter.filter("\n\n"), "");
        assert_eq!(filter.filter(""), "");
    }
}
