//! Char filters that rewrite raw source text before tokenization.
//!
//! Each filter is one named rewrite rule. The
//! [`SourceNormalizer`](crate::analysis::normalizer::SourceNormalizer) chains
//! them in a fixed order to turn raw code into canonical text.
//!
//! # Available Filters
//!
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//! - [`whitespace::CollapseWhitespaceCharFilter`] - Whitespace run collapsing and trimming
//!
//! # Examples
//!
//! ```
//! use codelang::analysis::char_filter::CharFilter;
//! use codelang::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new("hash_comment", r"#.*", "").unwrap();
//! assert_eq!(filter.filter("x = 1 # one"), "x = 1 ");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the rewritten text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &str;
}

pub mod pattern_replace;
pub mod whitespace;
