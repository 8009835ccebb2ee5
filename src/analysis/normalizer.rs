//! Source code normalization.
//!
//! The normalizer turns raw source text into canonical text by applying an
//! ordered list of named rules:
//!
//! 1. Line comments: `#`, `//`, `--` and `;` up to the end of the line
//! 2. Block comments, spanning lines, matched non-greedily: `/* */`,
//!    `""" """`, `''' '''`, `{- -}` and `<!-- -->`
//! 3. Quoted string literals become `STRING`
//! 4. Bare integer literals become `NUMBER`
//! 5. Whitespace runs collapse to one space; ends are trimmed
//!
//! Comments are always stripped before literals are replaced.
//!
//! # Examples
//!
//! ```
//! use codelang::analysis::normalizer::SourceNormalizer;
//!
//! let normalizer = SourceNormalizer::new();
//! let text = normalizer.normalize("def foo(): # comment\n  return \"hi\"");
//! assert_eq!(text.as_str(), "def foo(): return STRING");
//! ```

use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::char_filter::whitespace::CollapseWhitespaceCharFilter;

/// Placeholder substituted for quoted string literals.
pub const STRING_PLACEHOLDER: &str = "STRING";

/// Placeholder substituted for bare integer literals.
pub const NUMBER_PLACEHOLDER: &str = "NUMBER";

/// Upper bound on rule-list passes when searching for a fixed point.
const MAX_PASSES: usize = 16;

lazy_static! {
    static ref DEFAULT_RULES: Vec<Arc<dyn CharFilter>> = build_default_rules();
}

fn pattern_rule(name: &str, pattern: &str, replacement: &str) -> Arc<dyn CharFilter> {
    Arc::new(
        PatternReplaceCharFilter::new(name, pattern, replacement)
            .expect("Default normalization pattern should be valid"),
    )
}

fn build_default_rules() -> Vec<Arc<dyn CharFilter>> {
    vec![
        pattern_rule("hash_line_comment", r"#.*", ""),
        pattern_rule("slash_line_comment", r"//.*", ""),
        pattern_rule("dash_line_comment", r"--.*", ""),
        pattern_rule("semicolon_line_comment", r";.*", ""),
        pattern_rule("c_block_comment", r"(?s)/\*.*?\*/", ""),
        pattern_rule("double_triple_quote_block", r#"(?s)""".*?""""#, ""),
        pattern_rule("single_triple_quote_block", r"(?s)'''.*?'''", ""),
        pattern_rule("haskell_block_comment", r"(?s)\{-.*?-\}", ""),
        pattern_rule("markup_comment", r"(?s)<!--.*?-->", ""),
        pattern_rule("double_quoted_string", r#"".*?""#, STRING_PLACEHOLDER),
        pattern_rule("single_quoted_string", r"'.*?'", STRING_PLACEHOLDER),
        pattern_rule("integer_literal", r"\b\d+\b", NUMBER_PLACEHOLDER),
        Arc::new(CollapseWhitespaceCharFilter::new()),
    ]
}

/// Canonical source text produced by [`SourceNormalizer::normalize`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Applies an ordered list of char filters until the text stops changing.
#[derive(Clone)]
pub struct SourceNormalizer {
    rules: Vec<Arc<dyn CharFilter>>,
}

impl fmt::Debug for SourceNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceNormalizer")
            .field("rules", &self.rule_names())
            .finish()
    }
}

impl Default for SourceNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceNormalizer {
    /// Create a normalizer with the default comment/literal/whitespace rules.
    pub fn new() -> Self {
        SourceNormalizer {
            rules: DEFAULT_RULES.clone(),
        }
    }

    /// Create a normalizer with a custom ordered rule list.
    pub fn with_rules(rules: Vec<Arc<dyn CharFilter>>) -> Self {
        SourceNormalizer { rules }
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[Arc<dyn CharFilter>] {
        &self.rules
    }

    /// Names of the rules in application order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Apply every rule exactly once, in order.
    pub fn apply_once(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.filter(&acc))
    }

    /// Normalize raw source text.
    ///
    /// Removing a comment can splice two fragments into a new comment marker,
    /// so the rule list is re-applied until the output is stable. This makes
    /// `normalize(normalize(x)) == normalize(x)` hold for every input.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let mut current = self.apply_once(text);
        for pass in 1..MAX_PASSES {
            let next = self.apply_once(&current);
            if next == current {
                return NormalizedText(current);
            }
            debug!("normalization pass {} changed the text", pass + 1);
            current = next;
        }
        warn!("normalization did not settle after {MAX_PASSES} passes");
        NormalizedText(current)
    }
}
