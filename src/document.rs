//! Source documents.
//!
//! A [`Document`] is a piece of raw source text with an optional
//! ground-truth language label. Documents are immutable once read.
//!
//! # Examples
//!
//! ```
//! use codelang::document::Document;
//!
//! let doc = Document::labeled("fn main() {}", "rs").with_source("main.rs");
//! assert_eq!(doc.label(), Some("rs"));
//! assert_eq!(doc.source(), Some("main.rs"));
//! ```

use serde::{Deserialize, Serialize};

/// Raw source text plus an optional label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl Document {
    /// Create an unlabeled document.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Document {
            text: text.into(),
            label: None,
            source: None,
        }
    }

    /// Create a document with a ground-truth label.
    pub fn labeled<S: Into<String>, L: Into<String>>(text: S, label: L) -> Self {
        Document {
            text: text.into(),
            label: Some(label.into()),
            source: None,
        }
    }

    /// Attach the identifier this document was read from (usually a path).
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The same label and source with different text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Document {
            text: text.into(),
            label: self.label.clone(),
            source: self.source.clone(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// A short description for log messages.
    pub fn describe(&self) -> String {
        match (&self.source, &self.label) {
            (Some(source), _) => source.clone(),
            (None, Some(label)) => format!("<{label} document>"),
            (None, None) => "<unlabeled document>".to_string(),
        }
    }
}
