//! Labeled corpus loading and quality filtering.
//!
//! Three on-disk layouts are understood:
//!
//! - a directory with one subdirectory per language, whose files are the
//!   documents of that language (`corpus/py/a.py`, `corpus/js/b.js`, ...)
//! - a JSON array of `{"text": ..., "label": ...}` objects
//! - JSON Lines with one such object per line
//!
//! Individual unreadable or malformed documents are skipped with a warning;
//! only failures that lose the whole corpus are errors.
//!
//! A loaded corpus can be written back as normalized JSON Lines with
//! [`normalize_documents`] and [`save_jsonl`], which [`load_jsonl`] reads.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, info, warn};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::CodeAnalyzer;
use crate::document::Document;
use crate::error::{CodelangError, Result};

lazy_static! {
    /// A single brace-delimited run of at least 800 non-newline characters.
    static ref LONG_BRACE_BLOCK: Regex =
        Regex::new(r"\{.{800,}\}").expect("Invalid brace block pattern");
}

/// Drops documents unlikely to be hand-written source: too small, too large
/// or minified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusFilter {
    /// Minimum size in bytes
    pub min_bytes: Option<usize>,
    /// Maximum size in bytes
    pub max_bytes: Option<usize>,
    /// Any line longer than this marks the document as minified
    pub max_line_length: Option<usize>,
    /// Reject documents containing a long single-line `{...}` block
    pub reject_long_brace_blocks: bool,
}

impl Default for CorpusFilter {
    fn default() -> Self {
        CorpusFilter {
            min_bytes: Some(500),
            max_bytes: Some(50_000),
            max_line_length: Some(500),
            reject_long_brace_blocks: true,
        }
    }
}

impl CorpusFilter {
    /// A filter that accepts every document.
    pub fn none() -> Self {
        CorpusFilter {
            min_bytes: None,
            max_bytes: None,
            max_line_length: None,
            reject_long_brace_blocks: false,
        }
    }

    /// Why a text would be rejected, if it would.
    pub fn rejection(&self, text: &str) -> Option<String> {
        let size = text.len();
        if let Some(min) = self.min_bytes.filter(|&min| size < min) {
            return Some(format!("{size} bytes is below the minimum of {min}"));
        }
        if let Some(max) = self.max_bytes.filter(|&max| size > max) {
            return Some(format!("{size} bytes is above the maximum of {max}"));
        }
        if let Some(limit) = self.max_line_length {
            if text.lines().any(|line| line.chars().count() > limit) {
                return Some(format!("has a line longer than {limit} characters"));
            }
        }
        if self.reject_long_brace_blocks && LONG_BRACE_BLOCK.is_match(text) {
            return Some("looks minified".to_string());
        }
        None
    }

    pub fn accepts(&self, text: &str) -> bool {
        self.rejection(text).is_none()
    }

    /// Keep the accepted documents, logging every rejection.
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        let before = documents.len();
        let kept: Vec<Document> = documents
            .into_iter()
            .filter(|doc| match self.rejection(doc.text()) {
                Some(reason) => {
                    debug!("Filtered out {}: {reason}", doc.describe());
                    false
                }
                None => true,
            })
            .collect();
        if kept.len() < before {
            info!("Corpus filter kept {} of {before} documents", kept.len());
        }
        kept
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Load a directory-per-language corpus.
///
/// Subdirectory names are the labels; files are read in name order so the
/// resulting document order is stable. Hidden entries and non-UTF-8 files
/// are skipped.
pub fn load_directory<P: AsRef<Path>>(root: P) -> Result<Vec<Document>> {
    let root = root.as_ref();
    let mut documents = Vec::new();

    for language_dir in sorted_entries(root)? {
        if !language_dir.is_dir() {
            continue;
        }
        let label = match language_dir.file_name().and_then(|n| n.to_str()) {
            Some(name) if !name.starts_with('.') => name.to_string(),
            _ => continue,
        };

        let mut count = 0;
        for path in sorted_entries(&language_dir)? {
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_none_or(|n| n.starts_with('.'));
            if hidden || !path.is_file() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(text) => {
                    documents.push(
                        Document::labeled(text, label.as_str())
                            .with_source(path.display().to_string()),
                    );
                    count += 1;
                }
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }
        debug!("Loaded {count} {label} documents");
    }

    info!("Loaded {} documents from {}", documents.len(), root.display());
    Ok(documents)
}

/// Load a JSON array of documents.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let documents: Vec<Document> = serde_json::from_reader(reader).map_err(|e| {
        CodelangError::invalid_input(format!(
            "Failed to parse corpus JSON from '{}': {e}",
            path.display()
        ))
    })?;
    info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Load JSON Lines, one document per non-blank line. Malformed lines are
/// skipped with a warning.
pub fn load_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Document>(&line) {
            Ok(doc) => documents.push(doc),
            Err(e) => warn!("Skipping {}:{}: {e}", path.display(), number + 1),
        }
    }

    info!("Loaded {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Load a corpus in whichever layout `path` has: a directory, a `.jsonl`
/// file, or otherwise a JSON array.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    if path.is_dir() {
        load_directory(path)
    } else if path.extension().is_some_and(|ext| ext == "jsonl") {
        load_jsonl(path)
    } else {
        load_json(path)
    }
}

/// Replace every document's text with its normalized form.
pub fn normalize_documents(documents: &[Document], analyzer: &CodeAnalyzer) -> Vec<Document> {
    documents
        .par_iter()
        .map(|doc| doc.with_text(analyzer.normalize(doc.text()).as_str()))
        .collect()
}

/// Write documents as JSON Lines, one object per line.
pub fn save_jsonl<P: AsRef<Path>>(documents: &[Document], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for doc in documents {
        serde_json::to_writer(&mut writer, doc)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!("Wrote {} documents to {}", documents.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filter_sizes() {
        let filter = CorpusFilter::default();
        assert!(!filter.accepts("x = 1"));
        assert!(filter.accepts(&"x = 1\n".repeat(100)));
        assert!(!filter.accepts(&"x = 1\n".repeat(10_000)));
        assert!(CorpusFilter::none().accepts(""));
    }

    #[test]
    fn test_filter_minified() {
        let filter = CorpusFilter {
            min_bytes: None,
            ..CorpusFilter::default()
        };
        let long_line = "a".repeat(501);
        assert!(!filter.accepts(&long_line));

        let brace_block = format!("{{{}}}", "a;".repeat(450));
        assert!(filter.rejection(&brace_block).is_some());

        let no_braces = CorpusFilter {
            max_line_length: None,
            ..filter.clone()
        };
        assert_eq!(
            no_braces.rejection(&brace_block).as_deref(),
            Some("looks minified")
        );
        assert!(no_braces.accepts(&"a;".repeat(450)));
    }

    #[test]
    fn test_apply() {
        let filter = CorpusFilter {
            min_bytes: Some(3),
            ..CorpusFilter::none()
        };
        let kept = filter.apply(vec![
            Document::labeled("ab", "x"),
            Document::labeled("abc", "x"),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text(), "abc");
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("py")).unwrap();
        fs::create_dir(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("py").join("b.py"), "print(2)").unwrap();
        fs::write(dir.path().join("py").join("a.py"), "print(1)").unwrap();
        fs::write(dir.path().join("py").join(".hidden"), "x").unwrap();
        fs::write(dir.path().join("js").join("a.js"), "f()").unwrap();
        fs::write(dir.path().join("py").join("bad.bin"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("README"), "not a language").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        let summary: Vec<(&str, &str)> = docs
            .iter()
            .map(|d| (d.label().unwrap(), d.text()))
            .collect();
        assert_eq!(
            summary,
            vec![("js", "f()"), ("py", "print(1)"), ("py", "print(2)")]
        );
        assert!(docs[0].source().unwrap().ends_with("a.js"));
    }

    #[test]
    fn test_load_json_and_jsonl() {
        let dir = TempDir::new().unwrap();

        let json = dir.path().join("corpus.json");
        fs::write(
            &json,
            r#"[{"text": "x = 1", "label": "py"}, {"text": "let x = 1;", "label": "js"}]"#,
        )
        .unwrap();
        let docs = load_corpus(&json).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].label(), Some("js"));

        let jsonl = dir.path().join("corpus.jsonl");
        fs::write(
            &jsonl,
            "{\"text\": \"x = 1\", \"label\": \"py\"}\n\nnot json\n{\"text\": \"y\"}\n",
        )
        .unwrap();
        let docs = load_corpus(&jsonl).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].label(), None);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{").unwrap();
        assert!(matches!(
            load_corpus(&bad),
            Err(CodelangError::InvalidInput(_))
        ));
        assert!(matches!(
            load_corpus(dir.path().join("missing.json")),
            Err(CodelangError::Io(_))
        ));
    }

    #[test]
    fn test_save_normalized_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("normalized.jsonl");
        let documents = vec![
            Document::labeled("x = 1  # set x\n", "py").with_source("a.py"),
            Document::labeled("puts 'hi'", "rb"),
        ];

        let normalized = normalize_documents(&documents, &CodeAnalyzer::default());
        save_jsonl(&normalized, &path).unwrap();

        let loaded = load_jsonl(&path).unwrap();
        assert_eq!(loaded, normalized);
        assert_eq!(loaded[0].text(), "x = NUMBER");
        assert_eq!(loaded[0].source(), Some("a.py"));
        assert_eq!(loaded[1].text(), "puts STRING");
        assert_eq!(loaded[1].label(), Some("rb"));
    }
}
