use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use codelang::cli::args::TrainArgs;
use codelang::cli::commands::{read_source_file, run_train};
use codelang::corpus::{CorpusFilter, load_corpus};
use codelang::ml::model::predict;
use codelang::ml::model_store::load_model;

fn write_corpus(root: &Path) {
    let samples: [(&str, &str, &str); 3] = [
        ("py", "py", "import sys\n\ndef run_{i}(argv):\n    # entry\n    return len(argv) + {i}\n"),
        ("rb", "rb", "require 'set'\n\ndef run_{i}(argv)\n  argv.length + {i}\nend\n"),
        ("go", "go", "package main\n\nfunc run{i}(argv []string) int {\n\treturn len(argv) + {i}\n}\n"),
    ];
    for (label, ext, template) in samples {
        let dir = root.join(label);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..5 {
            let text = template.replace("{i}", &i.to_string());
            fs::write(dir.join(format!("sample_{i}.{ext}")), text).unwrap();
        }
    }
}

#[test]
fn train_from_directory_and_predict() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_corpus(&corpus);
    let model_path = dir.path().join("out").join("model.json");

    let args = TrainArgs::try_parse_from([
        "codelang-train",
        "--corpus",
        corpus.to_str().unwrap(),
        "--output",
        model_path.to_str().unwrap(),
        "--no-filter",
        "--threads",
        "2",
        "--quiet",
        "--format",
        "json",
    ])
    .unwrap();
    let summary = run_train(&args).unwrap();

    assert_eq!(summary.classes, vec!["go", "py", "rb"]);
    assert_eq!(summary.documents, 15);
    assert_eq!(summary.test_documents, 3);
    assert!(summary.stratified);
    assert_eq!(summary.report.total, 3);

    let model = load_model(&model_path).unwrap();
    let probe = dir.path().join("probe.go");
    fs::write(&probe, "package util\n\nfunc size(xs []string) int {\n\treturn len(xs)\n}\n").unwrap();
    let text = read_source_file(&probe).unwrap();
    assert_eq!(predict(&model, &text).unwrap().label, "go");
}

#[test]
fn default_filter_drops_small_documents() {
    let dir = TempDir::new().unwrap();
    write_corpus(dir.path());

    let documents = load_corpus(dir.path()).unwrap();
    assert_eq!(documents.len(), 15);
    assert!(CorpusFilter::default().apply(documents.clone()).is_empty());
    assert_eq!(CorpusFilter::none().apply(documents).len(), 15);
}

#[test]
fn training_fails_without_documents() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("empty");
    fs::create_dir(&corpus).unwrap();

    let args = TrainArgs::try_parse_from([
        "codelang-train",
        "--corpus",
        corpus.to_str().unwrap(),
        "--output",
        dir.path().join("model.json").to_str().unwrap(),
        "--quiet",
    ])
    .unwrap();
    assert!(run_train(&args).is_err());
    assert!(!dir.path().join("model.json").exists());
}

#[test]
fn dump_corpus_writes_normalized_jsonl() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus");
    write_corpus(&corpus);
    let dump = dir.path().join("normalized.jsonl");

    let args = TrainArgs::try_parse_from([
        "codelang-train",
        "--corpus",
        corpus.to_str().unwrap(),
        "--output",
        dir.path().join("model.json").to_str().unwrap(),
        "--dump-corpus",
        dump.to_str().unwrap(),
        "--no-filter",
        "--quiet",
    ])
    .unwrap();
    run_train(&args).unwrap();

    let documents = load_corpus(&dump).unwrap();
    assert_eq!(documents.len(), 15);
    assert_eq!(documents[5].label(), Some("py"));
    assert_eq!(
        documents[5].text(),
        "import sys def run_0(argv): return len(argv) + NUMBER"
    );
    assert!(documents.iter().all(|d| !d.text().contains('\n')));

    let retrained = dir.path().join("retrained.json");
    let args = TrainArgs::try_parse_from([
        "codelang-train",
        "--corpus",
        dump.to_str().unwrap(),
        "--output",
        retrained.to_str().unwrap(),
        "--no-filter",
        "--quiet",
    ])
    .unwrap();
    let summary = run_train(&args).unwrap();
    assert_eq!(summary.classes, vec!["go", "py", "rb"]);
}
