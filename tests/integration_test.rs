use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_slr-screening"))
}

fn run(args: &[&str]) -> Output {
    binary().args(args).output().expect("Failed to run slr-screening")
}

fn read_jsonl(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn field<'a>(record: &'a Value, name: &str) -> &'a str {
    record.get(name).and_then(Value::as_str).unwrap_or("")
}

/// Two exports sharing one (title, year) pair
fn create_citation_exports(dir: &Path) -> PathBuf {
    let exports = dir.join("exports");
    fs::create_dir_all(&exports).unwrap();
    fs::write(
        exports.join("scopus.csv"),
        "title,year,abstract,keywords\n\
         Neural Pricing of Options,2020,neural networks price risk,machine learning\n\
         Corporate Risk Management,2019,investing and corporate risk,finance\n",
    )
    .unwrap();
    fs::write(
        exports.join("wos.jsonl"),
        concat!(
            r#"{"title": "Neural Pricing of Options", "year": "2020", "abstract": "neural networks price risk", "keywords": "machine learning"}"#,
            "\n",
            r#"{"title": "Fuzzy Credit Scoring", "year": 2021, "abstract": "fuzzy inference for credit risk", "keywords": "expert system"}"#,
            "\n"
        ),
    )
    .unwrap();
    exports
}

fn create_keywords_file(dir: &Path) -> PathBuf {
    let path = dir.join("keywords.json");
    fs::write(
        &path,
        r#"{"finance": "risk corporate investing pricing", "ml": "neural fuzzy inference"}"#,
    )
    .unwrap();
    path
}

#[test]
fn test_subcommand_help() {
    for command in ["citations", "keywords", "select", "validate", "match", "pipeline"] {
        let status = binary()
            .args([command, "--help"])
            .status()
            .expect("Failed to run --help");
        assert!(status.success(), "{} --help should succeed", command);
    }
}

#[test]
fn test_citations_deduplicates_across_exports() {
    let dir = tempdir().unwrap();
    let exports = create_citation_exports(dir.path());
    let output = dir.path().join("citations.jsonl");

    let result = run(&[
        "citations",
        "--input",
        exports.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--log-level",
        "OFF",
    ]);
    assert!(result.status.success(), "citations should succeed");

    let records = read_jsonl(&output);
    assert_eq!(records.len(), 3);

    let neural = records
        .iter()
        .find(|r| field(r, "title") == "Neural Pricing of Options")
        .unwrap();
    assert_eq!(field(neural, "source"), "scopus");
    assert_eq!(field(neural, "multiple_sources"), "scopus;wos");
    assert_eq!(field(neural, "cleaned_title"), "neural pricing of options");

    let fuzzy = records
        .iter()
        .find(|r| field(r, "title") == "Fuzzy Credit Scoring")
        .unwrap();
    assert_eq!(field(fuzzy, "year"), "2021");
    assert!(field(fuzzy, "citation_text").contains("expert system"));
}

#[test]
fn test_citations_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let result = run(&[
        "citations",
        "--input",
        dir.path().join("nope").to_str().unwrap(),
        "--log-level",
        "OFF",
    ]);
    assert!(!result.status.success());
}

#[test]
fn test_keywords_then_select() {
    let dir = tempdir().unwrap();
    let exports = create_citation_exports(dir.path());
    let keywords = create_keywords_file(dir.path());
    let citations = dir.path().join("citations.csv");
    let counted = dir.path().join("counted.jsonl");
    let selected = dir.path().join("selected.jsonl");

    let status = binary()
        .args(["citations", "-i", exports.to_str().unwrap(), "-o", citations.to_str().unwrap(), "-l", "OFF"])
        .status()
        .unwrap();
    assert!(status.success());

    let status = binary()
        .args([
            "keywords",
            "--input",
            citations.to_str().unwrap(),
            "--keywords",
            keywords.to_str().unwrap(),
            "--output",
            counted.to_str().unwrap(),
            "--log-level",
            "OFF",
        ])
        .status()
        .unwrap();
    assert!(status.success(), "keywords should succeed");

    let rows = read_jsonl(&counted);
    assert_eq!(rows.len(), 3);
    for row in &rows {
        for column in ["finance_count", "ml_count", "risk", "neural", "total_keywords"] {
            assert!(row.get(column).is_some(), "missing column {}", column);
        }
    }
    let neural = rows
        .iter()
        .find(|r| field(r, "title") == "Neural Pricing of Options")
        .unwrap();
    // "pricing" + "risk" vs "neural" twice
    assert_eq!(field(neural, "finance_count"), "2");
    assert_eq!(field(neural, "ml_count"), "2");
    assert_eq!(field(neural, "total_keywords"), "4");

    let status = binary()
        .args([
            "select",
            "--input",
            counted.to_str().unwrap(),
            "--min-limit",
            "1",
            "--keywords",
            keywords.to_str().unwrap(),
            "--output",
            selected.to_str().unwrap(),
            "--log-level",
            "OFF",
        ])
        .status()
        .unwrap();
    assert!(status.success(), "select should succeed");

    // Corporate Risk Management mentions no ml keyword
    let chosen = read_jsonl(&selected);
    let titles: Vec<&str> = chosen.iter().map(|r| field(r, "title")).collect();
    assert_eq!(titles, vec!["Neural Pricing of Options", "Fuzzy Credit Scoring"]);
}

#[test]
fn test_keywords_template() {
    let dir = tempdir().unwrap();
    let template = dir.path().join("template.json");
    let result = run(&["keywords", "--write-template", template.to_str().unwrap(), "-l", "OFF"]);
    assert!(result.status.success());

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&template).unwrap()).unwrap();
    assert!(parsed.as_object().map(|m| !m.is_empty()).unwrap_or(false));
}

#[test]
fn test_validate_funnel() {
    let dir = tempdir().unwrap();
    let files = dir.path().join("downloads");
    fs::create_dir_all(files.join("nested")).unwrap();

    fs::write(
        files.join("deep learning for asset pricing.txt"),
        "Journal of Finance\nDeep Learning for Asset Pricing\nAbstract: we study ...",
    )
    .unwrap();
    fs::write(
        files.join("nested").join("fuzzy inference in credit risk.txt"),
        "Weather patterns over the north atlantic during winter storms",
    )
    .unwrap();
    fs::write(files.join("broken paper.pdf"), b"%PDF-1.4 this is not really a pdf").unwrap();
    fs::write(files.join("paywalled study.txt"), "Paywalled Study").unwrap();

    let records = dir.path().join("records.csv");
    fs::write(
        &records,
        "title,year\n\
         Deep Learning for Asset Pricing,2020\n\
         Fuzzy Inference in Credit Risk,2019\n\
         Broken Paper,2018\n\
         Missing Paper,2017\n\
         Paywalled Study,2016\n",
    )
    .unwrap();

    let inaccessible = dir.path().join("inaccessible.txt");
    fs::write(&inaccessible, "Paywalled study\n").unwrap();

    let output = dir.path().join("out").join("validated.jsonl");
    let result = run(&[
        "validate",
        "--input",
        records.to_str().unwrap(),
        "--files-dir",
        files.to_str().unwrap(),
        "--inaccessible",
        inaccessible.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--threads",
        "2",
        "--log-level",
        "OFF",
    ]);
    assert!(
        result.status.success(),
        "validate should succeed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let rows = read_jsonl(&output);
    let state_of = |title: &str| -> (String, String, String) {
        let row = rows.iter().find(|r| field(r, "title") == title).unwrap();
        (
            field(row, "downloaded").to_string(),
            field(row, "file_location").to_string(),
            field(row, "validation_method").to_string(),
        )
    };

    let (state, location, method) = state_of("Deep Learning for Asset Pricing");
    assert_eq!(state, "validated");
    assert!(location.ends_with("deep learning for asset pricing.txt"));
    assert_eq!(method, "exact");

    let (state, location, method) = state_of("Fuzzy Inference in Credit Risk");
    assert_eq!(state, "invalidated");
    assert!(location.contains("nested"));
    assert_eq!(method, "none");

    let (state, location, _) = state_of("Broken Paper");
    assert_eq!(state, "manual_check_required");
    assert_eq!(location, "");

    assert_eq!(state_of("Missing Paper").0, "not_downloaded");
    assert_eq!(state_of("Paywalled Study").0, "no_access");

    let funnel: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out").join("validated_funnel.json")).unwrap())
            .unwrap();
    assert_eq!(
        funnel,
        serde_json::json!({
            "not_downloaded": 1,
            "validated": 1,
            "invalidated": 1,
            "manual_check_required": 1,
            "no_access": 1
        })
    );

    let manual = read_jsonl(&dir.path().join("out").join("validated_manual.jsonl"));
    assert_eq!(manual.len(), 1);
    assert_eq!(field(&manual[0], "title"), "Broken Paper");
}

#[test]
fn test_validate_missing_files_dir_fails() {
    let dir = tempdir().unwrap();
    let records = dir.path().join("records.csv");
    fs::write(&records, "title\nA\n").unwrap();
    let result = run(&[
        "validate",
        "-i",
        records.to_str().unwrap(),
        "-f",
        dir.path().join("missing").to_str().unwrap(),
        "-l",
        "OFF",
    ]);
    assert!(!result.status.success());
}

#[test]
fn test_match_json_output() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("paper.txt");
    fs::write(
        &file,
        "header line\nA neural network approach to option pricing under stochastic volatility\nbody",
    )
    .unwrap();

    let result = run(&[
        "match",
        "--title",
        "A Neural-Network Approach to Option Pricing under Stochastic Volatility",
        "--file",
        file.to_str().unwrap(),
        "--json",
        "--log-level",
        "OFF",
    ]);
    assert!(result.status.success());

    let stdout = String::from_utf8_lossy(&result.stdout);
    let line = stdout.lines().last().unwrap();
    let report: Value = serde_json::from_str(line).unwrap();
    assert_eq!(report["matched"], Value::Bool(true));
    assert_eq!(report["strategy"], Value::String("exact".to_string()));
}

#[test]
fn test_pipeline_cleans_up_intermediates() {
    let dir = tempdir().unwrap();
    let exports = create_citation_exports(dir.path());
    let keywords = create_keywords_file(dir.path());
    let temp = dir.path().join("tmp");
    let output = dir.path().join("selected.csv");

    let result = run(&[
        "pipeline",
        "--input",
        exports.to_str().unwrap(),
        "--keywords",
        keywords.to_str().unwrap(),
        "--target",
        "2",
        "--output",
        output.to_str().unwrap(),
        "--temp-dir",
        temp.to_str().unwrap(),
        "--log-level",
        "OFF",
    ]);
    assert!(result.status.success(), "pipeline should succeed");
    assert!(output.exists());
    assert_eq!(fs::read_dir(&temp).unwrap().count(), 0);
}
