use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use serde_json::Value;
use std::path::Path;

use super::{file_extension, DocumentReader, PageScope, PdfExtractBackend, TextExtractor};

/// Generic reader dispatching on file extension.
///
/// Tables are flattened to their cell values, JSON to its string leaves, and
/// anything unrecognised is read as lossy UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader;

impl DocumentReader for FileReader {
    fn read(&self, path: &Path) -> Result<String> {
        match file_extension(path).as_deref() {
            Some("csv") => read_csv_text(path),
            Some("json") => read_json_text(path),
            Some("jsonl") | Some("ndjson") => read_jsonl_text(path),
            Some("pdf") => PdfExtractBackend.extract(path, PageScope::All),
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => read_workbook_text(path),
            _ => read_plain_text(path),
        }
    }
}

fn read_plain_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_csv_text(path: &Path) -> Result<String> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV {}", path.display()))?;

    let mut parts: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for column in df.get_columns() {
        let values = column.str()?;
        parts.extend(values.into_iter().flatten().map(str::to_string));
    }
    Ok(parts.join(" "))
}

/// Every non-empty cell of every sheet, row by row
fn read_workbook_text(path: &Path) -> Result<String> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let mut parts = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .with_context(|| format!("Failed to read sheet '{}' of {}", sheet, path.display()))?;
        for row in range.rows() {
            for cell in row {
                match cell {
                    Data::Empty => {}
                    Data::String(s) if s.trim().is_empty() => {}
                    Data::String(s) => parts.push(s.clone()),
                    other => parts.push(other.to_string()),
                }
            }
        }
    }
    Ok(parts.join(" "))
}

fn read_json_text(path: &Path) -> Result<String> {
    let raw = read_plain_text(path)?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON {}", path.display()))?;
    let mut parts = Vec::new();
    collect_strings(&value, &mut parts);
    Ok(parts.join(" "))
}

fn read_jsonl_text(path: &Path) -> Result<String> {
    let raw = read_plain_text(path)?;
    let mut parts = Vec::new();
    for (line_num, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).with_context(|| {
            format!("Failed to parse line {} of {}", line_num + 1, path.display())
        })?;
        collect_strings(&value, &mut parts);
    }
    Ok(parts.join(" "))
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        Value::Number(n) => out.push(n.to_string()),
        Value::Bool(_) | Value::Null => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_plain_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "Mixed fruit fly optimization\nsecond line").unwrap();
        let text = FileReader.read(&path).unwrap();
        assert!(text.contains("Mixed fruit fly optimization"));
    }

    #[test]
    fn test_read_csv_flattens_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(&path, "title,year\nNeural network model,2020\nOther,2019\n").unwrap();
        let text = FileReader.read(&path).unwrap();
        assert!(text.contains("Neural network model"));
        assert!(text.contains("2019"));
    }

    #[test]
    fn test_read_json_string_leaves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(
            &path,
            r#"{"title": "Risk pricing", "meta": {"tags": ["fuzzy", "neural"]}, "n": 3}"#,
        )
        .unwrap();
        let text = FileReader.read(&path).unwrap();
        assert!(text.contains("Risk pricing"));
        assert!(text.contains("fuzzy"));
        assert!(text.contains("neural"));
    }

    #[test]
    fn test_read_jsonl() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"title\": \"first\"}\n\n{\"title\": \"second\"}\n").unwrap();
        let text = FileReader.read(&path).unwrap();
        assert_eq!(text, "first second");
    }

    /// Write a one-sheet workbook with the given rows
    pub(crate) fn write_test_workbook(path: &Path, rows: &[&[&str]]) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_workbook_flattens_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");
        write_test_workbook(
            &path,
            &[&["title", "year"], &["Neural network model", "2020"], &["Other"]],
        );
        let text = FileReader.read(&path).unwrap();
        assert_eq!(text, "title year Neural network model 2020 Other");
    }

    #[test]
    fn test_corrupted_workbook_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.xlsx");
        fs::write(&path, b"PK").unwrap();
        assert!(FileReader.read(&path).is_err());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileReader.read(&path).is_err());
    }
}
