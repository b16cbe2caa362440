use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{info, warn};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use super::{CitationRecord, RecordTable};

/// Storage formats for record tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    JsonLines,
    Parquet,
}

/// Format and gzip flag from a path such as `records.jsonl.gz`
pub fn detect_format(path: &Path) -> Result<(TableFormat, bool)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_lowercase())
        .unwrap_or_default();
    let (inner, gzipped) = match name.strip_suffix(".gz") {
        Some(inner) => (inner.to_string(), true),
        None => (name, false),
    };

    let format = if inner.ends_with(".csv") {
        TableFormat::Csv
    } else if inner.ends_with(".jsonl") || inner.ends_with(".ndjson") {
        TableFormat::JsonLines
    } else if inner.ends_with(".parquet") {
        TableFormat::Parquet
    } else {
        bail!(
            "Unsupported record file '{}': expected .csv, .jsonl, or .parquet (optionally .gz)",
            path.display()
        );
    };

    if gzipped && format == TableFormat::Parquet {
        bail!("Gzipped parquet is not supported: {}", path.display());
    }
    Ok((format, gzipped))
}

/// Load a record table from CSV, JSON Lines, or Parquet
pub fn load_records(path: &Path) -> Result<RecordTable> {
    let (format, gzipped) = detect_format(path)?;
    let file =
        File::open(path).with_context(|| format!("Failed to open records file: {}", path.display()))?;

    let table = match format {
        TableFormat::Parquet => {
            let df = ParquetReader::new(file)
                .finish()
                .with_context(|| format!("Failed to read parquet: {}", path.display()))?;
            dataframe_to_table(&df)?
        }
        TableFormat::Csv => {
            let bytes = read_all(file, gzipped)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let df = CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(Some(0))
                .into_reader_with_file_handle(Cursor::new(bytes))
                .finish()
                .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
            dataframe_to_table(&df)?
        }
        TableFormat::JsonLines => {
            let reader: Box<dyn Read> = if gzipped {
                Box::new(GzDecoder::new(file))
            } else {
                Box::new(file)
            };
            read_jsonl(BufReader::new(reader))?
        }
    };

    info!("Loaded {} records from {}", table.len(), path.display());
    Ok(table)
}

/// Save a record table, choosing the format from the path
pub fn save_records(table: &RecordTable, path: &Path) -> Result<()> {
    let (format, gzipped) = detect_format(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;

    match format {
        TableFormat::Parquet => {
            let mut df = table_to_dataframe(table)?;
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Zstd(None))
                .finish(&mut df)
                .context("Failed to write records to parquet")?;
        }
        TableFormat::Csv => {
            let mut df = table_to_dataframe(table)?;
            let mut writer = output_writer(file, gzipped);
            CsvWriter::new(&mut writer)
                .include_header(true)
                .finish(&mut df)
                .context("Failed to write records to CSV")?;
            writer.flush()?;
        }
        TableFormat::JsonLines => {
            let mut writer = output_writer(file, gzipped);
            write_jsonl(table, &mut writer)?;
            writer.flush()?;
        }
    }

    info!("Wrote {} records to {}", table.len(), path.display());
    Ok(())
}

fn read_all(file: File, gzipped: bool) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    if gzipped {
        GzDecoder::new(file).read_to_end(&mut bytes)?;
    } else {
        BufReader::new(file).read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

fn output_writer(file: File, gzipped: bool) -> Box<dyn Write> {
    if gzipped {
        Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
    } else {
        Box::new(BufWriter::new(file))
    }
}

fn dataframe_to_table(df: &DataFrame) -> Result<RecordTable> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut records = vec![CitationRecord::new(); df.height()];

    for (name, column) in columns.iter().zip(df.get_columns()) {
        let as_text = column.cast(&DataType::String)?;
        let values = as_text.str()?;
        for (record, value) in records.iter_mut().zip(values.into_iter()) {
            record.set(name.as_str(), value.unwrap_or(""));
        }
    }

    let mut table = RecordTable::new(columns);
    for record in records {
        table.push(record);
    }
    Ok(table)
}

fn table_to_dataframe(table: &RecordTable) -> Result<DataFrame> {
    let columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|name| {
            let values = table.column_values(name);
            Column::new(name.as_str().into(), &values)
        })
        .collect();
    DataFrame::new(columns).map_err(|e| anyhow::anyhow!("Failed to create DataFrame: {}", e))
}

fn read_jsonl<R: BufRead>(reader: R) -> Result<RecordTable> {
    let mut table = RecordTable::default();
    let mut lines_failed = 0;

    for line_result in reader.lines() {
        let line = line_result.context("Failed to read line from records")?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Map<String, Value>>(&line) {
            Ok(object) => {
                let mut record = CitationRecord::new();
                for (key, value) in object {
                    table.ensure_column(&key);
                    record.set(key, value_to_field(value));
                }
                table.push(record);
            }
            Err(e) => {
                if lines_failed < 5 {
                    warn!("Failed to parse record: {}", e);
                }
                lines_failed += 1;
            }
        }
    }

    if lines_failed > 0 {
        warn!("Skipped {} malformed record lines", lines_failed);
    }
    Ok(table)
}

fn value_to_field(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_jsonl<W: Write>(table: &RecordTable, writer: &mut W) -> Result<()> {
    for record in table.records() {
        let object: Map<String, Value> = table
            .columns()
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    Value::String(record.get_or_empty(name).to_string()),
                )
            })
            .collect();
        serde_json::to_writer(&mut *writer, &object)?;
        writeln!(writer)?;
    }
    Ok(())
}
