//! CSV export ingestion.
//!
//! Converts a directory of semicolon-separated travel agency exports into the
//! JSON dataset read by the dashboard. Exports have no header row and a fixed
//! column layout.

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Number, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// How a column is converted to JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// Free text, kept as a string.
    Text,
    /// Brazilian-formatted amount (`1.234,56`).
    Money,
    /// Integer-ish value, emitted as a number when it parses.
    Numeric,
}

/// Export column layout: JSON key and conversion, in file order.
const COLUMNS: [(&str, ColumnKind); 33] = [
    ("empresa", ColumnKind::Text),
    ("mes_ano", ColumnKind::Text),
    ("data_emissao", ColumnKind::Text),
    ("dia_semana_em", ColumnKind::Text),
    ("identificacao", ColumnKind::Text),
    ("os", ColumnKind::Text),
    ("mercado", ColumnKind::Text),
    ("cia_aerea", ColumnKind::Text),
    ("matricula", ColumnKind::Text),
    ("passageiro", ColumnKind::Text),
    ("top_10", ColumnKind::Text),
    ("centro_custo", ColumnKind::Text),
    ("data_partida", ColumnKind::Text),
    ("dia_semana_voo", ColumnKind::Text),
    ("tipo_cabine", ColumnKind::Text),
    ("processos", ColumnKind::Text),
    ("origem_destino", ColumnKind::Text),
    ("cidade_origem", ColumnKind::Text),
    ("cidade_destino", ColumnKind::Text),
    ("itinerario", ColumnKind::Text),
    ("tarifa_aplicada", ColumnKind::Money),
    ("taxas", ColumnKind::Money),
    ("fee", ColumnKind::Money),
    ("valor_total", ColumnKind::Money),
    ("tipo", ColumnKind::Text),
    ("faixa_antecedencia", ColumnKind::Text),
    ("antecedencia_compra", ColumnKind::Numeric),
    ("politica_antecedencia", ColumnKind::Text),
    ("politica", ColumnKind::Text),
    ("media_dentro_politica", ColumnKind::Money),
    ("media_fora_politica", ColumnKind::Money),
    ("perda_fora_politica", ColumnKind::Money),
    ("fatura", ColumnKind::Text),
];

/// Columns the dashboard cannot load a record without.
const REQUIRED_COLUMNS: [&str; 3] = ["passageiro", "faixa_antecedencia", "antecedencia_compra"];

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list CSV files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to serialize dataset: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write dataset to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// What an import did.
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// The input directory did not exist and was created.
    pub created_input_dir: bool,
    /// CSV files found in the input directory.
    pub files_found: usize,
    /// Files that could not be parsed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Records written to the dataset.
    pub records: usize,
    /// Written records with a blank or unusable required column. The
    /// dashboard rejects the dataset over these unless invalid records are
    /// skipped.
    pub incomplete: usize,
    /// Dataset path, when one was written.
    pub output: Option<PathBuf>,
}

/// Convert a Brazilian-formatted amount to a float.
///
/// `"1.234,56"` becomes `1234.56`; blanks and unparsable values become `0.0`.
pub fn br_to_float(value: &str) -> f64 {
    let value = value.trim();
    if value.is_empty() {
        return 0.0;
    }

    let normalized = value.replace('.', "").replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Find the CSV files directly inside `dir`, sorted by name.
pub fn find_csv_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let is_csv = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if entry.file_type().is_file() && is_csv {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Parse one export file into JSON records.
pub fn read_csv_file(path: &Path) -> Result<Vec<Value>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row?;
        records.push(convert_row(&row));
    }

    Ok(records)
}

fn convert_row(row: &csv::ByteRecord) -> Value {
    let mut object = Map::new();

    for (i, (key, kind)) in COLUMNS.iter().enumerate() {
        let raw = row.get(i).map(String::from_utf8_lossy);
        let value = match (raw, kind) {
            (raw, ColumnKind::Money) => float_value(br_to_float(raw.as_deref().unwrap_or(""))),
            (None, _) => Value::Null,
            (Some(raw), _) if raw.trim().is_empty() => Value::Null,
            (Some(raw), ColumnKind::Numeric) => numeric_value(raw.trim()),
            (Some(raw), ColumnKind::Text) => Value::String(raw.trim().to_string()),
        };
        object.insert(key.to_string(), value);
    }

    Value::Object(object)
}

/// Required columns a converted row lacks. `antecedencia_compra` must be
/// numeric, not just present.
fn missing_required(record: &Value) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|key| match record.get(*key) {
            None | Some(Value::Null) => true,
            Some(Value::String(_)) => *key == "antecedencia_compra",
            Some(_) => false,
        })
        .collect()
}

fn float_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn numeric_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(n) if n.is_finite() => float_value(n),
        _ => Value::String(raw.to_string()),
    }
}

/// Convert every CSV file in `input_dir` into one JSON dataset at `output`.
///
/// Files that fail to parse are logged and skipped. Nothing is written when
/// no CSV file is found.
pub fn ingest_directory(
    input_dir: &Path,
    output: &Path,
    show_progress: bool,
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();

    if !input_dir.exists() {
        info!(
            "Input directory {} not found, creating it",
            input_dir.display()
        );
        std::fs::create_dir_all(input_dir).map_err(|e| IngestError::Io {
            path: input_dir.to_path_buf(),
            source: e,
        })?;
        summary.created_input_dir = true;
        return Ok(summary);
    }

    let files = find_csv_files(input_dir)?;
    summary.files_found = files.len();

    if files.is_empty() {
        info!("No CSV files found in {}", input_dir.display());
        return Ok(summary);
    }

    info!("Found {} CSV files to process", files.len());

    let progress = show_progress.then(|| import_progress(files.len() as u64));
    let mut all_records = Vec::new();

    for file in &files {
        debug!("Processing {}", file.display());
        if let Some(ref pb) = progress {
            pb.set_message(file_name(file));
        }

        match read_csv_file(file) {
            Ok(records) => {
                debug!("{}: {} records", file.display(), records.len());
                for (line, record) in records.iter().enumerate() {
                    let missing = missing_required(record);
                    if !missing.is_empty() {
                        warn!(
                            "{} line {}: unusable {}",
                            file.display(),
                            line + 1,
                            missing.join(", ")
                        );
                        summary.incomplete += 1;
                    }
                }
                all_records.extend(records);
            }
            Err(e) => {
                warn!("Failed to process {}: {}", file.display(), e);
                summary.failed.push((file.clone(), e.to_string()));
            }
        }

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    write_dataset(output, &all_records)?;

    info!(
        "Wrote {} records to {}",
        all_records.len(),
        output.display()
    );
    summary.records = all_records.len();
    summary.output = Some(output.to_path_buf());

    Ok(summary)
}

/// Write the dataset atomically, creating parent directories as needed.
fn write_dataset(output: &Path, records: &[Value]) -> Result<(), IngestError> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_error = |path: &Path, source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(&parent).map_err(|e| io_error(&parent, e))?;

    let content = serde_json::to_string_pretty(records)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| io_error(&parent, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| io_error(tmp.path(), e))?;
    tmp.persist(output).map_err(|e| IngestError::Persist {
        path: output.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

fn import_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::decode_records;

    fn row(passageiro: &str, valor: &str, faixa: &str, dias: &str) -> String {
        let mut cols = vec![String::new(); 33];
        cols[0] = "ACME".to_string();
        cols[9] = passageiro.to_string();
        cols[17] = "Recife".to_string();
        cols[18] = "São Paulo".to_string();
        cols[23] = valor.to_string();
        cols[25] = faixa.to_string();
        cols[26] = dias.to_string();
        cols.join(";")
    }

    #[test]
    fn test_br_to_float() {
        assert_eq!(br_to_float("1.234,56"), 1234.56);
        assert_eq!(br_to_float("350,00"), 350.0);
        assert_eq!(br_to_float("12"), 12.0);
        assert_eq!(br_to_float(""), 0.0);
        assert_eq!(br_to_float("  "), 0.0);
        assert_eq!(br_to_float("n/d"), 0.0);
        assert_eq!(br_to_float("nan"), 0.0);
    }

    #[test]
    fn test_ingest_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("csv_entrada");
        std::fs::create_dir(&input).unwrap();

        std::fs::write(
            input.join("b.csv"),
            format!("{}\n", row("Bea", "200,00", "4-7 dias", "6")),
        )
        .unwrap();
        std::fs::write(
            input.join("a.csv"),
            format!(
                "{}\n{}\n",
                row("Ana", "1.100,50", "0-3 dias", "2"),
                row("Ana", "50,00", "4-7 dias", "5")
            ),
        )
        .unwrap();
        std::fs::write(input.join("notas.txt"), "ignorar").unwrap();

        let output = dir.path().join("data").join("dados.json");
        let summary = ingest_directory(&input, &output, false).unwrap();

        assert_eq!(summary.files_found, 2);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.incomplete, 0);
        assert!(summary.failed.is_empty());
        assert_eq!(summary.output.as_deref(), Some(output.as_path()));

        let content = std::fs::read_to_string(&output).unwrap();
        let decoded = decode_records(&content, false).unwrap();
        let names: Vec<_> = decoded
            .records
            .iter()
            .map(|r| r.passageiro.as_str())
            .collect();
        assert_eq!(names, vec!["Ana", "Ana", "Bea"]);
        assert_eq!(decoded.records[0].valor_total, 1100.5);
        assert_eq!(decoded.records[0].antecedencia_compra, 2.0);
        assert_eq!(
            decoded.records[0].field_text("cidade_destino").as_deref(),
            Some("São Paulo")
        );
        assert_eq!(decoded.records[0].field_text("fatura"), None);
        assert_eq!(decoded.records[0].extra["taxas"], serde_json::json!(0.0));
    }

    #[test]
    fn test_ingest_counts_blank_lead_time() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("csv_entrada");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(
            input.join("a.csv"),
            format!(
                "{}\n{}\n{}\n",
                row("Ana", "100,00", "0-3 dias", "2"),
                row("Bea", "80,00", "4-7 dias", ""),
                row("Caio", "60,00", "8-14 dias", "n/d")
            ),
        )
        .unwrap();

        let output = dir.path().join("dados.json");
        let summary = ingest_directory(&input, &output, false).unwrap();

        assert_eq!(summary.records, 3);
        assert_eq!(summary.incomplete, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(decode_records(&content, false).is_err());

        let decoded = decode_records(&content, true).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].passageiro, "Ana");
        assert_eq!(decoded.skipped, 2);
    }

    #[test]
    fn test_missing_required() {
        let complete = serde_json::json!({
            "passageiro": "Ana",
            "faixa_antecedencia": "0-3 dias",
            "antecedencia_compra": 2
        });
        assert!(missing_required(&complete).is_empty());

        let blank = serde_json::json!({
            "passageiro": null,
            "faixa_antecedencia": "0-3 dias",
            "antecedencia_compra": "n/d"
        });
        assert_eq!(
            missing_required(&blank),
            vec!["passageiro", "antecedencia_compra"]
        );
    }

    #[test]
    fn test_ingest_creates_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("csv_entrada");
        let output = dir.path().join("dados.json");

        let summary = ingest_directory(&input, &output, false).unwrap();

        assert!(summary.created_input_dir);
        assert!(input.is_dir());
        assert!(!output.exists());
    }

    #[test]
    fn test_ingest_without_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("dados.json");

        let summary = ingest_directory(dir.path(), &output, false).unwrap();

        assert_eq!(summary.files_found, 0);
        assert!(summary.output.is_none());
        assert!(!output.exists());
    }

    #[test]
    fn test_short_rows_fill_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curto.csv");
        std::fs::write(&path, "ACME;01/2024\n").unwrap();

        let records = read_csv_file(&path).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["empresa"], "ACME");
        assert_eq!(records[0]["passageiro"], Value::Null);
        assert_eq!(records[0]["valor_total"], serde_json::json!(0.0));
    }
}
