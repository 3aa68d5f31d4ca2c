//! Schema-validated decoding of the dataset document.

use super::LoadError;
use crate::models::TravelRecord;
use serde_json::Value;
use tracing::{debug, warn};

/// Result of decoding a dataset document.
#[derive(Debug, Default)]
pub struct Decoded {
    pub records: Vec<TravelRecord>,
    /// Number of malformed records dropped (only when skipping is enabled).
    pub skipped: usize,
}

/// Decode a JSON document into validated travel records.
///
/// With `skip_invalid` set, malformed records are dropped with a warning;
/// otherwise the first one aborts decoding.
pub fn decode_records(content: &str, skip_invalid: bool) -> Result<Decoded, LoadError> {
    let document: Value = serde_json::from_str(content)?;

    let items = match document {
        Value::Array(items) => items,
        other => {
            return Err(LoadError::NotAnArray {
                found: json_type_name(&other),
            })
        }
    };

    let mut decoded = Decoded {
        records: Vec::with_capacity(items.len()),
        skipped: 0,
    };

    for (index, item) in items.into_iter().enumerate() {
        match decode_record(index, item) {
            Ok(record) => decoded.records.push(record),
            Err(e) if skip_invalid => {
                warn!("Skipping {}", e);
                decoded.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "Decoded {} records ({} skipped)",
        decoded.records.len(),
        decoded.skipped
    );

    Ok(decoded)
}

/// Decode and validate a single array element.
pub fn decode_record(index: usize, item: Value) -> Result<TravelRecord, LoadError> {
    if !item.is_object() {
        return Err(malformed(
            index,
            format!("expected an object, found {}", json_type_name(&item)),
        ));
    }

    let record: TravelRecord =
        serde_json::from_value(item).map_err(|e| malformed(index, e.to_string()))?;

    if !record.valor_total.is_finite() || record.valor_total < 0.0 {
        return Err(malformed(
            index,
            format!("valor_total must be a non-negative amount, got {}", record.valor_total),
        ));
    }

    if !record.antecedencia_compra.is_finite() {
        return Err(malformed(
            index,
            "antecedencia_compra must be a finite number".to_string(),
        ));
    }

    Ok(record)
}

fn malformed(index: usize, reason: String) -> LoadError {
    LoadError::MalformedRecord { index, reason }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
