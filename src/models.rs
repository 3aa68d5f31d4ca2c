//! Data models for the travel dashboard.
//!
//! This module contains the input record type and the derived structures
//! produced by the aggregator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Lead-time label that marks a last-minute purchase in well-formed data.
pub const LAST_MINUTE_LABEL: &str = "0-3 dias";

/// Numeric lead-time threshold (in days) for a last-minute purchase.
pub const LAST_MINUTE_MAX_DAYS: f64 = 3.0;

/// One trip/purchase entry from the dataset.
///
/// Only the four fields the dashboard computes with are typed; every other
/// column written by the CSV importer is carried verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelRecord {
    /// Traveler identifier, used as the grouping key.
    pub passageiro: String,
    /// Total amount paid for the trip.
    pub valor_total: f64,
    /// Lead-time bucket label, e.g. "0-3 dias".
    pub faixa_antecedencia: String,
    /// Days between purchase and departure.
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub antecedencia_compra: f64,
    /// Remaining columns (empresa, cidade_origem, fatura, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TravelRecord {
    /// Creates a record with no extra columns.
    #[cfg(test)]
    pub fn new(
        passageiro: impl Into<String>,
        valor_total: f64,
        faixa_antecedencia: impl Into<String>,
        antecedencia_compra: f64,
    ) -> Self {
        Self {
            passageiro: passageiro.into(),
            valor_total,
            faixa_antecedencia: faixa_antecedencia.into(),
            antecedencia_compra,
            extra: BTreeMap::new(),
        }
    }

    /// Returns an extra column as display text, if present and not null.
    pub fn field_text(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// The CSV importer passes `antecedencia_compra` through raw, so the dataset
/// may hold either `5` or `"5"`.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(Value),
    }

    let invalid = |found: String| -> D::Error {
        serde::de::Error::custom(format!(
            "antecedencia_compra: expected a number, got {}",
            found
        ))
    };

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| invalid(format!("{:?}", s))),
        Raw::Other(value) => Err(invalid(value.to_string())),
    }
}

/// Classification rule for last-minute purchases.
///
/// A record qualifies when its label matches OR its numeric lead time is at
/// most `max_days`.
#[derive(Debug, Clone, PartialEq)]
pub struct LastMinuteRule {
    pub label: String,
    pub max_days: f64,
}

impl Default for LastMinuteRule {
    fn default() -> Self {
        Self {
            label: LAST_MINUTE_LABEL.to_string(),
            max_days: LAST_MINUTE_MAX_DAYS,
        }
    }
}

impl LastMinuteRule {
    /// Whether the categorical label marks the record as last-minute.
    pub fn label_signal(&self, record: &TravelRecord) -> bool {
        record.faixa_antecedencia == self.label
    }

    /// Whether the numeric lead time marks the record as last-minute.
    pub fn days_signal(&self, record: &TravelRecord) -> bool {
        record.antecedencia_compra <= self.max_days
    }

    /// Returns true if either signal fires.
    pub fn is_last_minute(&self, record: &TravelRecord) -> bool {
        self.label_signal(record) || self.days_signal(record)
    }

    /// Returns true if exactly one of the two signals fires.
    pub fn signals_disagree(&self, record: &TravelRecord) -> bool {
        self.label_signal(record) != self.days_signal(record)
    }
}

/// Global statistics over the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralStats {
    /// Number of records.
    pub total_viagens: usize,
    /// Sum of `valor_total` over all records, unrounded.
    pub valor_total: f64,
    /// Records classified as last-minute, in input order.
    pub ultima_hora_viagens: Vec<TravelRecord>,
    /// Share of last-minute records in percent; 0 for an empty dataset.
    pub percentual_ultima_hora: f64,
    /// Records whose label and numeric lead time disagree.
    pub divergencias_sinal: usize,
}

impl GeneralStats {
    /// Number of last-minute records.
    pub fn ultima_hora_count(&self) -> usize {
        self.ultima_hora_viagens.len()
    }
}

/// Per-traveler aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonSummary {
    /// Traveler name exactly as it appears in the data.
    pub nome: String,
    /// Number of trips.
    pub viagens: usize,
    /// Cumulative spend.
    pub valor_total: f64,
    /// Source records in their original relative order.
    pub viagens_detalhes: Vec<TravelRecord>,
}

impl PersonSummary {
    /// Creates an empty summary for a traveler.
    pub fn new(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            viagens: 0,
            valor_total: 0.0,
            viagens_detalhes: Vec::new(),
        }
    }

    /// Adds one record to the summary.
    pub fn push(&mut self, record: &TravelRecord) {
        self.viagens += 1;
        self.valor_total += record.valor_total;
        self.viagens_detalhes.push(record.clone());
    }
}
