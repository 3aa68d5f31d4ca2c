//! Trip aggregation and statistics.
//!
//! Pure functions over the loaded records: global totals, last-minute ratio
//! and per-traveler grouping.

use crate::models::{GeneralStats, LastMinuteRule, PersonSummary, TravelRecord};
use std::collections::HashMap;

/// Compute global statistics for a dataset.
pub fn compute_general_stats(records: &[TravelRecord], rule: &LastMinuteRule) -> GeneralStats {
    let total_viagens = records.len();
    let valor_total: f64 = records.iter().map(|r| r.valor_total).sum();

    let ultima_hora_viagens: Vec<TravelRecord> = records
        .iter()
        .filter(|r| rule.is_last_minute(r))
        .cloned()
        .collect();

    let divergencias_sinal = records.iter().filter(|r| rule.signals_disagree(r)).count();

    GeneralStats {
        total_viagens,
        valor_total,
        percentual_ultima_hora: percentage(ultima_hora_viagens.len(), total_viagens),
        ultima_hora_viagens,
        divergencias_sinal,
    }
}

/// Group records by traveler, in first-seen order.
///
/// Names are compared exactly; "Ana" and "ana " are different travelers.
pub fn group_by_person(records: &[TravelRecord]) -> Vec<PersonSummary> {
    let mut people: Vec<PersonSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.passageiro.as_str()).or_insert_with(|| {
            people.push(PersonSummary::new(record.passageiro.clone()));
            people.len() - 1
        });
        people[slot].push(record);
    }

    people
}

/// Find one traveler's summary by exact name.
pub fn find_person<'a>(people: &'a [PersonSummary], nome: &str) -> Option<&'a PersonSummary> {
    people.iter().find(|p| p.nome == nome)
}

/// `part` as a percentage of `total`, 0 when `total` is 0.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
