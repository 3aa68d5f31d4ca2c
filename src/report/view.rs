//! Dashboard view-models.
//!
//! Rendering is a pure mapping from aggregated data to display-ready text.
//! The adapters in [`super::html`] and [`super::generator`] bind these
//! structures to concrete documents.

use super::format::{encode_uri_component, format_brl, format_days, format_percent};
use crate::analysis::percentage;
use crate::config::ReportConfig;
use crate::models::{GeneralStats, LastMinuteRule, PersonSummary, TravelRecord};
use crate::navigation::{navigate, NavigationRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display values for the overview page.
///
/// Field names match the slot identifiers of the dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub valor_total_analisado: String,
    pub total_viagens_registradas: String,
    pub compras_ultima_hora: String,
    pub economia_potencial: String,
    pub people: Vec<PersonCard>,
    pub navigation: Vec<NavigationButton>,
    /// Set only on the empty-state path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
    /// Set when the two last-minute signals disagree on some records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_quality_note: Option<String>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.empty_message.is_some()
    }
}

/// One card in the people list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonCard {
    pub nome: String,
    pub viagens: usize,
    pub valor_total: String,
    /// Link to the traveler's detail page.
    pub link: String,
}

/// A navigation button and the acknowledgement it shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationButton {
    pub label: String,
    pub message: String,
}

/// Display values for one traveler's detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonDetailView {
    pub title: String,
    pub nome: String,
    pub viagens: usize,
    pub valor_total: String,
    pub ticket_medio: String,
    pub compras_ultima_hora: usize,
    pub percentual_ultima_hora: String,
    pub trips: Vec<TripRow>,
}

/// One trip in a detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRow {
    pub data_emissao: String,
    pub origem: String,
    pub destino: String,
    pub faixa_antecedencia: String,
    pub antecedencia_compra: String,
    pub valor_total: String,
    pub ultima_hora: bool,
}

/// Information about the run that produced a view.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    /// Loader failure that forced the empty state, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    /// Malformed records dropped while loading.
    pub skipped_records: usize,
}

/// Build the overview from aggregated data.
pub fn render(
    stats: &GeneralStats,
    people: &[PersonSummary],
    settings: &ReportConfig,
) -> DashboardView {
    DashboardView {
        title: settings.title.clone(),
        valor_total_analisado: format_brl(stats.valor_total),
        total_viagens_registradas: stats.total_viagens.to_string(),
        compras_ultima_hora: format_percent(stats.percentual_ultima_hora),
        economia_potencial: settings.savings_placeholder.clone(),
        people: people
            .iter()
            .map(|person| person_card(person, settings))
            .collect(),
        navigation: navigation_buttons(&settings.navigation),
        empty_message: None,
        data_quality_note: data_quality_note(stats),
    }
}

/// Build the overview shown when there is no data.
pub fn render_empty(settings: &ReportConfig) -> DashboardView {
    DashboardView {
        title: settings.title.clone(),
        valor_total_analisado: format_brl(0.0),
        total_viagens_registradas: "0".to_string(),
        compras_ultima_hora: format_percent(0.0),
        economia_potencial: settings.savings_placeholder.clone(),
        people: Vec::new(),
        navigation: navigation_buttons(&settings.navigation),
        empty_message: Some(settings.empty_message.clone()),
        data_quality_note: None,
    }
}

/// Build the detail page for one traveler.
pub fn render_person(
    person: &PersonSummary,
    rule: &LastMinuteRule,
    settings: &ReportConfig,
) -> PersonDetailView {
    let late = person
        .viagens_detalhes
        .iter()
        .filter(|r| rule.is_last_minute(r))
        .count();

    let average = if person.viagens == 0 {
        0.0
    } else {
        person.valor_total / person.viagens as f64
    };

    PersonDetailView {
        title: format!("{} - {}", settings.title, person.nome),
        nome: person.nome.clone(),
        viagens: person.viagens,
        valor_total: format_brl(person.valor_total),
        ticket_medio: format_brl(average),
        compras_ultima_hora: late,
        percentual_ultima_hora: format_percent(percentage(late, person.viagens)),
        trips: person
            .viagens_detalhes
            .iter()
            .map(|record| trip_row(record, rule))
            .collect(),
    }
}

fn person_card(person: &PersonSummary, settings: &ReportConfig) -> PersonCard {
    PersonCard {
        nome: person.nome.clone(),
        viagens: person.viagens,
        valor_total: format_brl(person.valor_total),
        link: detail_link(&settings.detail_page, &person.nome),
    }
}

/// Link to a traveler's detail page, e.g. `pessoa.html?nome=Ana%20Souza`.
pub fn detail_link(page: &str, nome: &str) -> String {
    format!("{}?nome={}", page, encode_uri_component(nome))
}

fn navigation_buttons(requests: &[NavigationRequest]) -> Vec<NavigationButton> {
    requests
        .iter()
        .map(|request| NavigationButton {
            label: format!("{}: {}", request.target.label(), request.category),
            message: navigate(request.target, &request.category).message,
        })
        .collect()
}

fn trip_row(record: &TravelRecord, rule: &LastMinuteRule) -> TripRow {
    let text = |key: &str| record.field_text(key).unwrap_or_else(|| "-".to_string());

    TripRow {
        data_emissao: text("data_emissao"),
        origem: text("cidade_origem"),
        destino: text("cidade_destino"),
        faixa_antecedencia: record.faixa_antecedencia.clone(),
        antecedencia_compra: format_days(record.antecedencia_compra),
        valor_total: format_brl(record.valor_total),
        ultima_hora: rule.is_last_minute(record),
    }
}

fn data_quality_note(stats: &GeneralStats) -> Option<String> {
    match stats.divergencias_sinal {
        0 => None,
        1 => Some(
            "1 registro com faixa de antecedência divergente dos dias de antecedência.".to_string(),
        ),
        n => Some(format!(
            "{} registros com faixa de antecedência divergente dos dias de antecedência.",
            n
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_general_stats, group_by_person};

    fn scenario() -> Vec<TravelRecord> {
        vec![
            TravelRecord::new("Ana", 100.0, "0-3 dias", 2.0),
            TravelRecord::new("Ana", 50.0, "4-7 dias", 5.0),
            TravelRecord::new("Bea", 200.0, "4-7 dias", 6.0),
        ]
    }

    #[test]
    fn test_render_scenario() {
        let records = scenario();
        let stats = compute_general_stats(&records, &LastMinuteRule::default());
        let people = group_by_person(&records);

        let view = render(&stats, &people, &ReportConfig::default());

        assert_eq!(view.valor_total_analisado, "R$ 350,00");
        assert_eq!(view.total_viagens_registradas, "3");
        assert_eq!(view.compras_ultima_hora, "33%");
        assert_eq!(view.economia_potencial, "-");
        assert!(!view.is_empty());
        assert!(view.data_quality_note.is_none());

        assert_eq!(view.people.len(), 2);
        assert_eq!(view.people[0].nome, "Ana");
        assert_eq!(view.people[0].viagens, 2);
        assert_eq!(view.people[0].valor_total, "R$ 150,00");
        assert_eq!(view.people[0].link, "pessoa.html?nome=Ana");
        assert_eq!(view.people[1].link, "pessoa.html?nome=Bea");

        assert_eq!(view.navigation.len(), 3);
        assert_eq!(view.navigation[2].label, "Relatório: mensal");
        assert_eq!(view.navigation[2].message, "Abrir relatório: mensal");
    }

    #[test]
    fn test_render_empty() {
        let view = render_empty(&ReportConfig::default());

        assert_eq!(view.valor_total_analisado, "R$ 0,00");
        assert_eq!(view.total_viagens_registradas, "0");
        assert_eq!(view.compras_ultima_hora, "0%");
        assert_eq!(view.economia_potencial, "-");
        assert!(view.people.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some("Nenhum dado disponível."));
        assert_eq!(view.navigation.len(), 3);
    }

    #[test]
    fn test_render_with_divergent_signals() {
        let records = vec![
            TravelRecord::new("Ana", 10.0, "0-3 dias", 10.0),
            TravelRecord::new("Bea", 10.0, "4-7 dias", 2.0),
        ];
        let stats = compute_general_stats(&records, &LastMinuteRule::default());

        let view = render(&stats, &group_by_person(&records), &ReportConfig::default());

        assert_eq!(view.compras_ultima_hora, "100%");
        assert!(view.data_quality_note.unwrap().starts_with("2 registros"));
    }

    #[test]
    fn test_detail_link_encodes_name() {
        assert_eq!(
            detail_link("pessoa.html", "José da Silva"),
            "pessoa.html?nome=Jos%C3%A9%20da%20Silva"
        );
    }

    #[test]
    fn test_render_person() {
        let mut records = scenario();
        records[0]
            .extra
            .insert("cidade_origem".to_string(), serde_json::json!("Recife"));
        let people = group_by_person(&records);

        let detail = render_person(&people[0], &LastMinuteRule::default(), &ReportConfig::default());

        assert_eq!(detail.nome, "Ana");
        assert_eq!(detail.viagens, 2);
        assert_eq!(detail.valor_total, "R$ 150,00");
        assert_eq!(detail.ticket_medio, "R$ 75,00");
        assert_eq!(detail.compras_ultima_hora, 1);
        assert_eq!(detail.percentual_ultima_hora, "50%");
        assert_eq!(detail.trips.len(), 2);
        assert_eq!(detail.trips[0].origem, "Recife");
        assert_eq!(detail.trips[0].destino, "-");
        assert!(detail.trips[0].ultima_hora);
        assert!(!detail.trips[1].ultima_hora);
        assert_eq!(detail.trips[1].antecedencia_compra, "5");
    }
}
