//! Markdown and JSON report generation.
//!
//! Text renditions of the dashboard view-models, for terminals, wikis and
//! downstream tooling.

use super::view::{DashboardView, PersonDetailView, RunMetadata};
use anyhow::Result;
use serde::Serialize;

/// Generate the overview as Markdown.
pub fn generate_markdown_report(view: &DashboardView, metadata: &RunMetadata) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", view.title));
    output.push_str(&generate_notices(metadata, view.data_quality_note.as_deref()));

    // Summary
    output.push_str("## Resumo\n\n");
    output.push_str("| Valor total analisado | Viagens registradas | Compras de última hora | Economia potencial |\n");
    output.push_str("|:---:|:---:|:---:|:---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        view.valor_total_analisado,
        view.total_viagens_registradas,
        view.compras_ultima_hora,
        view.economia_potencial
    ));

    // People
    output.push_str("## Pessoas\n\n");
    match view.empty_message {
        Some(ref message) => {
            output.push_str(message);
            output.push_str("\n\n");
        }
        None => {
            output.push_str("| Pessoa | Viagens | Gasto |\n");
            output.push_str("|:---|:---:|---:|\n");
            for card in &view.people {
                output.push_str(&format!(
                    "| [{}]({}) | {} | {} |\n",
                    escape_markdown(&card.nome),
                    card.link,
                    card.viagens,
                    card.valor_total
                ));
            }
            output.push('\n');
        }
    }

    output.push_str(&generate_footer(metadata));

    output
}

/// Generate a traveler's detail page as Markdown.
pub fn generate_person_markdown(view: &PersonDetailView, metadata: &RunMetadata) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", escape_markdown(&view.nome)));
    output.push_str(&format!("- **Viagens:** {}\n", view.viagens));
    output.push_str(&format!("- **Gasto total:** {}\n", view.valor_total));
    output.push_str(&format!("- **Ticket médio:** {}\n", view.ticket_medio));
    output.push_str(&format!(
        "- **Compras de última hora:** {} ({})\n\n",
        view.compras_ultima_hora, view.percentual_ultima_hora
    ));

    output.push_str("## Viagens\n\n");
    output.push_str("| Emissão | Origem | Destino | Antecedência | Dias | Valor | |\n");
    output.push_str("|:---|:---|:---|:---|:---:|---:|:---:|\n");
    for trip in &view.trips {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_markdown(&trip.data_emissao),
            escape_markdown(&trip.origem),
            escape_markdown(&trip.destino),
            escape_markdown(&trip.faixa_antecedencia),
            trip.antecedencia_compra,
            trip.valor_total,
            if trip.ultima_hora { "⚠️" } else { "" }
        ));
    }
    output.push('\n');

    output.push_str(&generate_footer(metadata));

    output
}

fn generate_notices(metadata: &RunMetadata, data_quality_note: Option<&str>) -> String {
    let mut section = String::new();

    if let Some(ref error) = metadata.load_error {
        section.push_str(&format!("> ⚠️ Falha ao carregar os dados: {}\n\n", error));
    }
    if let Some(note) = data_quality_note {
        section.push_str(&format!("> ⚠️ {}\n\n", note));
    }

    section
}

/// Generate the report footer.
fn generate_footer(metadata: &RunMetadata) -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Fonte: {} | Gerado em {}*\n",
        metadata.source,
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if metadata.skipped_records > 0 {
        footer.push_str(&format!(
            "\n*{} registro(s) inválido(s) ignorado(s)*\n",
            metadata.skipped_records
        ));
    }

    footer
}

/// Keep names from breaking table cells and link text.
fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

/// A view together with the run that produced it.
#[derive(Serialize)]
struct JsonDocument<'a, T: Serialize> {
    metadata: &'a RunMetadata,
    #[serde(flatten)]
    view: &'a T,
}

/// Generate a JSON document for any view.
pub fn generate_json_report<T: Serialize>(view: &T, metadata: &RunMetadata) -> Result<String> {
    serde_json::to_string_pretty(&JsonDocument { metadata, view }).map_err(Into::into)
}
