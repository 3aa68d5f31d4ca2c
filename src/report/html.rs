//! HTML page generation.
//!
//! Binds the view-models to standalone pages. The overview keeps the slot
//! identifiers of the original dashboard markup (`valor-total-analisado`,
//! `total-viagens-registradas`, `compras-ultima-hora`, `economia-potencial`,
//! `people-container`).

use super::format::escape_html;
use super::view::{DashboardView, NavigationButton, PersonCard, PersonDetailView, RunMetadata};

const STYLE: &str = r#"body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }
.stats { display: flex; gap: 1rem; flex-wrap: wrap; }
.stat-card { border: 1px solid #ddd; border-radius: 8px; padding: 1rem; min-width: 12rem; }
.stat-card .value { font-size: 1.6rem; font-weight: 600; }
.person-card { display: flex; justify-content: space-between; border-bottom: 1px solid #eee; padding: .75rem 0; }
.person-name a { color: #0b5cad; text-decoration: none; font-weight: 600; }
.person-stats { display: flex; gap: 2rem; }
.stat-label { color: #666; font-size: .85rem; }
.notice { background: #fff7e0; border-left: 4px solid #f0b400; padding: .5rem 1rem; }
.late { color: #b3261e; font-weight: 600; }
.navigation { display: flex; gap: .5rem; margin: 1rem 0; }
.navigation button { border: 1px solid #0b5cad; background: #fff; color: #0b5cad; border-radius: 6px; padding: .4rem .8rem; cursor: pointer; }
footer { margin-top: 2rem; color: #888; font-size: .8rem; }
"#;

/// Generate the overview page.
pub fn generate_dashboard_page(view: &DashboardView, metadata: &RunMetadata) -> String {
    let mut body = String::new();

    body.push_str(&format!("<h1>{}</h1>\n", escape_html(&view.title)));

    if let Some(ref error) = metadata.load_error {
        body.push_str(&format!(
            "<p class=\"notice\">Falha ao carregar os dados: {}</p>\n",
            escape_html(error)
        ));
    }
    if let Some(ref note) = view.data_quality_note {
        body.push_str(&format!("<p class=\"notice\">{}</p>\n", escape_html(note)));
    }

    body.push_str("<section class=\"stats\">\n");
    body.push_str(&stat_card(
        "valor-total-analisado",
        "Valor total analisado",
        &view.valor_total_analisado,
    ));
    body.push_str(&stat_card(
        "total-viagens-registradas",
        "Viagens registradas",
        &view.total_viagens_registradas,
    ));
    body.push_str(&stat_card(
        "compras-ultima-hora",
        "Compras de última hora",
        &view.compras_ultima_hora,
    ));
    body.push_str(&stat_card(
        "economia-potencial",
        "Economia potencial",
        &view.economia_potencial,
    ));
    body.push_str("</section>\n");

    if !view.navigation.is_empty() {
        body.push_str("<nav class=\"navigation\">\n");
        for button in &view.navigation {
            body.push_str(&navigation_button(button));
        }
        body.push_str("</nav>\n");
    }

    body.push_str("<h2>Pessoas</h2>\n<div id=\"people-container\">\n");
    match view.empty_message {
        Some(ref message) => {
            body.push_str(&format!("<p>{}</p>\n", escape_html(message)));
        }
        None => {
            for card in &view.people {
                body.push_str(&person_card(card));
            }
        }
    }
    body.push_str("</div>\n");

    body.push_str(&footer(metadata));

    page(&view.title, &body)
}

/// Generate a traveler's detail page.
pub fn generate_person_page(view: &PersonDetailView, metadata: &RunMetadata) -> String {
    let mut body = String::new();

    body.push_str(&format!("<h1>{}</h1>\n", escape_html(&view.nome)));

    body.push_str("<section class=\"stats\">\n");
    body.push_str(&stat_card("viagens", "Viagens", &view.viagens.to_string()));
    body.push_str(&stat_card("valor-total", "Gasto total", &view.valor_total));
    body.push_str(&stat_card("ticket-medio", "Ticket médio", &view.ticket_medio));
    body.push_str(&stat_card(
        "compras-ultima-hora",
        "Compras de última hora",
        &format!(
            "{} ({})",
            view.compras_ultima_hora, view.percentual_ultima_hora
        ),
    ));
    body.push_str("</section>\n");

    body.push_str("<h2>Viagens</h2>\n<table id=\"trips\">\n");
    body.push_str(
        "<thead><tr><th>Emissão</th><th>Origem</th><th>Destino</th>\
         <th>Antecedência</th><th>Dias</th><th>Valor</th></tr></thead>\n<tbody>\n",
    );
    for trip in &view.trips {
        let class = if trip.ultima_hora { " class=\"late\"" } else { "" };
        body.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            escape_html(&trip.data_emissao),
            escape_html(&trip.origem),
            escape_html(&trip.destino),
            escape_html(&trip.faixa_antecedencia),
            escape_html(&trip.antecedencia_compra),
            escape_html(&trip.valor_total),
        ));
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str(&footer(metadata));

    page(&view.title, &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        STYLE,
        body
    )
}

fn stat_card(id: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"stat-card\"><div class=\"value\" id=\"{}\">{}</div>\
         <div class=\"stat-label\">{}</div></div>\n",
        id,
        escape_html(value),
        escape_html(label)
    )
}

fn person_card(card: &PersonCard) -> String {
    format!(
        "<div class=\"person-card\">\n\
         <div class=\"person-info\"><div class=\"person-name\"><a href=\"{}\">{}</a></div></div>\n\
         <div class=\"person-stats\">\n\
         <div class=\"stat-item\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">Viagens</div></div>\n\
         <div class=\"stat-item\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">Gasto</div></div>\n\
         </div>\n</div>\n",
        escape_html(&card.link),
        escape_html(&card.nome),
        card.viagens,
        escape_html(&card.valor_total),
    )
}

/// The acknowledgement goes through a JSON string literal, which is also a
/// valid JavaScript one, before being escaped for the attribute.
fn navigation_button(button: &NavigationButton) -> String {
    let message = serde_json::to_string(&button.message).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "<button type=\"button\" onclick=\"alert({})\">{}</button>\n",
        escape_html(&message),
        escape_html(&button.label)
    )
}

fn footer(metadata: &RunMetadata) -> String {
    let mut footer = format!(
        "<footer>Fonte: {} | Gerado em {}",
        escape_html(&metadata.source),
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if metadata.skipped_records > 0 {
        footer.push_str(&format!(
            " | {} registro(s) inválido(s) ignorado(s)",
            metadata.skipped_records
        ));
    }
    footer.push_str("</footer>\n");
    footer
}
