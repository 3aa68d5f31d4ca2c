//! Dashboard rendering.
//!
//! [`view`] maps aggregated data to view-models; [`html`] and [`generator`]
//! turn view-models into documents.

pub mod format;
pub mod generator;
pub mod html;
pub mod view;

pub use generator::{generate_json_report, generate_markdown_report, generate_person_markdown};
pub use html::{generate_dashboard_page, generate_person_page};
pub use view::{render, render_empty, render_person, RunMetadata};
