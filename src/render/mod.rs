//! Report renderings: HTML page, terminal text and JSON.
//!
//! All renderers are pure functions of their input, so rendering the same
//! report twice gives byte-identical output.

mod html;
mod text;

pub use html::html;
pub use text::{parents_text, text, tree_sizes_text};

use serde::{Deserialize, Serialize};

use crate::error::StatsResult;
use crate::report::Report;

/// Output format for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Html,
    Text,
    Json,
}

/// Pretty-printed JSON.
pub fn json(report: &Report) -> StatsResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render `report` in `format`. `source` only appears in HTML output.
pub fn render(report: &Report, format: Format, source: Option<&str>) -> StatsResult<String> {
    match format {
        Format::Html => Ok(html(report, source)),
        Format::Text => Ok(text(report)),
        Format::Json => json(report),
    }
}
