//! HTML page rendering.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::report::Report;

const STYLE: &str = "
    body { font-family: monospace; }
    td.right { text-align: right; }
    th { text-align: left; }
    table { margin-bottom: 2em; }
";

fn histogram_table(report: &Report) -> Markup {
    html! {
        table.histogram {
            tr {
                th { "count" }
                th {}
                th { "nodes" }
                th {}
            }
            @for row in &report.histogram {
                tr {
                    td.right { (row.count) }
                    td { "trees with" }
                    td.right { (row.nodes) }
                    td { "nodes" }
                }
            }
        }
    }
}

fn ranking_table(report: &Report) -> Markup {
    html! {
        table.ranking {
            tr {
                th { "hash" }
                th width="30px" { "children" }
            }
            @for node in &report.ranking {
                tr {
                    td { (node.hash) }
                    td.right { (node.children) }
                }
            }
        }
    }
}

/// Render a full HTML page for `report`.
///
/// `source` is shown above the tables when given, usually the database path.
pub fn html(report: &Report, source: Option<&str>) -> String {
    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "bup stats" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                @if let Some(source) = source {
                    p.source { "Database: " (source) }
                }
                h2 { "Tree sizes" }
                (histogram_table(report))
                h2 { "Nodes with at least " (report.threshold) " children" }
                (ranking_table(report))
            }
        }
    };
    page.into_string()
}
