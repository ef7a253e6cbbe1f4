//! Plain-text rendering for terminals.

use crate::dataset::TreeSize;
use crate::report::Report;

/// Render both report tables as aligned text.
pub fn text(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("Tree sizes:\n");
    for row in &report.histogram {
        out.push_str(&format!(
            "{:>10} trees with {:>8} nodes\n",
            row.count, row.nodes
        ));
    }

    out.push_str(&format!(
        "\nNodes with at least {} children:\n",
        report.threshold
    ));
    if report.ranking.is_empty() {
        out.push_str("  (none)\n");
    }
    for node in &report.ranking {
        out.push_str(&format!("{}  {:>8}\n", node.hash, node.children));
    }
    out
}

/// Every parent and its fan-out, one per line.
pub fn tree_sizes_text(sizes: &[TreeSize]) -> String {
    let mut out = String::from("Tree sizes:\n");
    for size in sizes {
        out.push_str(&format!("{} {}\n", size.hash, size.children));
    }
    out
}

/// The parents of `sha`, one hash per line.
pub fn parents_text(sha: &str, parents: &[String]) -> String {
    let mut out = format!("Parent of {}\n", sha);
    for parent in parents {
        out.push_str(parent);
        out.push('\n');
    }
    out
}
