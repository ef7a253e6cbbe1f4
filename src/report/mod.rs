//! Tree-size report generation.
//!
//! A report has two parts:
//!
//! 1. A fan-out histogram: how many parents ("trees") have a given number
//!    of children ("nodes"), banded as described on [`band_fan_out`].
//! 2. A ranking of the parents with at least `threshold` children,
//!    by child count descending and hash ascending.
//!
//! # Example
//!
//! ```ignore
//! use bupstats::dataset::Dataset;
//! use bupstats::report::{generate_report, ReportOptions};
//!
//! let dataset = Dataset::open("bupstats-partial.sqlite3")?;
//! let report = generate_report(&dataset, &ReportOptions::default())?;
//! for row in &report.histogram {
//!     println!("{} trees with {} nodes", row.count, row.nodes);
//! }
//! ```

mod histogram;

pub use histogram::{band_fan_out, HistogramRow};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::{Dataset, RankedNode};
use crate::error::StatsResult;

/// Child count a node needs to appear in the ranking by default.
pub const DEFAULT_THRESHOLD: u64 = 100;

/// Options for [`generate_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Minimum child count for the ranking.
    pub threshold: u64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ReportOptions {
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// The two derived views of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Ranking cutoff the report was generated with.
    pub threshold: u64,
    /// Fan-out bands, ascending by `nodes`. Never empty.
    pub histogram: Vec<HistogramRow>,
    /// Parents with `children >= threshold`.
    pub ranking: Vec<RankedNode>,
}

impl Report {
    /// Number of parents accounted for by the histogram.
    pub fn parent_count(&self) -> u64 {
        self.histogram.iter().map(|row| row.count).sum()
    }
}

/// Run both aggregation queries against `dataset`.
///
/// Any failure aborts the whole report.
pub fn generate_report(dataset: &Dataset, options: &ReportOptions) -> StatsResult<Report> {
    let histogram = band_fan_out(dataset.fan_out_counts()?);
    let ranking = dataset.top_children(options.threshold)?;

    let report = Report {
        threshold: options.threshold,
        histogram,
        ranking,
    };
    info!(
        parents = report.parent_count(),
        bands = report.histogram.len(),
        ranked = report.ranking.len(),
        threshold = options.threshold,
        "generated tree-size report"
    );
    Ok(report)
}
