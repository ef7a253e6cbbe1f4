//! Fan-out histogram banding.

use serde::{Deserialize, Serialize};

/// One histogram line: `count` trees with `nodes` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramRow {
    /// Parents that fell into this band.
    pub count: u64,
    /// The band's fan-out value.
    pub nodes: u64,
}

/// Fold ascending fan-out counts into histogram bands.
///
/// The accumulator is `(band, count)`, starting at `(1, 0)`. For each fan-out
/// value `c`, if `c > band` the current band is emitted and a new one starts
/// at `c` with a count of zero; then the count is incremented. The last band
/// is always emitted, so an empty input yields `[(0, 1)]`.
///
/// The flip happens before the increment: when the smallest fan-out is above
/// 1, a leading `(0, 1)` band is emitted.
///
/// `counts` must be sorted ascending.
pub fn band_fan_out<I>(counts: I) -> Vec<HistogramRow>
where
    I: IntoIterator<Item = u64>,
{
    let mut rows = Vec::new();
    let (band, count) = counts
        .into_iter()
        .fold((1u64, 0u64), |(band, count), c| {
            if c > band {
                rows.push(HistogramRow { count, nodes: band });
                (c, 1)
            } else {
                (band, count + 1)
            }
        });
    rows.push(HistogramRow { count, nodes: band });
    rows
}
