//! Typed rows decoded from the aggregation queries.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Decode a `count(...)` column. SQLite hands counts back as i64.
pub(crate) fn count_column(row: &Row<'_>, index: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(index)?;
    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(index, value))
}

/// A node in the ranking: its hash and how many reference rows name it as
/// the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedNode {
    pub hash: String,
    pub children: u64,
}

impl RankedNode {
    /// Decode `(sha, count)`.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            hash: row.get(0)?,
            children: count_column(row, 1)?,
        })
    }
}

/// One parent and its fan-out count, as listed by `tree-sizes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSize {
    pub hash: String,
    pub children: u64,
}

impl TreeSize {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            hash: row.get(0)?,
            children: count_column(row, 1)?,
        })
    }
}
