//! Error types for report generation.

use std::path::PathBuf;

/// Result type for dataset and report operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors that can occur while reading the statistics database or
/// rendering a report.
///
/// Every variant aborts the current invocation. Nothing is retried and no
/// partial report is produced.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The database file is missing, cannot be opened, or is not SQLite.
    #[error("no database available ({path}): {reason}")]
    DataSourceUnavailable { path: PathBuf, reason: String },

    /// A table, column or field the queries rely on is missing or mistyped.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Any other SQLite execution error.
    #[error("query failed: {0}")]
    QueryFailure(#[from] rusqlite::Error),

    /// A hash looked up by the caller is not in the `objects` table.
    #[error("unknown hash ({0})")]
    UnknownHash(String),

    #[error("failed to render JSON: {0}")]
    Render(#[from] serde_json::Error),
}

impl StatsError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StatsError::DataSourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify a SQLite error raised while decoding or executing a query.
    ///
    /// Column type and column lookup failures mean the row does not carry
    /// the fields we expect; everything else is an execution failure.
    pub(crate) fn from_query(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::InvalidColumnType(index, name, ty) => StatsError::MalformedRecord(
                format!("column {} ('{}') has unexpected type {}", index, name, ty),
            ),
            rusqlite::Error::InvalidColumnIndex(index) => {
                StatsError::MalformedRecord(format!("missing column at index {}", index))
            }
            rusqlite::Error::InvalidColumnName(name) => {
                StatsError::MalformedRecord(format!("missing column '{}'", name))
            }
            rusqlite::Error::FromSqlConversionFailure(index, ty, source) => {
                StatsError::MalformedRecord(format!(
                    "column {} ({}) could not be decoded: {}",
                    index, ty, source
                ))
            }
            rusqlite::Error::IntegralValueOutOfRange(index, value) => {
                StatsError::MalformedRecord(format!(
                    "column {} holds out-of-range value {}",
                    index, value
                ))
            }
            other => StatsError::QueryFailure(other),
        }
    }

    /// Whether the error means the database could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StatsError::DataSourceUnavailable { .. })
    }
}
