//! # bupstats
//!
//! Tree-size reports over a bup statistics database.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        bupstats-partial.sqlite3 (read-only)              │
//! │        objects(id, sha)   refs(r_id, o_id)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [dataset]
//! ┌─────────────────────────────────────────────────────────┐
//! │   fan-out counts (ascending)   ranked nodes (descending) │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Report { histogram bands, ranking }               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [render]
//! ┌─────────────────────────────────────────────────────────┐
//! │        HTML page │ text │ JSON                           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod render;
pub mod report;

#[cfg(feature = "serve")]
pub mod web;

pub use error::{StatsError, StatsResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::dataset::{Dataset, RankedNode, TreeSize};
    pub use crate::error::{StatsError, StatsResult};
    pub use crate::render::Format;
    pub use crate::report::{generate_report, HistogramRow, Report, ReportOptions};
}
