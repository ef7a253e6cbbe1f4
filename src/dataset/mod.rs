//! Read-only access to a bup statistics database.
//!
//! The database is produced by `bup stats --reset` and lives next to the
//! repository as `bupstats-partial.sqlite3`. It holds two tables:
//!
//! ```text
//! objects(id INTEGER PRIMARY KEY, sha TEXT UNIQUE, type TEXT, size INTEGER)
//! refs(r_id INTEGER, o_id INTEGER, mode INTEGER, name TEXT)
//! ```
//!
//! `refs.r_id` is the parent object id and `refs.o_id` the child. Only the
//! columns the queries read are required.
//!
//! # Design
//!
//! - Opened with `SQLITE_OPEN_READ_ONLY`; nothing here writes.
//! - A `Dataset` owns its connection. Dropping it closes the handle.
//! - Rows are decoded into typed structs at this boundary.

mod rows;
mod schema;

pub use rows::{RankedNode, TreeSize};
pub use schema::ChildColumn;

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::error::{StatsError, StatsResult};

/// File name `bup stats` writes the database under, inside the repository.
pub const DEFAULT_FILE_NAME: &str = "bupstats-partial.sqlite3";

/// A read-only handle on the statistics database.
pub struct Dataset {
    conn: Connection,
    child_column: ChildColumn,
}

impl Dataset {
    /// Open an existing database read-only.
    ///
    /// Fails with [`StatsError::DataSourceUnavailable`] if the file is
    /// missing, cannot be opened, or is not a SQLite database, and with
    /// [`StatsError::MalformedRecord`] if the expected tables are absent.
    /// A zero-byte file is a valid, empty SQLite database, so it falls in
    /// the second case.
    pub fn open<P: AsRef<Path>>(path: P) -> StatsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StatsError::unavailable(path, "file not found"));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn =
            Connection::open_with_flags(path, flags).map_err(|e| StatsError::unavailable(path, e))?;

        // SQLite reads the header lazily; force it so a foreign file is
        // reported as unavailable rather than as a query failure later.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| StatsError::unavailable(path, e))?;

        let dataset = Self::from_connection(conn)?;
        info!(path = %path.display(), "opened statistics database");
        Ok(dataset)
    }

    /// Wrap an already open connection (in-memory databases in tests).
    pub fn from_connection(conn: Connection) -> StatsResult<Self> {
        let child_column = schema::probe(&conn)?;
        Ok(Self { conn, child_column })
    }

    /// Which `refs` column holds the child id.
    pub fn child_column(&self) -> ChildColumn {
        self.child_column
    }

    /// Fan-out count of every parent id in `refs`, ascending.
    ///
    /// Counts reference rows per `r_id`, not distinct children, and does not
    /// require the parent to exist in `objects`.
    pub fn fan_out_counts(&self) -> StatsResult<Vec<u64>> {
        debug!("querying fan-out counts");
        let mut stmt = self
            .conn
            .prepare("SELECT count(r_id) AS c FROM refs GROUP BY r_id ORDER BY c")?;
        let counts = stmt
            .query_map([], |row| rows::count_column(row, 0))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StatsError::from_query)?;
        Ok(counts)
    }

    /// Parents ranked by child count, descending, ties by hash ascending.
    ///
    /// Rows are read in that order and reading stops at the first row whose
    /// count is below `threshold`.
    pub fn top_children(&self, threshold: u64) -> StatsResult<Vec<RankedNode>> {
        debug!(threshold, "querying child-count ranking");
        let mut stmt = self.conn.prepare(
            "SELECT o.sha, count(r.r_id) AS c
             FROM refs r
             JOIN objects o ON r.r_id = o.id
             GROUP BY r.r_id
             ORDER BY c DESC, o.sha",
        )?;
        let mut rows = stmt.query([])?;

        let mut ranked = Vec::new();
        while let Some(row) = rows.next().map_err(StatsError::from_query)? {
            let node = RankedNode::from_row(row).map_err(StatsError::from_query)?;
            if node.children < threshold {
                break;
            }
            ranked.push(node);
        }
        Ok(ranked)
    }

    /// Every parent with its fan-out count, ascending, ties by hash.
    pub fn tree_sizes(&self) -> StatsResult<Vec<TreeSize>> {
        debug!("querying tree sizes");
        let mut stmt = self.conn.prepare(
            "SELECT o.sha, count(r.r_id) AS c
             FROM refs r
             JOIN objects o ON r.r_id = o.id
             GROUP BY r.r_id
             ORDER BY c, o.sha",
        )?;
        let sizes = stmt
            .query_map([], TreeSize::from_row)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StatsError::from_query)?;
        Ok(sizes)
    }

    /// Numeric id of the object with the given hash.
    pub fn object_id(&self, sha: &str) -> StatsResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM objects WHERE sha = ?1",
                params![sha],
                |row| row.get(0),
            )
            .optional()
            .map_err(StatsError::from_query)?;
        Ok(id)
    }

    /// Distinct hashes of the objects that reference `sha` as a child.
    pub fn parents_of(&self, sha: &str) -> StatsResult<Vec<String>> {
        let id = self
            .object_id(sha)?
            .ok_or_else(|| StatsError::UnknownHash(sha.to_string()))?;

        debug!(sha, id, "querying parents");
        let sql = format!(
            "SELECT DISTINCT o.sha
             FROM refs r
             JOIN objects o ON r.r_id = o.id
             WHERE r.{} = ?1
             ORDER BY o.sha",
            self.child_column.as_str()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let parents = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()
            .map_err(StatsError::from_query)?;
        Ok(parents)
    }
}
