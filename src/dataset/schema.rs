//! Schema probe for the statistics database.
//!
//! The reports need `objects(id, sha)` and `refs(r_id, <child>)`. bup names
//! the child column `o_id`; older or hand-built datasets call it `id`.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{StatsError, StatsResult};

/// Name of the column in `refs` pointing at the child object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildColumn {
    /// `refs.o_id`, as written by `bup stats`.
    OId,
    /// `refs.id`.
    Id,
}

impl ChildColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildColumn::OId => "o_id",
            ChildColumn::Id => "id",
        }
    }
}

/// Column names of a table, in declaration order. Empty if the table
/// doesn't exist.
fn table_columns(conn: &Connection, table: &str) -> StatsResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(columns)
}

/// SQLite identifiers are case-insensitive, so `ID` matches `id`.
fn has_column(present: &[String], name: &str) -> bool {
    present.iter().any(|c| c.eq_ignore_ascii_case(name))
}

fn require_columns(table: &str, present: &[String], wanted: &[&str]) -> StatsResult<()> {
    if present.is_empty() {
        return Err(StatsError::MalformedRecord(format!(
            "missing table '{}'",
            table
        )));
    }
    for column in wanted {
        if !has_column(present, column) {
            return Err(StatsError::MalformedRecord(format!(
                "table '{}' has no column '{}'",
                table, column
            )));
        }
    }
    Ok(())
}

/// Check that both tables exist with the columns the queries read, and
/// work out which child column `refs` uses.
pub fn probe(conn: &Connection) -> StatsResult<ChildColumn> {
    let objects = table_columns(conn, "objects")?;
    require_columns("objects", &objects, &["id", "sha"])?;

    let refs = table_columns(conn, "refs")?;
    require_columns("refs", &refs, &["r_id"])?;

    let child = if has_column(&refs, "o_id") {
        ChildColumn::OId
    } else if has_column(&refs, "id") {
        ChildColumn::Id
    } else {
        return Err(StatsError::MalformedRecord(
            "table 'refs' has no child column ('o_id' or 'id')".to_string(),
        ));
    };

    debug!(
        objects = ?objects,
        refs = ?refs,
        child_column = child.as_str(),
        "probed dataset schema"
    );
    Ok(child)
}
