//! End-to-end report generation against on-disk databases.

use bupstats::dataset::{Dataset, RankedNode};
use bupstats::report::{generate_report, HistogramRow, ReportOptions};
use bupstats::StatsError;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a bup-schema database with the given objects (ids from 1) and
/// `(parent id, child id)` refs.
fn create_dataset(dir: &TempDir, objects: &[&str], refs: &[(i64, i64)]) -> PathBuf {
    let path = dir.path().join("bupstats-partial.sqlite3");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE objects (id INTEGER PRIMARY KEY AUTOINCREMENT, sha TEXT UNIQUE, type TEXT, size INTEGER);
         CREATE TABLE refs (r_id INTEGER, o_id INTEGER, mode INTEGER, name TEXT);",
    )
    .unwrap();
    for sha in objects {
        conn.execute("INSERT INTO objects VALUES (NULL, ?1, 'tree', 0)", params![sha])
            .unwrap();
    }
    for (i, (r_id, o_id)) in refs.iter().enumerate() {
        conn.execute(
            "INSERT INTO refs VALUES (?1, ?2, 33188, ?3)",
            params![r_id, o_id, format!("file{}", i)],
        )
        .unwrap();
    }
    path
}

/// `n` refs from `parent` to child id 1.
fn fan(parent: i64, n: usize) -> Vec<(i64, i64)> {
    vec![(parent, 1); n]
}

#[test]
fn test_worked_example() {
    // parent 1 has children A, B; parent 2 has child C
    let dir = TempDir::new().unwrap();
    let path = create_dataset(&dir, &["p1", "p2", "A", "B", "C"], &[(1, 3), (1, 4), (2, 5)]);
    let dataset = Dataset::open(&path).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default().with_threshold(1)).unwrap();

    assert_eq!(
        report.histogram,
        vec![
            HistogramRow { count: 1, nodes: 1 },
            HistogramRow { count: 1, nodes: 2 },
        ]
    );
    assert_eq!(
        report.ranking,
        vec![
            RankedNode { hash: "p1".to_string(), children: 2 },
            RankedNode { hash: "p2".to_string(), children: 1 },
        ]
    );
}

#[test]
fn test_empty_refs() {
    let dir = TempDir::new().unwrap();
    let path = create_dataset(&dir, &["lonely"], &[]);
    let dataset = Dataset::open(&path).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default()).unwrap();

    assert_eq!(report.histogram, vec![HistogramRow { count: 0, nodes: 1 }]);
    assert!(report.ranking.is_empty());
}

#[test]
fn test_equal_counts_ranked_by_hash() {
    let dir = TempDir::new().unwrap();
    let mut refs = fan(1, 150);
    refs.extend(fan(2, 150));
    let path = create_dataset(&dir, &["bbb", "aaa"], &refs);
    let dataset = Dataset::open(&path).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default()).unwrap();

    assert_eq!(
        report.ranking,
        vec![
            RankedNode { hash: "aaa".to_string(), children: 150 },
            RankedNode { hash: "bbb".to_string(), children: 150 },
        ]
    );
}

#[test]
fn test_ranking_respects_default_threshold() {
    let dir = TempDir::new().unwrap();
    let mut refs = fan(1, 99);
    refs.extend(fan(2, 100));
    refs.extend(fan(3, 250));
    let path = create_dataset(&dir, &["small", "edge", "big"], &refs);
    let dataset = Dataset::open(&path).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default()).unwrap();

    let hashes: Vec<_> = report.ranking.iter().map(|n| n.hash.as_str()).collect();
    assert_eq!(hashes, vec!["big", "edge"]);
    assert!(report.ranking.iter().all(|n| n.children >= 100));
    assert!(report
        .ranking
        .windows(2)
        .all(|w| w[0].children > w[1].children
            || (w[0].children == w[1].children && w[0].hash < w[1].hash)));
}

#[test]
fn test_histogram_with_gaps() {
    // fan-outs: 3, 3, 5 -> leading (0, 1) band from the flip-then-increment order
    let dir = TempDir::new().unwrap();
    let mut refs = fan(1, 3);
    refs.extend(fan(2, 3));
    refs.extend(fan(3, 5));
    let path = create_dataset(&dir, &["a", "b", "c"], &refs);
    let dataset = Dataset::open(&path).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default()).unwrap();

    assert_eq!(
        report.histogram,
        vec![
            HistogramRow { count: 0, nodes: 1 },
            HistogramRow { count: 2, nodes: 3 },
            HistogramRow { count: 1, nodes: 5 },
        ]
    );
}

#[test]
fn test_histogram_counts_every_parent_once() {
    let dir = TempDir::new().unwrap();
    let mut refs = Vec::new();
    for (parent, n) in [(1, 1), (2, 1), (3, 4), (4, 2), (5, 7), (6, 4), (7, 1)] {
        refs.extend(fan(parent, n));
    }
    // parent 42 has no objects row but still counts in the histogram
    refs.extend(fan(42, 2));
    let path = create_dataset(&dir, &["a", "b", "c", "d", "e", "f", "g"], &refs);
    let dataset = Dataset::open(&path).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default().with_threshold(0)).unwrap();

    assert_eq!(report.parent_count(), 8);
    assert_eq!(report.ranking.len(), 7);
}

#[test]
fn test_report_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut refs = fan(1, 120);
    refs.extend(fan(2, 3));
    let path = create_dataset(&dir, &["a", "b"], &refs);

    let first = {
        let dataset = Dataset::open(&path).unwrap();
        generate_report(&dataset, &ReportOptions::default()).unwrap()
    };
    let second = {
        let dataset = Dataset::open(&path).unwrap();
        generate_report(&dataset, &ReportOptions::default()).unwrap()
    };

    assert_eq!(first, second);
    assert_eq!(
        bupstats::render::html(&first, None),
        bupstats::render::html(&second, None)
    );
}

#[test]
fn test_upper_case_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE objects (ID INTEGER PRIMARY KEY, SHA TEXT UNIQUE);
         CREATE TABLE refs (R_ID INTEGER, O_ID INTEGER);
         INSERT INTO objects VALUES (1, 'root'), (2, 'leaf');
         INSERT INTO refs VALUES (1, 2), (1, 2);",
    )
    .unwrap();
    let dataset = Dataset::from_connection(conn).unwrap();

    let report = generate_report(&dataset, &ReportOptions::default().with_threshold(2)).unwrap();

    assert_eq!(
        report.histogram,
        vec![
            HistogramRow { count: 0, nodes: 1 },
            HistogramRow { count: 1, nodes: 2 },
        ]
    );
    assert_eq!(
        report.ranking,
        vec![RankedNode { hash: "root".to_string(), children: 2 }]
    );
    assert_eq!(dataset.parents_of("leaf").unwrap(), vec!["root"]);
}

#[test]
fn test_failing_query_aborts_report() {
    // The view has the expected columns, but reading it raises an integer
    // overflow inside SQLite.
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE objects (id INTEGER PRIMARY KEY, sha TEXT UNIQUE);
         CREATE TABLE refs_data (r_id INTEGER, o_id INTEGER);
         INSERT INTO objects VALUES (1, 'root');
         INSERT INTO refs_data VALUES (1, 1);
         CREATE VIEW refs AS
             SELECT r_id, o_id FROM refs_data
             WHERE abs(-9223372036854775808) > 0;",
    )
    .unwrap();
    let dataset = Dataset::from_connection(conn).unwrap();

    let result = generate_report(&dataset, &ReportOptions::default().with_threshold(0));

    match result {
        Err(StatsError::QueryFailure(err)) => {
            assert!(err.to_string().contains("integer overflow"));
        }
        other => panic!("expected a query failure, got {:?}", other),
    }
}
