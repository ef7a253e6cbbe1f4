//! Rendering reports built from real datasets.

use bupstats::dataset::Dataset;
use bupstats::render::{self, Format};
use bupstats::report::{generate_report, Report, ReportOptions};
use rusqlite::Connection;

fn report_with_threshold(threshold: u64) -> Report {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE objects (id INTEGER PRIMARY KEY, sha TEXT UNIQUE);
         CREATE TABLE refs (r_id INTEGER, o_id INTEGER);
         INSERT INTO objects VALUES (1, 'bbb'), (2, 'aaa'), (3, 'leaf');
         INSERT INTO refs VALUES (1, 3), (1, 3), (2, 3), (2, 3), (3, 1);",
    )
    .unwrap();
    let dataset = Dataset::from_connection(conn).unwrap();
    generate_report(&dataset, &ReportOptions::default().with_threshold(threshold)).unwrap()
}

#[test]
fn test_html_page_layout() {
    let page = render::html(&report_with_threshold(2), Some("stats.sqlite3"));

    assert!(page.contains("<title>bup stats</title>"));
    assert!(page.contains("Database: stats.sqlite3"));
    // one parent with 1 node, two with 2
    assert!(page.contains("<td class=\"right\">1</td><td>trees with</td><td class=\"right\">1</td>"));
    assert!(page.contains("<td class=\"right\">2</td><td>trees with</td><td class=\"right\">2</td>"));

    let aaa = page.find("<td>aaa</td>").unwrap();
    let bbb = page.find("<td>bbb</td>").unwrap();
    assert!(aaa < bbb);
    assert!(!page.contains("<td>leaf</td>"));
}

#[test]
fn test_text_report() {
    let text = render::text(&report_with_threshold(2));

    assert!(text.starts_with("Tree sizes:\n"));
    assert!(text.contains("1 trees with        1 nodes\n"));
    assert!(text.contains("2 trees with        2 nodes\n"));
    assert!(text.contains("Nodes with at least 2 children:\naaa         2\nbbb         2\n"));
}

#[test]
fn test_json_matches_report() {
    let report = report_with_threshold(1);
    let json = render::render(&report, Format::Json, None).unwrap();

    let parsed: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn test_render_is_byte_identical() {
    for format in [Format::Html, Format::Text, Format::Json] {
        let first = render::render(&report_with_threshold(2), format, Some("db")).unwrap();
        let second = render::render(&report_with_threshold(2), format, Some("db")).unwrap();
        assert_eq!(first, second);
    }
}
