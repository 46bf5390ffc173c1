//! Test utilities for curt.
//!
//! Provides ccusage table factories, payload factories, and assertion macros
//! shared between unit and integration tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use curt::test_utils::*;
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();
//! let table = make_wide_usage_table(date);
//! let parsed = curt::core::parse_usage_table(&table, date);
//! assert_eq!(parsed.record.total_tokens, fixture::TOTAL_TOKENS);
//! ```

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::parser::UsageRecord;
use crate::core::report::UsageReport;

// =============================================================================
// Canonical Fixture Values
// =============================================================================

/// Token counts and cost used by every table factory.
///
/// Tests that run the parser or the full pipeline over a factory table
/// assert against these.
pub mod fixture {
    pub const INPUT_TOKENS: u64 = 277;
    pub const OUTPUT_TOKENS: u64 = 1_650;
    pub const CACHE_CREATION_TOKENS: u64 = 12_500;
    pub const CACHE_READ_TOKENS: u64 = 175_000;
    /// Sum of the four token columns above.
    pub const TOTAL_TOKENS: u64 = 189_427;
    /// Input + output only; what a compact table's computed total comes to.
    pub const COMPACT_TOTAL_TOKENS: u64 = 1_927;
    pub const TOTAL_COST: f64 = 17.12;
    pub const MODELS: [&str; 2] = ["opus-4", "sonnet-4"];
}

// =============================================================================
// Table Factories
// =============================================================================

/// Column separator used in ccusage box tables.
pub const SEPARATOR: char = '\u{2502}';

/// Header row of a wide (8-column) daily table.
pub const WIDE_HEADER: &str = "\u{2502} Date \u{2502} Models \u{2502} Input \u{2502} Output \u{2502} Cache Create \u{2502} Cache Read \u{2502} Total Tokens \u{2502} Cost (USD) \u{2502}";

/// Header row of a compact (5-column) daily table.
pub const COMPACT_HEADER: &str =
    "\u{2502} Date \u{2502} Models \u{2502} Input \u{2502} Output \u{2502} Cost (USD) \u{2502}";

/// Join cells into one separator-delimited table row.
#[must_use]
pub fn table_row(cells: &[&str]) -> String {
    let mut line = String::from(SEPARATOR);
    for cell in cells {
        line.push(' ');
        line.push_str(cell);
        line.push(' ');
        line.push(SEPARATOR);
    }
    line
}

/// A horizontal border line built from box-drawing characters only.
#[must_use]
pub fn table_border() -> String {
    "\u{251c}\u{2500}\u{2500}\u{2500}\u{2500}\u{253c}\u{2500}\u{2500}\u{2500}\u{2500}\u{2524}"
        .to_string()
}

fn assemble(header: &str, rows: &[String]) -> String {
    let mut lines = vec![
        "\u{250c}\u{2500}\u{2500}\u{2500}\u{2500}\u{252c}\u{2500}\u{2500}\u{2500}\u{2500}\u{2510}"
            .to_string(),
        header.to_string(),
        table_border(),
    ];
    lines.extend_from_slice(rows);
    lines.push(
        "\u{2514}\u{2500}\u{2500}\u{2500}\u{2500}\u{2534}\u{2500}\u{2500}\u{2500}\u{2500}\u{2518}"
            .to_string(),
    );
    lines.join("\n")
}

/// A wide daily table with one usage row for `date` and a model subrow.
///
/// The row carries the values in [`fixture`]; the Models column lists
/// `opus-4` on the primary row and `sonnet-4` on a continuation row, so the
/// parser's model aggregation sees both.
#[must_use]
pub fn make_wide_usage_table(date: NaiveDate) -> String {
    let full_date = date.format("%Y-%m-%d").to_string();
    assemble(
        WIDE_HEADER,
        &[
            table_row(&[
                &full_date,
                "- opus-4",
                "277",
                "1,650",
                "12,500",
                "175,000",
                "189,427",
                "$17.12",
            ]),
            table_row(&["", "- sonnet-4", "", "", "", "", "", ""]),
        ],
    )
}

/// A compact daily table (no cache columns) for `date`.
#[must_use]
pub fn make_compact_usage_table(date: NaiveDate) -> String {
    let full_date = date.format("%Y-%m-%d").to_string();
    assemble(
        COMPACT_HEADER,
        &[
            table_row(&[&full_date, "- opus-4", "277", "1,650", "$17.12"]),
            table_row(&["", "- sonnet-4", "", "", ""]),
        ],
    )
}

/// A wide table whose date cell wraps onto a second physical row.
///
/// The year lands alone in the first row's date cell with all the data, and
/// the month-day follows on the continuation row next to the second model.
#[must_use]
pub fn make_split_date_usage_table(date: NaiveDate) -> String {
    let year = date.format("%Y").to_string();
    let month_day = date.format("%m-%d").to_string();
    assemble(
        WIDE_HEADER,
        &[
            table_row(&[
                &year, "- opus-4", "277", "1,650", "12,500", "175,000", "189,427", "$17.12",
            ]),
            table_row(&[&month_day, "- sonnet-4", "", "", "", "", "", ""]),
        ],
    )
}

/// A three-day wide table with `date` in the middle.
///
/// Neighboring days carry different values, so a test can tell a correct
/// date match from an off-by-one-row scan.
#[must_use]
pub fn make_multi_day_usage_table(date: NaiveDate) -> String {
    let before = date.pred_opt().expect("date has a predecessor");
    let after = date.succ_opt().expect("date has a successor");

    let day = |d: NaiveDate, cells: [&str; 7]| {
        let full_date = d.format("%Y-%m-%d").to_string();
        table_row(&[
            &full_date, cells[0], cells[1], cells[2], cells[3], cells[4], cells[5], cells[6],
        ])
    };

    let mut rows = vec![
        day(
            before,
            ["- opus-4", "50", "900", "2,000", "40,000", "42,950", "$4.05"],
        ),
        table_border(),
        day(
            date,
            [
                "- opus-4", "277", "1,650", "12,500", "175,000", "189,427", "$17.12",
            ],
        ),
        table_row(&["", "- sonnet-4", "", "", "", "", "", ""]),
        table_border(),
        day(
            after,
            ["- sonnet-4", "12", "300", "0", "8,000", "8,312", "$0.71"],
        ),
    ];

    // Real ccusage output ends with a Total row; the parser must never use
    // it as a substitute for a missing day.
    rows.push(table_border());
    rows.push(table_row(&[
        "Total", "", "339", "2,850", "14,500", "223,000", "240,689", "$21.88",
    ]));

    assemble(WIDE_HEADER, &rows)
}

// =============================================================================
// Payload Factories
// =============================================================================

/// A parsed usage record carrying the [`fixture`] values.
#[must_use]
pub fn make_test_record() -> UsageRecord {
    let mut models = BTreeMap::new();
    for model in fixture::MODELS {
        models.insert(model.to_string(), fixture::TOTAL_TOKENS);
    }

    UsageRecord {
        input_tokens: fixture::INPUT_TOKENS,
        output_tokens: fixture::OUTPUT_TOKENS,
        cache_creation_tokens: fixture::CACHE_CREATION_TOKENS,
        cache_read_tokens: fixture::CACHE_READ_TOKENS,
        total_tokens: fixture::TOTAL_TOKENS,
        total_cost: fixture::TOTAL_COST,
        models,
        found: true,
    }
}

/// A fully populated report, as the pipeline would build it from
/// [`make_test_record`].
#[must_use]
pub fn make_test_report() -> UsageReport {
    UsageReport::build(
        &make_test_record(),
        "jane",
        "integration test",
        "raw ccusage output",
    )
}

// =============================================================================
// Fake ccusage Binary
// =============================================================================

/// Write an executable `ccusage` stub into `dir` that prints `output`.
///
/// Prepend `dir` to `PATH` (or point `ccusage.command` at the returned path)
/// so a test pipeline runs the stub instead of the real CLI.
///
/// # Panics
///
/// Panics if the script cannot be written or made executable.
#[cfg(unix)]
pub fn write_fake_ccusage(dir: &Path, output: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ccusage");
    let script = format!("#!/bin/sh\ncat <<'CCUSAGE_EOF'\n{output}\nCCUSAGE_EOF\n");
    std::fs::write(&path, script).expect("Failed to write fake ccusage");

    let mut perms = std::fs::metadata(&path)
        .expect("Failed to stat fake ccusage")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("Failed to chmod fake ccusage");
    path
}

/// Write an executable `ccusage` stub that fails with `code` and `stderr`.
///
/// # Panics
///
/// Panics if the script cannot be written or made executable.
#[cfg(unix)]
pub fn write_failing_ccusage(dir: &Path, code: i32, stderr: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ccusage");
    let script = format!("#!/bin/sh\necho '{stderr}' >&2\nexit {code}\n");
    std::fs::write(&path, script).expect("Failed to write fake ccusage");

    let mut perms = std::fs::metadata(&path)
        .expect("Failed to stat fake ccusage")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("Failed to chmod fake ccusage");
    path
}

// =============================================================================
// Assertion Macros
// =============================================================================

/// Assert that a string contains a substring.
///
/// # Examples
///
/// ```rust,ignore
/// use curt::assert_contains;
///
/// let summary = "Total Tokens: 189,427";
/// assert_contains!(summary, "189,427");
/// ```
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
    ($haystack:expr, $needle:expr, $($arg:tt)*) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            $($arg)*
        );
    };
}

/// Assert that a string is valid JSON.
///
/// # Examples
///
/// ```rust,ignore
/// use curt::assert_json_valid;
///
/// let json = r#"{"totalTokens": 189427}"#;
/// assert_json_valid!(json);
/// ```
#[macro_export]
macro_rules! assert_json_valid {
    ($json:expr) => {
        let json = $json;
        match serde_json::from_str::<serde_json::Value>(json) {
            Ok(_) => {}
            Err(e) => {
                panic!(
                    "Expected valid JSON, but parsing failed: {}\n\nJSON string:\n{}",
                    e, json
                );
            }
        }
    };
}

// =============================================================================
// Tests for Test Utilities
// =============================================================================
