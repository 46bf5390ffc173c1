//! ccusage daily table parsing.
//!
//! Extracts one day's usage from the box-drawing table that `ccusage` prints,
//! across the renderings the tool produces: the wide 8-column layout, the
//! narrow 5-column layout without cache columns, dates split across two
//! physical lines, and output with or without ANSI color codes.
//!
//! Parsing is a pure function of the captured text and the target date. It
//! performs no I/O and reads no ambient state, and it returns a trace of its
//! match decisions alongside the record so callers can log or surface them.
//!
//! The scan is first-match-wins: the first data row whose date column matches
//! the target date supplies the numbers, then immediately following rows are
//! only consulted for additional model names.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column separator used by ccusage tables (BOX DRAWINGS LIGHT VERTICAL).
const SEPARATOR: char = '\u{2502}';

// =============================================================================
// Output Types
// =============================================================================

/// One day's usage extracted from a ccusage table.
///
/// When `found` is `false` every numeric field is zero and the record means
/// "no usage data for that day", not "zero usage". Serialized field names
/// match the webhook payload contract, which is why the cache fields carry
/// explicit renames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(rename = "cacheCreationInputTokens")]
    pub cache_creation_tokens: u64,
    #[serde(rename = "cacheReadInputTokens")]
    pub cache_read_tokens: u64,
    /// Read from the Total column in the wide layout; computed as
    /// input + output in the compact layout, which has no such column.
    pub total_tokens: u64,
    pub total_cost: f64,
    /// Model name to token count. Every model listed for the day is credited
    /// the day's total because the table gives no per-model split; treat the
    /// values as approximate.
    pub models: BTreeMap<String, u64>,
    /// Whether a row matching the target date was located.
    pub found: bool,
}

/// Result of one parse call: the record plus diagnostics.
#[derive(Debug, Clone)]
pub struct ParsedUsage {
    pub record: UsageRecord,
    /// Match decisions in scan order, for logging.
    pub trace: Vec<TraceEvent>,
    /// Human-readable explanation when no row matched.
    pub message: Option<String>,
}

/// Row layout, detected from the populated column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLayout {
    /// date, models, input, output, cache create, cache read, total, cost.
    Wide,
    /// date, models, input, output, cost.
    Compact,
}

impl TableLayout {
    /// Identify a layout from its populated column count.
    fn from_column_count(count: usize) -> Option<Self> {
        match count {
            8 => Some(Self::Wide),
            5 => Some(Self::Compact),
            _ => None,
        }
    }
}

impl fmt::Display for TableLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wide => write!(f, "wide"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// A decision made while scanning, with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The row that supplied the day's numbers.
    PrimaryRow {
        line: usize,
        layout: TableLayout,
        split_date: bool,
    },
    /// A row matched the date but its column count fit no known layout.
    UnrecognizedRow { line: usize, columns: usize },
    /// A model name was credited to the day.
    ModelRecorded { line: usize, model: String },
    /// Model aggregation ended.
    AggregationStopped { line: usize, reason: StopReason },
    /// The whole input was scanned without a date match.
    NoMatch { lines_scanned: usize },
}

/// Why model aggregation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A border line ended the day's section.
    SectionSeparator,
    /// A row for a different date began.
    DifferentDate,
    /// The input ran out.
    EndOfInput,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryRow {
                line,
                layout,
                split_date,
            } => {
                if *split_date {
                    write!(f, "line {line}: matched {layout} row (split date)")
                } else {
                    write!(f, "line {line}: matched {layout} row")
                }
            }
            Self::UnrecognizedRow { line, columns } => {
                write!(f, "line {line}: date matched but {columns} columns fit no layout")
            }
            Self::ModelRecorded { line, model } => {
                write!(f, "line {line}: recorded model '{model}'")
            }
            Self::AggregationStopped { line, reason } => {
                let reason = match reason {
                    StopReason::SectionSeparator => "section separator",
                    StopReason::DifferentDate => "different date",
                    StopReason::EndOfInput => "end of input",
                };
                write!(f, "line {line}: stopped model scan ({reason})")
            }
            Self::NoMatch { lines_scanned } => {
                write!(f, "no matching date row in {lines_scanned} lines")
            }
        }
    }
}

// =============================================================================
// Date Keys
// =============================================================================

/// The strings a target date can render as inside the table.
///
/// ccusage prints either the full `YYYY-MM-DD` in one cell, or (in narrow
/// terminals) the year alone with `MM-DD` wrapped onto the next physical
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeys {
    pub full_date: String,
    pub month_day: String,
    pub year: String,
}

impl DateKeys {
    /// Derive keys for a calendar date.
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            full_date: date.format("%Y-%m-%d").to_string(),
            month_day: date.format("%m-%d").to_string(),
            year: date.format("%Y").to_string(),
        }
    }

    /// Keys for the caller's local calendar date.
    ///
    /// Local, not UTC: a run just after local midnight must match "today" in
    /// the operator's timezone.
    #[must_use]
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a captured ccusage table for the caller's local calendar date.
#[must_use]
pub fn parse_usage_table_today(raw: &str) -> ParsedUsage {
    parse_usage_table(raw, Local::now().date_naive())
}

/// Parse a captured ccusage table for the given date.
///
/// Never fails: malformed numeric cells degrade to zero, unrecognizable rows
/// are skipped, and a missing date yields `found = false` with a message
/// naming the date. The same input always produces the same record.
#[must_use]
pub fn parse_usage_table(raw: &str, reference_date: NaiveDate) -> ParsedUsage {
    let keys = DateKeys::for_date(reference_date);
    let text = strip_ansi(raw);
    let lines: Vec<&str> = text.lines().collect();

    let mut trace = Vec::new();

    let Some(primary) = find_primary_row(&lines, &keys, &mut trace) else {
        trace.push(TraceEvent::NoMatch {
            lines_scanned: lines.len(),
        });
        return ParsedUsage {
            record: UsageRecord::default(),
            trace,
            message: Some(format!("No usage data found for {}", keys.full_date)),
        };
    };

    let mut record = extract_record(&primary.cells, primary.layout);
    trace.push(TraceEvent::PrimaryRow {
        line: primary.line + 1,
        layout: primary.layout,
        split_date: primary.split_date,
    });

    // The primary row's model column may itself carry the first bullet.
    if let Some(model) = primary.cells.get(1).copied().and_then(bullet_model) {
        record.models.insert(model.to_string(), record.total_tokens);
        trace.push(TraceEvent::ModelRecorded {
            line: primary.line + 1,
            model: model.to_string(),
        });
    }

    collect_model_rows(&lines, primary.resume_at, &keys, &mut record, &mut trace);

    ParsedUsage {
        record,
        trace,
        message: None,
    }
}

/// Strip ANSI escape sequences, leaving all other characters untouched.
///
/// Walks the text and drops `ESC [ ... <letter>` sequences; a stray ESC
/// without a following `[` is dropped on its own.
#[must_use]
pub fn strip_ansi(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

// =============================================================================
// Line Classification
// =============================================================================

enum Line<'a> {
    Blank,
    /// Composed solely of box-drawing characters and whitespace.
    Border,
    /// The column header row.
    Header,
    /// A candidate row: trimmed, non-empty cells between separators.
    Data(Vec<&'a str>),
    /// No column separator at all; not part of the table.
    Other,
}

fn classify_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if trimmed.chars().all(|c| is_box_drawing(c) || c.is_whitespace()) {
        return Line::Border;
    }
    if !trimmed.contains(SEPARATOR) {
        return Line::Other;
    }

    let cells = split_cells(trimmed);
    match cells.first() {
        None => Line::Other,
        Some(&"Date") => Line::Header,
        Some(_) => Line::Data(cells),
    }
}

const fn is_box_drawing(c: char) -> bool {
    matches!(c, '\u{2500}'..='\u{257F}')
}

fn split_cells(line: &str) -> Vec<&str> {
    line.split(SEPARATOR)
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// A cell that is only digits and dashes, e.g. `2025-08-29`, `08-29`, `2025`.
fn is_date_fragment(cell: &str) -> bool {
    cell.chars().any(|c| c.is_ascii_digit())
        && cell.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Extract the model name from a bullet cell (`- opus-4` -> `opus-4`).
fn bullet_model(cell: &str) -> Option<&str> {
    let rest = cell.strip_prefix("- ")?.trim();
    (!rest.is_empty()).then_some(rest)
}

// =============================================================================
// Row Matching
// =============================================================================

struct PrimaryRow<'a> {
    /// 0-based line index of the row the numbers came from.
    line: usize,
    layout: TableLayout,
    split_date: bool,
    cells: Vec<&'a str>,
    /// Line index where model aggregation resumes.
    resume_at: usize,
}

/// Scan top to bottom for the first row matching the date keys.
fn find_primary_row<'a>(
    lines: &[&'a str],
    keys: &DateKeys,
    trace: &mut Vec<TraceEvent>,
) -> Option<PrimaryRow<'a>> {
    for (i, line) in lines.iter().enumerate() {
        let Line::Data(cells) = classify_line(line) else {
            continue;
        };
        let first = cells[0];

        // Single-line rendering: the date cell carries the full date.
        if first.contains(&keys.full_date) {
            match TableLayout::from_column_count(cells.len()) {
                Some(layout) => {
                    return Some(PrimaryRow {
                        line: i,
                        layout,
                        split_date: false,
                        cells,
                        resume_at: i + 1,
                    });
                }
                None => {
                    trace.push(TraceEvent::UnrecognizedRow {
                        line: i + 1,
                        columns: cells.len(),
                    });
                    continue;
                }
            }
        }

        // Split rendering: the year alone in the date cell, with MM-DD
        // wrapped onto a following line. The year must stand alone; a cell
        // holding some other day's full date also contains the year and must
        // not pair with an unrelated MM-DD below it.
        if first == keys.year {
            if let Some(row) = match_split_pair(lines, i, cells, keys, trace) {
                return Some(row);
            }
        }
    }

    None
}

/// Try to confirm a year-only row against the next non-blank line.
fn match_split_pair<'a>(
    lines: &[&'a str],
    year_line: usize,
    year_cells: Vec<&'a str>,
    keys: &DateKeys,
    trace: &mut Vec<TraceEvent>,
) -> Option<PrimaryRow<'a>> {
    let mut j = year_line + 1;
    while j < lines.len() && matches!(classify_line(lines[j]), Line::Blank) {
        j += 1;
    }
    let Line::Data(next_cells) = classify_line(lines.get(j)?) else {
        return None;
    };
    if !next_cells[0].contains(&keys.month_day) {
        return None;
    }

    // Numbers live on whichever of the pair has a full complement of
    // columns; aggregation resumes at (or after) the confirming row so a
    // bullet there is still collected.
    if let Some(layout) = TableLayout::from_column_count(year_cells.len()) {
        return Some(PrimaryRow {
            line: year_line,
            layout,
            split_date: true,
            cells: year_cells,
            resume_at: j,
        });
    }
    if let Some(layout) = TableLayout::from_column_count(next_cells.len()) {
        return Some(PrimaryRow {
            line: j,
            layout,
            split_date: true,
            cells: next_cells,
            resume_at: j + 1,
        });
    }

    trace.push(TraceEvent::UnrecognizedRow {
        line: year_line + 1,
        columns: year_cells.len(),
    });
    None
}

// =============================================================================
// Extraction
// =============================================================================

fn extract_record(cells: &[&str], layout: TableLayout) -> UsageRecord {
    let mut record = UsageRecord {
        found: true,
        ..UsageRecord::default()
    };

    match layout {
        TableLayout::Wide => {
            record.input_tokens = parse_count(cells[2]);
            record.output_tokens = parse_count(cells[3]);
            record.cache_creation_tokens = parse_count(cells[4]);
            record.cache_read_tokens = parse_count(cells[5]);
            record.total_tokens = parse_count(cells[6]);
            record.total_cost = parse_cost(cells[7]);
        }
        TableLayout::Compact => {
            record.input_tokens = parse_count(cells[2]);
            record.output_tokens = parse_count(cells[3]);
            record.total_cost = parse_cost(cells[4]);
            // Saturate: a corrupt cell near u64::MAX must not panic the parse.
            record.total_tokens = record.input_tokens.saturating_add(record.output_tokens);
        }
    }

    record
}

/// Parse an integer cell, tolerating thousands separators and currency
/// symbols. Anything unparseable degrades to zero.
fn parse_count(cell: &str) -> u64 {
    normalize_numeric(cell).parse().unwrap_or(0)
}

/// Parse the cost cell. Unparseable or negative values degrade to zero.
fn parse_cost(cell: &str) -> f64 {
    normalize_numeric(cell)
        .parse::<f64>()
        .map_or(0.0, |v| v.max(0.0))
}

fn normalize_numeric(cell: &str) -> String {
    cell.chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect::<String>()
        .trim()
        .to_string()
}

// =============================================================================
// Model Aggregation
// =============================================================================

/// Collect bullet model names from rows following the primary match.
///
/// A continuation row is accepted when it carries a bullet model cell and its
/// date cell is either absent (blank cells are dropped during splitting, so
/// the bullet lands first) or repeats the matched day. Scanning stops at a
/// border, at a row for a different date, or at end of input; anything else
/// is skipped.
fn collect_model_rows(
    lines: &[&str],
    start: usize,
    keys: &DateKeys,
    record: &mut UsageRecord,
    trace: &mut Vec<TraceEvent>,
) {
    for j in start..lines.len() {
        let cells = match classify_line(lines[j]) {
            Line::Border => {
                trace.push(TraceEvent::AggregationStopped {
                    line: j + 1,
                    reason: StopReason::SectionSeparator,
                });
                return;
            }
            Line::Data(cells) => cells,
            Line::Blank | Line::Header | Line::Other => continue,
        };

        let first = cells[0];
        let same_date = first == keys.month_day || first == keys.full_date;
        if is_date_fragment(first) && !same_date {
            trace.push(TraceEvent::AggregationStopped {
                line: j + 1,
                reason: StopReason::DifferentDate,
            });
            return;
        }

        let model_cell = if bullet_model(first).is_some() {
            Some(first)
        } else if same_date {
            cells.get(1).copied()
        } else {
            None
        };

        if let Some(model) = model_cell.and_then(bullet_model) {
            record.models.insert(model.to_string(), record.total_tokens);
            trace.push(TraceEvent::ModelRecorded {
                line: j + 1,
                model: model.to_string(),
            });
        }
    }

    trace.push(TraceEvent::AggregationStopped {
        line: lines.len(),
        reason: StopReason::EndOfInput,
    });
}

// =============================================================================
// Tests
// =============================================================================
