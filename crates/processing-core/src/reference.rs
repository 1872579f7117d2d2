//! Reference timelines: hand-annotated motion labels per second.
//!
//! A reference CSV has one timestamp column and any number of label columns.
//! A label is active in a row when its cell is `1`:
//!
//! ```text
//! timestamp,Advancing,Punching,Turning
//! 0:00,1,0,0
//! 0:01,0,1,1
//! ```
//!
//! The timestamp column is matched case-insensitively against
//! [`TIMESTAMP_COLUMNS`]. Activity logs written by `analyze` (`Time (s)`) are
//! valid reference input.

use std::collections::BTreeMap;

use motiontrace_common::clock::FrameClock;
use motiontrace_common::error::MotionError;

use crate::spans::{LabelSpan, SpanBuilder};

/// Accepted timestamp column names (case-insensitive).
pub const TIMESTAMP_COLUMNS: [&str; 5] = [
    "timestamp",
    "time",
    "time_stamp",
    "time_stamp_seconds",
    "time (s)",
];

/// Separator between labels of one reference row.
pub const REFERENCE_SEPARATOR: &str = " + ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference CSV is empty")]
    Empty,

    #[error("reference CSV must contain a timestamp column; found columns: {}", .found.join(", "))]
    MissingTimestampColumn { found: Vec<String> },

    #[error("row {row}: unsupported timestamp format: {value:?}")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: expected {expected} cells, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl From<ReferenceError> for MotionError {
    fn from(err: ReferenceError) -> Self {
        MotionError::reference(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReferenceRow {
    second: u64,
    /// Indices into `ReferenceTimeline::labels`.
    active: Vec<usize>,
}

/// Parsed reference annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTimeline {
    labels: Vec<String>,
    rows: Vec<ReferenceRow>,
    /// First row for each second.
    by_second: BTreeMap<u64, usize>,
}

/// Convert a reference timestamp to whole seconds.
///
/// Accepts `M:SS` (or `MM:SS`), `H:MM:SS`, and plain seconds. The seconds
/// part may be fractional and is truncated.
pub fn parse_timestamp(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.contains(':') {
        let mut parts: Vec<&str> = value.split(':').map(str::trim).collect();
        let secs = parse_seconds(parts.pop()?)?;
        let units = parts
            .iter()
            .map(|p| p.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        return match units.as_slice() {
            [m] => Some(m * 60 + secs),
            [h, m] => Some(h * 3600 + m * 60 + secs),
            _ => None,
        };
    }

    parse_seconds(value)
}

/// Non-negative decimal seconds, truncated to whole seconds.
fn parse_seconds(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    value.parse::<f64>().ok().map(|secs| secs.trunc() as u64)
}

/// Split one CSV record. Commas inside `"..."` stay in the cell and `""`
/// inside quotes is a literal quote. Records spanning lines are not supported.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

fn is_active(cell: &str) -> bool {
    cell.parse::<f64>().is_ok_and(|v| v == 1.0)
}

impl ReferenceTimeline {
    pub fn parse(csv: &str) -> Result<Self, ReferenceError> {
        let mut lines = csv
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(ReferenceError::Empty)?;
        let columns = split_row(header.trim_start_matches('\u{feff}'));
        let time_col = columns
            .iter()
            .position(|c| {
                TIMESTAMP_COLUMNS
                    .iter()
                    .any(|name| c.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| ReferenceError::MissingTimestampColumn {
                found: columns.clone(),
            })?;

        let labels: Vec<String> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != time_col)
            .map(|(_, c)| c.clone())
            .collect();

        let mut rows = Vec::new();
        let mut by_second = BTreeMap::new();
        for (i, line) in lines {
            let row_no = i + 1;
            let cells = split_row(line);
            if cells.len() != columns.len() {
                return Err(ReferenceError::RaggedRow {
                    row: row_no,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }

            let raw = cells[time_col].as_str();
            let second = parse_timestamp(raw).ok_or_else(|| ReferenceError::BadTimestamp {
                row: row_no,
                value: raw.to_string(),
            })?;

            let active = cells
                .iter()
                .enumerate()
                .filter(|(col, _)| *col != time_col)
                .map(|(_, cell)| cell)
                .enumerate()
                .filter(|(_, cell)| is_active(cell))
                .map(|(label, _)| label)
                .collect();

            by_second.entry(second).or_insert(rows.len());
            rows.push(ReferenceRow { second, active });
        }

        Ok(Self {
            labels,
            rows,
            by_second,
        })
    }

    /// Label column names in header order.
    pub fn label_names(&self) -> &[String] {
        &self.labels
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Last annotated second, if any.
    pub fn last_second(&self) -> Option<u64> {
        self.by_second.keys().next_back().copied()
    }

    /// Active labels of the first row at `second`.
    pub fn labels_at(&self, second: u64) -> Vec<&str> {
        self.by_second
            .get(&second)
            .map(|&idx| {
                self.rows[idx]
                    .active
                    .iter()
                    .map(|&label| self.labels[label].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Display text for `second`, or `None` when nothing is active.
    pub fn text_at(&self, second: u64) -> Option<String> {
        let labels = self.labels_at(second);
        if labels.is_empty() {
            None
        } else {
            Some(labels.join(REFERENCE_SEPARATOR))
        }
    }

    /// Display spans over the first `total_frames` frames of a video.
    pub fn label_spans(&self, total_frames: u64, clock: &FrameClock) -> Vec<LabelSpan> {
        let mut builder = SpanBuilder::new();
        let mut current: Option<(u64, Option<String>)> = None;
        for frame in 0..total_frames {
            let second = clock.second_index(frame);
            if current.as_ref().map(|(s, _)| *s) != Some(second) {
                current = Some((second, self.text_at(second)));
            }
            let text = current.as_ref().and_then(|(_, t)| t.as_deref());
            builder.push(frame, text);
        }
        builder.finish()
    }
}
