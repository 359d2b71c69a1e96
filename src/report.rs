//! Rows of text built from the selected columns.
//!
//! A report is a time row followed by one row per counter. Each row holds one
//! fixed-width cell per column, oldest column first, so rows line up when
//! printed one per line with the counter name at the end.

use std::collections::HashSet;

use chrono::Local;

use crate::config::{FieldConfig, Placement};
use crate::format::{ago_str, ValueFormat};
use crate::sample::Sample;

/// Width taken by the freeze/hide flag on the edit page.
pub const EDIT_MARKER_WIDTH: usize = 4;

const WALL_CLOCK_FORMAT: &str = "%m/%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<String>,
    /// Never non-zero since start and zero in every column shown.
    pub zero: bool,
}

impl Row {
    /// Cells joined by single spaces.
    pub fn text(&self) -> String {
        self.cells.join(" ")
    }

    /// `"<cells> <key>"`, the normal page layout.
    pub fn line(&self) -> String {
        format!("{} {}", self.text(), self.key)
    }
}

/// Lines of the normal page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportLines {
    /// Frozen rows, shown above the line.
    pub header: Vec<String>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub time: Row,
    pub rows: Vec<Row>,
}

impl Report {
    /// Split rows by placement, dropping hidden rows and (unless
    /// `show_zeros`) all-zero rows. Frozen rows are kept even when zero.
    pub fn lines(&self, config: &FieldConfig, show_zeros: bool) -> ReportLines {
        let mut lines = ReportLines::default();
        for row in &self.rows {
            match config.placement(&row.key) {
                Placement::Frozen => lines.header.push(row.line()),
                Placement::Hidden => {}
                Placement::Body if row.zero && !show_zeros => {}
                Placement::Body => lines.body.push(row.line()),
            }
        }
        lines
    }

    /// Every row with its placement flag, for the edit page.
    pub fn edit_lines(&self, config: &FieldConfig) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                let flag = match config.placement(&row.key) {
                    Placement::Frozen => "***",
                    Placement::Hidden => "---",
                    Placement::Body => "   ",
                };
                format!("{} {} {}", row.text(), flag, row.key)
            })
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.key.as_str())
    }

    pub fn row(&self, key: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// Builds reports and remembers which counters have ever been non-zero.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    non_zeros: HashSet<String>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ever_non_zero(&self, key: &str) -> bool {
        self.non_zeros.contains(key)
    }

    /// Build a report from `columns`, oldest first with the live sample last.
    ///
    /// With `deltas`, every historical cell shows the change to the next
    /// newer column; the live column always shows absolute values.
    pub fn build(&mut self, columns: &[&Sample], format: &ValueFormat, deltas: bool) -> Report {
        let time = Row {
            key: String::new(),
            cells: columns
                .iter()
                .enumerate()
                .map(|(i, sample)| {
                    let ago = ago_str(sample.time_key as i64, false);
                    let mut cell = format!("{:>w$}", ago, w = format.width);
                    if i + 1 == columns.len() {
                        let wall = sample.wall_clock.unwrap_or_else(Local::now);
                        cell.push(' ');
                        cell.push_str(&wall.format(WALL_CLOCK_FORMAT).to_string());
                    }
                    cell
                })
                .collect(),
            zero: false,
        };

        let mut keys: Vec<&str> = Vec::new();
        for sample in columns {
            for name in sample.field_names() {
                if !keys.contains(&name) {
                    keys.push(name);
                }
            }
        }

        let rows = keys
            .into_iter()
            .map(|key| self.field_row(key, columns, format, deltas))
            .collect();
        Report { time, rows }
    }

    fn field_row(&mut self, key: &str, columns: &[&Sample], format: &ValueFormat, deltas: bool) -> Row {
        let blank = " ".repeat(format.width);
        let cells = columns
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let Some(value) = sample.get(key) else {
                    return blank.clone();
                };
                let newer = columns.get(i + 1).and_then(|s| s.get(key));
                match newer {
                    Some(next) if deltas => format.render(next as i64 - value as i64, true),
                    _ => format.render(value as i64, false),
                }
            })
            .collect();

        let zero = if self.non_zeros.contains(key) {
            false
        } else {
            columns.iter().filter_map(|s| s.get(key)).max().unwrap_or(0) == 0
        };
        if !zero {
            self.non_zeros.insert(key.to_string());
        }
        Row {
            key: key.to_string(),
            cells,
            zero,
        }
    }
}
