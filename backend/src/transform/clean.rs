//! Row cleaning for fixture tables.
//!
//! - drops fixtures that have not been played yet (no score)
//! - splits `"3–0"` into `home_score` / `away_score`
//! - parses the text date into a calendar date
//!
//! Rows whose score or date cannot be parsed are excluded and reported as
//! [`RowIssue`]s; the rest of the batch is kept.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::FBREF_DATE_FORMAT;
use crate::error::SchemaResult;
use crate::models::{Table, Value};

/// `<int>–<int>` with an en dash or a hyphen.
static SCORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*[–-]\s*(\d+)\s*$").expect("score pattern is valid"));

/// A row excluded by [`clean`], with context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    /// 0-based data row index in the input table
    pub row: usize,
    pub column: String,
    pub value: String,
    pub reason: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Row {}, column '{}' (value '{}'): {}",
            self.row, self.column, self.value, self.reason
        )
    }
}

/// Column names and date pattern used by [`clean`].
#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub score_column: String,
    pub date_column: String,
    pub date_format: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            score_column: "score".to_string(),
            date_column: "date".to_string(),
            date_format: FBREF_DATE_FORMAT.to_string(),
        }
    }
}

/// Output of [`clean`].
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub table: Table,
    /// Rows dropped because the fixture has no score yet
    pub unplayed: usize,
    pub rejected: Vec<RowIssue>,
}

/// Split a score into `(home, away)`.
pub fn split_score(raw: &str) -> Result<(i64, i64), String> {
    let caps = SCORE_RE
        .captures(raw)
        .ok_or_else(|| "expected '<home>–<away>'".to_string())?;
    let home = caps[1].parse::<i64>().map_err(|e| e.to_string())?;
    let away = caps[2].parse::<i64>().map_err(|e| e.to_string())?;
    Ok((home, away))
}

/// Parse a date with a strftime-style pattern.
///
/// `%Y` means a 4-digit year here: chrono alone reads `"21/04/23"` as
/// year 23.
pub fn parse_date(raw: &str, format: &str) -> Result<NaiveDate, String> {
    let date = NaiveDate::parse_from_str(raw.trim(), format)
        .map_err(|e| format!("expected date like '{}': {}", format, e))?;
    if format.contains("%Y") && !(1000..=9999).contains(&date.year()) {
        return Err(format!("expected a 4-digit year (pattern '{}')", format));
    }
    Ok(date)
}

/// Drop unplayed fixtures, split scores and parse dates.
///
/// The score column is replaced by `home_score` and `away_score` appended at
/// the end; the date column keeps its position.
pub fn clean(table: &Table, options: &CleanOptions) -> SchemaResult<CleanOutcome> {
    let score_idx = table.column_index(&options.score_column)?;
    let date_idx = table.column_index(&options.date_column)?;

    let mut columns: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| **c != options.score_column)
        .cloned()
        .collect();
    columns.push("home_score".to_string());
    columns.push("away_score".to_string());

    let mut rows = Vec::with_capacity(table.len());
    let mut unplayed = 0;
    let mut rejected = Vec::new();

    for (i, row) in table.rows().iter().enumerate() {
        let score = &row[score_idx];
        if score.is_null() {
            unplayed += 1;
            continue;
        }

        let score_text = score.to_string();
        let (home, away) = match split_score(&score_text) {
            Ok(pair) => pair,
            Err(reason) => {
                rejected.push(RowIssue {
                    row: i,
                    column: options.score_column.clone(),
                    value: score_text,
                    reason,
                });
                continue;
            }
        };

        let date_value = &row[date_idx];
        let date = match date_value {
            Value::Date(d) => *d,
            other => {
                let text = other.to_string();
                match parse_date(&text, &options.date_format) {
                    Ok(d) => d,
                    Err(reason) => {
                        rejected.push(RowIssue {
                            row: i,
                            column: options.date_column.clone(),
                            value: text,
                            reason,
                        });
                        continue;
                    }
                }
            }
        };

        let mut out: Vec<Value> = Vec::with_capacity(columns.len());
        for (j, v) in row.iter().enumerate() {
            if j == score_idx {
                continue;
            }
            out.push(if j == date_idx { Value::Date(date) } else { v.clone() });
        }
        out.push(Value::Int(home));
        out.push(Value::Int(away));
        rows.push(out);
    }

    Ok(CleanOutcome {
        table: Table::from_rows(columns, rows)?,
        unplayed,
        rejected,
    })
}

/// Fixtures played strictly after `date`.
pub fn played_after(table: &Table, date: NaiveDate) -> SchemaResult<Table> {
    table.column_index("date")?;
    Ok(table.filter(|row| {
        row.get("date")
            .and_then(Value::as_date)
            .is_some_and(|d| d > date)
    }))
}
