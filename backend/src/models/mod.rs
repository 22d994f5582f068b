//! Domain models for the FBref lessons pipeline.
//!
//! - [`Value`] - typed scalar held in a table cell
//! - [`Header`] / [`HeaderPair`] - column headers as they appear in the export
//! - [`LoadedTable`] - loader output, headers not yet normalized
//! - [`Table`] - flat, uniquely-named table every later stage works on
//! - [`Side`] - home/away perspective tag
//! - [`TeamSummary`] - one per-team row of a date-window summary

mod table;

pub use table::{RowView, Table};

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Cell values
// =============================================================================

/// Cell markers read as missing data.
pub const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A", "<NA>"];

/// A typed scalar.
///
/// Serializes untagged: `null`, a JSON number, a string, or an ISO-8601 date.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    /// Infer the narrowest type for a raw CSV cell.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if NULL_MARKERS.contains(&trimmed) {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        Value::Text(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view. Text holding a number with thousands separators
    /// (`"1,234"`) is accepted, FBref writes minutes that way.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.replace(',', "").trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => s.replace(',', "").trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Ordering used by [`Table::sort_by`]. Numbers compare numerically
    /// across Int/Float; mismatched kinds compare by their rendered text.
    /// Nulls are handled by the caller.
    pub(crate) fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map(Value::Float).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

// =============================================================================
// Headers
// =============================================================================

/// How many physical lines make up the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderRows {
    #[default]
    One,
    Two,
}

impl HeaderRows {
    pub fn count(self) -> usize {
        match self {
            HeaderRows::One => 1,
            HeaderRows::Two => 2,
        }
    }
}

impl TryFrom<u8> for HeaderRows {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(HeaderRows::One),
            2 => Ok(HeaderRows::Two),
            other => Err(format!("header rows must be 1 or 2, got {}", other)),
        }
    }
}

/// One column of a two-line header.
///
/// `upper == None` means the top cell carried no primary header (blank in
/// the export, or a pandas `Unnamed: N_level_0` placeholder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair {
    pub upper: Option<String>,
    pub lower: String,
}

impl HeaderPair {
    pub fn new(upper: Option<&str>, lower: &str) -> Self {
        Self {
            upper: upper.map(String::from),
            lower: lower.to_string(),
        }
    }
}

/// Column headers as read from the file, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    Flat(Vec<String>),
    TwoLevel(Vec<HeaderPair>),
}

impl Header {
    pub fn len(&self) -> usize {
        match self {
            Header::Flat(names) => names.len(),
            Header::TwoLevel(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable labels, used for logging and metadata.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Header::Flat(names) => names.clone(),
            Header::TwoLevel(pairs) => pairs
                .iter()
                .map(|p| match &p.upper {
                    Some(upper) => format!("{} / {}", upper, p.lower),
                    None => p.lower.clone(),
                })
                .collect(),
        }
    }
}

/// Loader output. Raw header names may repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub header: Header,
    pub rows: Vec<Vec<Value>>,
}

impl From<Table> for LoadedTable {
    fn from(table: Table) -> Self {
        let (columns, rows) = table.into_parts();
        Self {
            header: Header::Flat(columns),
            rows,
        }
    }
}

// =============================================================================
// Perspectives and summaries
// =============================================================================

/// Which side of a fixture a team-perspective row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

/// Per-team figures over a date window.
///
/// Means skip missing values; a mean over nothing is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team_name: String,
    pub games_played: usize,
    pub xg_for: Option<f64>,
    pub xg_against: Option<f64>,
    pub goals_for: Option<f64>,
    pub goals_against: Option<f64>,
    pub points_per_game: Option<f64>,
    pub xg_difference: Option<f64>,
}

impl TeamSummary {
    pub const COLUMNS: [&'static str; 8] = [
        "team_name",
        "games_played",
        "xg_for",
        "xg_against",
        "goals_for",
        "goals_against",
        "points_per_game",
        "xg_difference",
    ];

    fn to_row(&self) -> Vec<Value> {
        vec![
            Value::Text(self.team_name.clone()),
            Value::Int(self.games_played as i64),
            self.xg_for.into(),
            self.xg_against.into(),
            self.goals_for.into(),
            self.goals_against.into(),
            self.points_per_game.into(),
            self.xg_difference.into(),
        ]
    }

    /// Render summaries as a table, one row per team, in the given order.
    pub fn to_table(summaries: &[TeamSummary]) -> Table {
        let mut table = Table::new(Self::COLUMNS.iter().map(|c| c.to_string()).collect());
        for summary in summaries {
            table.push_row(summary.to_row());
        }
        table
    }
}
