//! Column name normalization.
//!
//! Turns a [`LoadedTable`] into a flat [`Table`] with snake_case names:
//!
//! ```text
//! ("Playing Time", "Min")   →  playing_time_min
//! (<none>, "Player")        →  player
//! "xG", "xG" + rename map   →  home_xg, away_xg
//! ```

use std::collections::BTreeSet;

use crate::error::{SchemaError, SchemaResult};
use crate::models::{Header, HeaderPair, LoadedTable, Table};

/// Positional renames for raw header names, applied before snake-casing.
///
/// Each entry maps a raw name to the names its 1st, 2nd, ... occurrences
/// take. The raw name must occur at least once per target; extra
/// occurrences keep their raw name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnRenames(Vec<(String, Vec<String>)>);

impl ColumnRenames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename a raw name by occurrence.
    pub fn positional(mut self, raw: &str, names: &[&str]) -> Self {
        self.0
            .push((raw.to_string(), names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn apply(&self, raw: &[String]) -> SchemaResult<Vec<String>> {
        let mut names = raw.to_vec();
        for (from, targets) in &self.0 {
            let positions: Vec<usize> = raw
                .iter()
                .enumerate()
                .filter(|(_, name)| *name == from)
                .map(|(i, _)| i)
                .collect();
            if positions.is_empty() {
                return Err(SchemaError::ColumnNotFound {
                    column: from.clone(),
                    available: raw.to_vec(),
                });
            }
            if positions.len() < targets.len() {
                return Err(SchemaError::RenameCount {
                    column: from.clone(),
                    expected: targets.len(),
                    found: positions.len(),
                });
            }
            for (pos, target) in positions.into_iter().zip(targets) {
                names[pos] = target.clone();
            }
        }
        Ok(names)
    }
}

/// What [`normalize`] renames and drops.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    /// Normalized names to remove. Each must exist.
    pub junk_columns: BTreeSet<String>,
    pub renames: ColumnRenames,
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn junk<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.junk_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn renames(mut self, renames: ColumnRenames) -> Self {
        self.renames = renames;
        self
    }

    /// FBref "Scores & Fixtures" export: two `xG` columns, home first.
    pub fn fixtures() -> Self {
        Self::new()
            .renames(ColumnRenames::new().positional("xG", &["home_xg", "away_xg"]))
            .junk(["match_report", "notes"])
    }

    /// FBref squad "Standard Stats" export with a two-line header.
    pub fn player_season() -> Self {
        Self::new().junk(["rk", "matches", "#name?_-9999"])
    }
}

/// Lowercase and replace each whitespace run with one underscore.
pub fn snake_case(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Flat name for a two-level header column.
pub fn collapse_pair(pair: &HeaderPair) -> String {
    match &pair.upper {
        Some(upper) => snake_case(&format!("{} {}", upper, pair.lower)),
        None => snake_case(&pair.lower),
    }
}

/// Flatten, rename and clean column names, then drop junk columns.
pub fn normalize(table: &LoadedTable, options: &NormalizeOptions) -> SchemaResult<Table> {
    let names: Vec<String> = match &table.header {
        Header::Flat(raw) => options
            .renames
            .apply(raw)?
            .iter()
            .map(|n| snake_case(n))
            .collect(),
        Header::TwoLevel(pairs) => {
            if !options.renames.is_empty() {
                let flat: Vec<String> = pairs.iter().map(collapse_pair).collect();
                options.renames.apply(&flat)?
            } else {
                pairs.iter().map(collapse_pair).collect()
            }
        }
    };

    let flat = Table::from_rows(names, table.rows.clone())?;
    if options.junk_columns.is_empty() {
        return Ok(flat);
    }
    let junk: Vec<&str> = options.junk_columns.iter().map(String::as_str).collect();
    flat.drop_columns(&junk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn fixtures_raw() -> LoadedTable {
        LoadedTable {
            header: Header::Flat(
                ["Wk", "Date", "Home", "xG", "Score", "xG", "Away", "Venue", "Match Report", "Notes"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            rows: vec![vec![
                Value::Int(1),
                Value::from("05/08/2022"),
                Value::from("Crystal Palace"),
                Value::Float(1.2),
                Value::from("0–2"),
                Value::Float(1.0),
                Value::from("Arsenal"),
                Value::from("Selhurst Park"),
                Value::from("Match Report"),
                Value::Null,
            ]],
        }
    }

    #[test]
    fn test_snake_case_collapses_whitespace() {
        assert_eq!(snake_case("Match Report"), "match_report");
        assert_eq!(snake_case("  Playing   Time\tMin "), "playing_time_min");
        assert_eq!(snake_case("G+A"), "g+a");
    }

    #[test]
    fn test_collapse_pair() {
        assert_eq!(collapse_pair(&HeaderPair::new(Some("Performance"), "G+A")), "performance_g+a");
        assert_eq!(collapse_pair(&HeaderPair::new(None, "Player")), "player");
    }

    #[test]
    fn test_fixtures_preset() {
        let table = normalize(&fixtures_raw(), &NormalizeOptions::fixtures()).unwrap();
        assert_eq!(
            table.columns(),
            &["wk", "date", "home", "home_xg", "score", "away_xg", "away", "venue"]
        );
        assert_eq!(table.value(0, "home_xg"), Some(&Value::Float(1.2)));
        assert_eq!(table.value(0, "away_xg"), Some(&Value::Float(1.0)));
    }

    #[test]
    fn test_duplicate_without_rename_is_fatal() {
        let options = NormalizeOptions::new().junk(["match_report", "notes"]);
        let err = normalize(&fixtures_raw(), &options).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("xg".into()));
    }

    #[test]
    fn test_missing_junk_column_is_fatal() {
        let options = NormalizeOptions::fixtures().junk(["attendance"]);
        let err = normalize(&fixtures_raw(), &options).unwrap_err();
        assert!(matches!(err, SchemaError::ColumnNotFound { ref column, .. } if column == "attendance"));
    }

    #[test]
    fn test_rename_of_absent_column_is_fatal() {
        let options = NormalizeOptions::new().renames(ColumnRenames::new().positional("xGA", &["xga"]));
        let err = normalize(&fixtures_raw(), &options).unwrap_err();
        assert!(matches!(err, SchemaError::ColumnNotFound { ref column, .. } if column == "xGA"));
    }

    #[test]
    fn test_rename_needs_every_occurrence() {
        let mut raw = fixtures_raw();
        if let Header::Flat(names) = &mut raw.header {
            names[5] = "xGA".to_string();
        }
        let err = normalize(&raw, &NormalizeOptions::fixtures()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::RenameCount {
                column: "xG".into(),
                expected: 2,
                found: 1
            }
        );
        assert!(err.to_string().contains("'xG'"));
    }

    #[test]
    fn test_two_level_player_header() {
        let raw = LoadedTable {
            header: Header::TwoLevel(vec![
                HeaderPair::new(None, "Rk"),
                HeaderPair::new(None, "Player"),
                HeaderPair::new(Some("Playing Time"), "Min"),
                HeaderPair::new(Some("Performance"), "G+A"),
                HeaderPair::new(None, "Matches"),
                HeaderPair::new(Some("#NAME?"), "-9999"),
            ]),
            rows: vec![vec![
                Value::Int(1),
                Value::from("Bukayo Saka"),
                Value::from("2,845"),
                Value::Int(25),
                Value::from("Matches"),
                Value::Null,
            ]],
        };

        let table = normalize(&raw, &NormalizeOptions::player_season()).unwrap();
        assert_eq!(table.columns(), &["player", "playing_time_min", "performance_g+a"]);
    }

    #[test]
    fn test_idempotent_on_flat_form() {
        let once = normalize(&fixtures_raw(), &NormalizeOptions::fixtures()).unwrap();
        let twice = normalize(&LoadedTable::from(once.clone()), &NormalizeOptions::new()).unwrap();
        assert_eq!(once, twice);
    }
}
