//! One row per match → one row per team per match.
//!
//! ```text
//! home     away   home_xg  away_xg  home_score  away_score
//! Arsenal  Leeds  2.1      0.4      3           0
//!                        ↓
//! team_name  opponent_name  xg   opponent_xg  score  opponent_score  home_away  points
//! Arsenal    Leeds          2.1  0.4          3      0               home       3
//! Leeds      Arsenal        0.4  2.1          0      3               away       0
//! ```

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::error::SchemaResult;
use crate::models::{Side, Table, Value};

const HOME_RENAMES: [(&str, &str); 6] = [
    ("home", "team_name"),
    ("home_xg", "xg"),
    ("away", "opponent_name"),
    ("away_xg", "opponent_xg"),
    ("home_score", "score"),
    ("away_score", "opponent_score"),
];

const AWAY_RENAMES: [(&str, &str); 6] = [
    ("away", "team_name"),
    ("away_xg", "xg"),
    ("home", "opponent_name"),
    ("home_xg", "opponent_xg"),
    ("away_score", "score"),
    ("home_score", "opponent_score"),
];

/// League points for a result: 3 for a win, 1 for a draw, 0 for a loss.
pub fn points(score: i64, opponent_score: i64) -> i64 {
    match score.cmp(&opponent_score) {
        Ordering::Greater => 3,
        Ordering::Equal => 1,
        Ordering::Less => 0,
    }
}

fn perspective(matches: &Table, side: Side, renames: &[(&str, &str)]) -> SchemaResult<Table> {
    let tag = Value::from(side.as_str());
    Ok(matches
        .rename_columns(renames)?
        .with_column("home_away", |_| tag.clone()))
}

/// Unpivot cleaned fixtures into team-perspective rows.
///
/// Each match yields its home row followed by its away row; matches keep
/// their input order.
pub fn to_team_rows(matches: &Table) -> SchemaResult<Table> {
    let home = perspective(matches, Side::Home, &HOME_RENAMES)?;
    let away = perspective(matches, Side::Away, &AWAY_RENAMES)?;

    let combined = Table::interleave(&home, &away);
    Ok(combined.with_column("points", |row| {
        match (
            row.get("score").and_then(Value::as_i64),
            row.get("opponent_score").and_then(Value::as_i64),
        ) {
            (Some(s), Some(o)) => Value::Int(points(s, o)),
            _ => Value::Null,
        }
    }))
}

/// Venues with a match on `date`, first-seen order, no repeats.
pub fn venues_on(team_rows: &Table, date: NaiveDate) -> SchemaResult<Vec<String>> {
    let dates = team_rows.column_index("date")?;
    let venues = team_rows.column_index("venue")?;

    let mut out: Vec<String> = Vec::new();
    for row in team_rows.rows() {
        if row[dates].as_date() != Some(date) {
            continue;
        }
        let venue = row[venues].to_string();
        if !venue.is_empty() && !out.contains(&venue) {
            out.push(venue);
        }
    }
    Ok(out)
}

/// Team rows for the match at `venue` on `date`.
///
/// A played match yields exactly two rows, anything else yields none.
pub fn match_rows(team_rows: &Table, date: NaiveDate, venue: &str) -> SchemaResult<Table> {
    team_rows.column_index("date")?;
    team_rows.column_index("venue")?;
    Ok(team_rows.filter(|row| {
        row.get("date").and_then(Value::as_date) == Some(date)
            && row.get("venue").and_then(Value::as_str) == Some(venue)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixtures() -> Table {
        let row = |date: NaiveDate, home: &str, hxg: f64, hs: i64, away: &str, axg: f64, aws: i64, venue: &str| {
            vec![
                Value::Int(1),
                Value::Date(date),
                Value::from(home),
                Value::Float(hxg),
                Value::Float(axg),
                Value::from(away),
                Value::from(venue),
                Value::Int(hs),
                Value::Int(aws),
            ]
        };
        Table::from_rows(
            ["wk", "date", "home", "home_xg", "away_xg", "away", "venue", "home_score", "away_score"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                row(ymd(2022, 8, 5), "Crystal Palace", 1.2, 0, "Arsenal", 1.0, 2, "Selhurst Park"),
                row(ymd(2022, 8, 6), "Fulham", 1.2, 2, "Liverpool", 1.2, 2, "Craven Cottage"),
                row(ymd(2022, 8, 6), "Bournemouth", 0.7, 2, "Aston Villa", 0.5, 0, "Vitality Stadium"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_points() {
        assert_eq!(points(2, 1), 3);
        assert_eq!(points(1, 1), 1);
        assert_eq!(points(0, 2), 0);
    }

    #[test]
    fn test_two_rows_per_match_in_order() {
        let input = fixtures();
        let rows = to_team_rows(&input).unwrap();
        assert_eq!(rows.len(), 2 * input.len());

        for i in 0..input.len() {
            let home = rows.row(2 * i).unwrap();
            let away = rows.row(2 * i + 1).unwrap();
            assert_eq!(home.get("home_away"), Some(&Value::from("home")));
            assert_eq!(away.get("home_away"), Some(&Value::from("away")));
            assert_eq!(home.get("date"), away.get("date"));
            assert_eq!(home.get("venue"), away.get("venue"));
            assert_eq!(home.get("team_name"), away.get("opponent_name"));
            assert_eq!(home.get("opponent_name"), away.get("team_name"));
            assert_eq!(home.get("xg"), away.get("opponent_xg"));
        }
    }

    #[test]
    fn test_points_from_both_sides() {
        let rows = to_team_rows(&fixtures()).unwrap();
        let points: Vec<_> = rows.column("points").unwrap().cloned().collect();
        assert_eq!(
            points,
            vec![0, 3, 1, 1, 3, 0].into_iter().map(Value::Int).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_source_table_untouched() {
        let input = fixtures();
        let _ = to_team_rows(&input).unwrap();
        assert_eq!(input, fixtures());
        assert!(input.has_column("home"));
    }

    #[test]
    fn test_missing_side_column() {
        let input = fixtures().drop_columns(&["away_xg"]).unwrap();
        let err = to_team_rows(&input).unwrap_err();
        assert!(matches!(err, SchemaError::ColumnNotFound { ref column, .. } if column == "away_xg"));
    }

    #[test]
    fn test_match_check() {
        let rows = to_team_rows(&fixtures()).unwrap();

        assert_eq!(
            venues_on(&rows, ymd(2022, 8, 6)).unwrap(),
            vec!["Craven Cottage".to_string(), "Vitality Stadium".to_string()]
        );
        assert_eq!(match_rows(&rows, ymd(2022, 8, 6), "Craven Cottage").unwrap().len(), 2);
        assert_eq!(match_rows(&rows, ymd(2022, 8, 5), "Craven Cottage").unwrap().len(), 0);
        assert!(venues_on(&rows, ymd(2022, 8, 7)).unwrap().is_empty());
    }
}
