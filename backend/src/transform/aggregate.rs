//! Per-team summaries over a date window.
//!
//! ```text
//! Team rows (one per team per match)       →  Summary (one per team)
//! ┌───────────────────────────────────┐       ┌──────────────────────────────┐
//! │ Arsenal  2022-08-05  xg 1.0  pts 3 │       │ Arsenal  games 2  xg_for 1.5 │
//! │ Arsenal  2022-08-13  xg 2.0  pts 3 │  →    ├──────────────────────────────┤
//! │ Leeds    2022-08-06  xg 0.9  pts 3 │       │ Leeds    games 1  xg_for 0.9 │
//! └───────────────────────────────────┘       └──────────────────────────────┘
//! ```
//!
//! Groups come out in team-name order. Ranking (e.g. by `xg_difference`)
//! is left to the caller via [`Table::sort_by`].

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::error::{AggregateError, AggregateResult};
use crate::models::{Table, TeamSummary, Value};

/// Columns the team-perspective table must carry.
const REQUIRED: [&str; 7] = [
    "team_name",
    "date",
    "xg",
    "opponent_xg",
    "score",
    "opponent_score",
    "points",
];

/// Summarise team rows dated within `[start, end]`, both ends inclusive.
pub fn summarize(team_rows: &Table, start: NaiveDate, end: NaiveDate) -> AggregateResult<Table> {
    let summaries = summarize_teams(team_rows, start, end)?;
    Ok(TeamSummary::to_table(&summaries))
}

/// Typed form of [`summarize`].
pub fn summarize_teams(
    team_rows: &Table,
    start: NaiveDate,
    end: NaiveDate,
) -> AggregateResult<Vec<TeamSummary>> {
    if start > end {
        return Err(AggregateError::InvalidRange { start, end });
    }

    let idx = REQUIRED
        .iter()
        .map(|c| team_rows.column_index(c))
        .collect::<Result<Vec<_>, _>>()?;
    let (team, date, xg, opp_xg, score, opp_score, points) =
        (idx[0], idx[1], idx[2], idx[3], idx[4], idx[5], idx[6]);

    let mut teams: BTreeMap<String, SummaryBuilder> = BTreeMap::new();

    for row in team_rows.rows() {
        let in_window = row[date]
            .as_date()
            .is_some_and(|d| start <= d && d <= end);
        if !in_window {
            continue;
        }
        let name = match &row[team] {
            Value::Null => continue,
            other => other.to_string(),
        };

        let builder = teams.entry(name).or_default();
        builder.games += 1;
        builder.xg_for.add(&row[xg]);
        builder.xg_against.add(&row[opp_xg]);
        builder.goals_for.add(&row[score]);
        builder.goals_against.add(&row[opp_score]);
        builder.points.add(&row[points]);
    }

    Ok(teams
        .into_iter()
        .map(|(name, builder)| builder.build(name))
        .collect())
}

/// Running mean that skips missing values.
#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: &Value) {
        if let Some(v) = value.as_f64() {
            self.sum += v;
            self.count += 1;
        }
    }

    fn get(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Accumulates one team's rows while grouping.
#[derive(Debug, Default)]
struct SummaryBuilder {
    games: usize,
    xg_for: Mean,
    xg_against: Mean,
    goals_for: Mean,
    goals_against: Mean,
    points: Mean,
}

impl SummaryBuilder {
    fn build(self, team_name: String) -> TeamSummary {
        let xg_for = self.xg_for.get();
        let xg_against = self.xg_against.get();
        TeamSummary {
            team_name,
            games_played: self.games,
            xg_for,
            xg_against,
            goals_for: self.goals_for.get(),
            goals_against: self.goals_against.get(),
            points_per_game: self.points.get(),
            xg_difference: xg_for.zip(xg_against).map(|(f, a)| f - a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn team_rows() -> Table {
        let row = |team: &str, date: NaiveDate, xg: Value, oxg: f64, s: i64, os: i64, pts: i64| {
            vec![
                Value::from(team),
                Value::Date(date),
                xg,
                Value::Float(oxg),
                Value::Int(s),
                Value::Int(os),
                Value::Int(pts),
            ]
        };
        Table::from_rows(
            REQUIRED.iter().map(|s| s.to_string()).collect(),
            vec![
                row("Arsenal", ymd(2022, 8, 5), Value::Float(1.0), 1.2, 2, 0, 3),
                row("Crystal Palace", ymd(2022, 8, 5), Value::Float(1.2), 1.0, 0, 2, 0),
                row("Arsenal", ymd(2022, 8, 13), Value::Float(2.0), 0.5, 4, 2, 3),
                row("Leicester City", ymd(2022, 8, 13), Value::Float(0.5), 2.0, 2, 4, 0),
                row("Arsenal", ymd(2022, 8, 20), Value::Null, 0.9, 3, 0, 3),
                row("Bournemouth", ymd(2022, 8, 20), Value::Float(0.9), 1.5, 0, 3, 0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_full_window() {
        let summaries = summarize_teams(&team_rows(), ymd(2022, 8, 5), ymd(2023, 4, 21)).unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.team_name.as_str()).collect();
        assert_eq!(names, vec!["Arsenal", "Bournemouth", "Crystal Palace", "Leicester City"]);

        let arsenal = &summaries[0];
        assert_eq!(arsenal.games_played, 3);
        // Missing xG is skipped, not counted as zero
        assert_eq!(arsenal.xg_for, Some(1.5));
        assert!((arsenal.xg_against.unwrap() - (1.2 + 0.5 + 0.9) / 3.0).abs() < 1e-9);
        assert_eq!(arsenal.goals_for, Some(3.0));
        assert_eq!(arsenal.points_per_game, Some(3.0));
        assert!((arsenal.xg_difference.unwrap() - (1.5 - 2.6 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let summaries = summarize_teams(&team_rows(), ymd(2022, 8, 5), ymd(2022, 8, 13)).unwrap();
        let arsenal = summaries.iter().find(|s| s.team_name == "Arsenal").unwrap();
        assert_eq!(arsenal.games_played, 2);

        let single_day = summarize_teams(&team_rows(), ymd(2022, 8, 13), ymd(2022, 8, 13)).unwrap();
        assert_eq!(single_day.len(), 2);
    }

    #[test]
    fn test_teams_without_rows_are_absent() {
        let summaries = summarize_teams(&team_rows(), ymd(2022, 8, 20), ymd(2022, 8, 31)).unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.team_name.as_str()).collect();
        assert_eq!(names, vec!["Arsenal", "Bournemouth"]);

        // Only row in window has no xG
        let arsenal = &summaries[0];
        assert_eq!(arsenal.xg_for, None);
        assert_eq!(arsenal.xg_difference, None);
    }

    #[test]
    fn test_inverted_range_is_an_error() {
        let err = summarize(&team_rows(), ymd(2023, 1, 1), ymd(2022, 12, 31)).unwrap_err();
        assert_eq!(
            err,
            AggregateError::InvalidRange {
                start: ymd(2023, 1, 1),
                end: ymd(2022, 12, 31)
            }
        );
    }

    #[test]
    fn test_table_output_and_caller_sort() {
        let table = summarize(&team_rows(), ymd(2022, 8, 5), ymd(2023, 4, 21)).unwrap();
        assert_eq!(table.columns(), &TeamSummary::COLUMNS);

        let ranked = table.sort_by("xg_difference", true).unwrap();
        assert_eq!(ranked.value(0, "team_name"), Some(&Value::from("Arsenal")));
        assert_eq!(ranked.value(3, "team_name"), Some(&Value::from("Leicester City")));
    }

    #[test]
    fn test_missing_column() {
        let rows = team_rows().drop_columns(&["points"]).unwrap();
        let err = summarize(&rows, ymd(2022, 8, 5), ymd(2023, 4, 21)).unwrap_err();
        assert!(matches!(err, AggregateError::Schema(_)));
    }
}
