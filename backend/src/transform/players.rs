//! Player-season filters: top goal contributors and young regulars.
//!
//! Works on the normalized squad "Standard Stats" table, where goals plus
//! assists live in `performance_g+a` and minutes in `playing_time_min`.

use crate::error::SchemaResult;
use crate::models::{Table, Value};

pub const GOAL_CONTRIBUTIONS: &str = "performance_g+a";
pub const MINUTES: &str = "playing_time_min";

/// Columns kept by [`rearrange`].
pub const PLAYER_COLUMNS: [&str; 6] = ["player", "squad", "age", "born", MINUTES, GOAL_CONTRIBUTIONS];

/// Keep the headline columns, most goal contributions first.
pub fn rearrange(players: &Table) -> SchemaResult<Table> {
    players.select(&PLAYER_COLUMNS)?.sort_by(GOAL_CONTRIBUTIONS, true)
}

fn at_least(row: Option<&Value>, threshold: f64) -> bool {
    row.and_then(Value::as_f64).is_some_and(|v| v >= threshold)
}

/// Players with at least `threshold` goals plus assists.
pub fn top_contributors(players: &Table, threshold: f64) -> SchemaResult<Table> {
    players.column_index(GOAL_CONTRIBUTIONS)?;
    Ok(players.filter(|row| at_least(row.get(GOAL_CONTRIBUTIONS), threshold)))
}

/// Add `nineties_played` and `goal_cont_90`.
///
/// `goal_cont_90` is null for players with no minutes.
pub fn with_per_ninety(players: &Table) -> SchemaResult<Table> {
    players.column_index(MINUTES)?;
    players.column_index(GOAL_CONTRIBUTIONS)?;

    let with_nineties = players.with_column("nineties_played", |row| {
        row.get(MINUTES)
            .and_then(Value::as_f64)
            .map(|m| m / 90.0)
            .into()
    });
    Ok(with_nineties.with_column("goal_cont_90", |row| {
        let nineties = row.get("nineties_played").and_then(Value::as_f64);
        let contributions = row.get(GOAL_CONTRIBUTIONS).and_then(Value::as_f64);
        match (contributions, nineties) {
            (Some(c), Some(n)) if n > 0.0 => Value::Float(c / n),
            _ => Value::Null,
        }
    }))
}

/// Players born in `born_from` or later, best per-90 rate first.
pub fn young_players(players: &Table, born_from: i64) -> SchemaResult<Table> {
    players.column_index("born")?;
    players
        .filter(|row| at_least(row.get("born"), born_from as f64))
        .sort_by("goal_cont_90", true)
}

/// [`young_players`] restricted to at least `min_nineties` full matches.
pub fn young_regulars(players: &Table, born_from: i64, min_nineties: f64) -> SchemaResult<Table> {
    players.column_index("nineties_played")?;
    young_players(players, born_from)
        .map(|t| t.filter(|row| at_least(row.get("nineties_played"), min_nineties)))
}
