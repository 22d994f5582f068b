//! Transformation module.
//!
//! This module turns loaded FBref exports into lesson tables:
//! - Normalize: column renames, snake_case names, junk columns
//! - Clean: score split, date parse, unplayed fixtures
//! - Reshape: one row per team per match
//! - Aggregate: per-team summaries over a date window
//! - Players: goal-contribution filters
//! - Pipeline: the stages chained per lesson

pub mod aggregate;
pub mod clean;
pub mod normalize;
pub mod pipeline;
pub mod players;
pub mod reshape;

pub use aggregate::{summarize, summarize_teams};
pub use clean::{clean, played_after, CleanOptions, CleanOutcome, RowIssue};
pub use normalize::{normalize, ColumnRenames, NormalizeOptions};
pub use pipeline::{
    export, fixtures, fixtures_from_bytes, players, players_from_bytes, CsvInfo, FixturesOptions,
    FixturesResult, OutputFormat, PlayersOptions, PlayersResult,
};
pub use players::{rearrange, top_contributors, with_per_ninety, young_players, young_regulars};
pub use reshape::{match_rows, to_team_rows, venues_on};
