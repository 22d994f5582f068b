//! High-level pipeline API.
//!
//! Chains the stages for each lesson:
//!
//! ```text
//! fixtures:  load (1 header line) → normalize → clean → to_team_rows
//! players:   load (2 header lines) → normalize → rearrange → per-90
//! ```
//!
//! Each call reads its own copy of the file. Nothing is cached, so
//! concurrent callers never share a table.
//!
//! # Example
//!
//! ```rust,ignore
//! use fbref_lessons::transform::pipeline::{fixtures, FixturesOptions};
//! use fbref_lessons::transform::aggregate::summarize;
//!
//! let result = fixtures("fbref_fixtures_data.csv".as_ref(), &FixturesOptions::default())?;
//! let table = summarize(&result.team_rows, start, end)?.sort_by("xg_difference", true)?;
//! ```

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use super::clean::{clean, CleanOptions, RowIssue};
use super::normalize::{normalize, NormalizeOptions};
use super::players::{rearrange, with_per_ninety};
use super::reshape::to_team_rows;
use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{LoadedTable, Table};
use crate::parser::{load, load_bytes, LoadOptions};

/// Options for the fixtures pipeline.
#[derive(Debug, Clone)]
pub struct FixturesOptions {
    pub load: LoadOptions,
    pub normalize: NormalizeOptions,
    pub clean: CleanOptions,
}

impl Default for FixturesOptions {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            normalize: NormalizeOptions::fixtures(),
            clean: CleanOptions::default(),
        }
    }
}

/// Options for the player-season pipeline.
#[derive(Debug, Clone)]
pub struct PlayersOptions {
    pub load: LoadOptions,
    pub normalize: NormalizeOptions,
}

impl Default for PlayersOptions {
    fn default() -> Self {
        Self {
            load: LoadOptions::two_level(),
            normalize: NormalizeOptions::player_season(),
        }
    }
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    /// Raw header labels, before normalization
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of the fixtures pipeline.
#[derive(Debug, Clone)]
pub struct FixturesResult {
    /// Cleaned, played matches (one row per match)
    pub matches: Table,
    /// One row per team per match
    pub team_rows: Table,
    /// Fixtures dropped because they have no score yet
    pub unplayed: usize,
    /// Rows excluded for an unparseable score or date
    pub rejected: Vec<RowIssue>,
    pub csv_info: CsvInfo,
}

/// Result of the player-season pipeline.
#[derive(Debug, Clone)]
pub struct PlayersResult {
    /// Every normalized column
    pub players: Table,
    /// Headline columns plus `nineties_played` and `goal_cont_90`,
    /// most goal contributions first
    pub rearranged: Table,
    pub csv_info: CsvInfo,
}

/// Run the fixtures pipeline on a file.
pub fn fixtures(path: &Path, options: &FixturesOptions) -> PipelineResult<FixturesResult> {
    log_info(format!("📖 Reading fixtures: {}", path.display()));
    let loaded = load(path, options.load)?;
    fixtures_from_loaded(loaded, options)
}

/// Run the fixtures pipeline on uploaded bytes.
pub fn fixtures_from_bytes(bytes: &[u8], options: &FixturesOptions) -> PipelineResult<FixturesResult> {
    log_info(format!("📖 Reading uploaded fixtures ({} bytes)", bytes.len()));
    let loaded = load_bytes(bytes, options.load)?;
    fixtures_from_loaded(loaded, options)
}

fn fixtures_from_loaded(loaded: LoadedTable, options: &FixturesOptions) -> PipelineResult<FixturesResult> {
    let csv_info = describe(&loaded);

    let table = normalize(&loaded, &options.normalize)?;
    log_success(format!("Normalized {} columns: {}", table.columns().len(), table.columns().join(", ")));

    let outcome = clean(&table, &options.clean)?;
    log_success(format!(
        "{} played matches ({} not yet played)",
        outcome.table.len(),
        outcome.unplayed
    ));
    if !outcome.rejected.is_empty() {
        log_warning(format!("{} rows rejected", outcome.rejected.len()));
        for issue in outcome.rejected.iter().take(5) {
            log_info_indent(issue.to_string(), 1);
        }
    }

    let team_rows = to_team_rows(&outcome.table)?;
    log_success(format!("{} team-perspective rows", team_rows.len()));

    Ok(FixturesResult {
        matches: outcome.table,
        team_rows,
        unplayed: outcome.unplayed,
        rejected: outcome.rejected,
        csv_info,
    })
}

/// Run the player-season pipeline on a file.
pub fn players(path: &Path, options: &PlayersOptions) -> PipelineResult<PlayersResult> {
    log_info(format!("📖 Reading player stats: {}", path.display()));
    let loaded = load(path, options.load)?;
    players_from_loaded(loaded, options)
}

/// Run the player-season pipeline on uploaded bytes.
pub fn players_from_bytes(bytes: &[u8], options: &PlayersOptions) -> PipelineResult<PlayersResult> {
    log_info(format!("📖 Reading uploaded player stats ({} bytes)", bytes.len()));
    let loaded = load_bytes(bytes, options.load)?;
    players_from_loaded(loaded, options)
}

fn players_from_loaded(loaded: LoadedTable, options: &PlayersOptions) -> PipelineResult<PlayersResult> {
    let csv_info = describe(&loaded);

    let players = normalize(&loaded, &options.normalize)?;
    log_success(format!("Normalized {} columns", players.columns().len()));

    let rearranged = with_per_ninety(&rearrange(&players)?)?;
    log_success(format!("{} players", rearranged.len()));

    Ok(PlayersResult {
        players,
        rearranged,
        csv_info,
    })
}

fn describe(loaded: &LoadedTable) -> CsvInfo {
    let info = CsvInfo {
        headers: loaded.header.labels(),
        row_count: loaded.rows.len(),
    };
    log_success(format!("Read {} rows, {} columns", info.row_count, info.headers.len()));
    info
}

/// Table output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Write a table as CSV or as a pretty JSON array of row objects.
pub fn export<W: Write>(table: &Table, format: OutputFormat, mut writer: W) -> PipelineResult<()> {
    match format {
        OutputFormat::Csv => table
            .write_csv(writer)
            .map_err(|e| PipelineError::Output(e.to_string())),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, table)
                .map_err(|e| PipelineError::Output(e.to_string()))?;
            writeln!(writer).map_err(|e| PipelineError::Output(e.to_string()))
        }
    }
}
