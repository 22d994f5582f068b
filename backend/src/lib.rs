//! # FBref lessons - football stats pipelines over FBref CSV exports
//!
//! Loads "Scores & Fixtures" and squad "Standard Stats" exports, cleans
//! them and derives per-team and per-player tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Loader    │────▶│  Normalize  │────▶│    Clean    │────▶│   Reshape   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  (columns)  │     │ (score/date)│     │ + Aggregate │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fbref_lessons::{fixtures, summarize, FixturesOptions};
//!
//! let result = fixtures("fbref_fixtures_data.csv".as_ref(), &FixturesOptions::default())?;
//! let table = summarize(&result.team_rows, start, end)?.sort_by("xg_difference", true)?;
//! println!("{} teams", table.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Defaults and environment settings
//! - [`models`] - Cell values, tables, headers, team summaries
//! - [`parser`] - CSV loading with encoding detection
//! - [`transform`] - Normalize, clean, reshape, aggregate, players, pipeline
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Loading
pub mod parser;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AggregateError, LoadError, PipelineError, SchemaError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Header, HeaderPair, HeaderRows, LoadedTable, RowView, Side, Table, TeamSummary, Value};

// =============================================================================
// Re-exports - Loader
// =============================================================================

pub use parser::{decode_content, detect_encoding, load, load_bytes, parse_str, LoadOptions};

// =============================================================================
// Re-exports - Transform stages
// =============================================================================

pub use transform::{
    clean, match_rows, normalize, played_after, rearrange, summarize, summarize_teams,
    to_team_rows, top_contributors, venues_on, with_per_ninety, young_players, young_regulars,
    CleanOptions, CleanOutcome, ColumnRenames, NormalizeOptions, RowIssue,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    export, fixtures, fixtures_from_bytes, players, players_from_bytes, CsvInfo, FixturesOptions,
    FixturesResult, OutputFormat, PlayersOptions, PlayersResult,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, MatchResponse, SummaryResponse, TableResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
