//! Error types for the FBref lessons pipeline.
//!
//! This module defines a hierarchy of error types, one per stage:
//!
//! - [`LoadError`] - reading and tokenising a CSV export
//! - [`SchemaError`] - column lookups, renames and drops
//! - [`AggregateError`] - date-window summaries
//! - [`PipelineError`] - top-level orchestration errors
//! - [`ServerError`] - HTTP surface
//!
//! Row-level score/date failures are not errors: they are reported as
//! [`crate::transform::clean::RowIssue`] values and the rest of the batch
//! carries on.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while reading a CSV export into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input path does not exist.
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode the raw bytes.
    #[error("Failed to decode content as {0}")]
    Encoding(String),

    /// The CSV tokenizer rejected the input.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A row has a different field count than the header.
    #[error("Malformed input at line {line}: expected {expected} fields, found {found}")]
    Malformed {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Not enough lines to build the requested header.
    #[error("CSV has no header (expected {0} header line(s))")]
    EmptyFile(usize),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors raised when a table does not have the columns a caller asked for.
///
/// These indicate a configuration bug (wrong junk list, wrong rename map),
/// never bad row data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// A named column is not present.
    #[error("Column not found: '{column}' (available: {})", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// Two columns resolved to the same name.
    #[error("Duplicate column name '{0}' after normalization; supply a positional rename")]
    DuplicateColumn(String),

    /// A positional rename lists more names than the raw column has
    /// occurrences.
    #[error("Column '{column}' occurs {found} time(s), rename expects {expected}")]
    RenameCount {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A header cell resolved to an empty name.
    #[error("Empty column header at position {0}")]
    EmptyHeader(usize),

    /// A row does not match the table width.
    #[error("Row {row} has {found} values, table has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors from the per-team summary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AggregateError {
    /// The window start is after its end.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Input table is missing a required column.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline`].
/// It wraps all lower-level errors so `?` works across stage boundaries.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loader error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Column configuration error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Summary error.
    #[error("Aggregate error: {0}")]
    Aggregate(#[from] AggregateError),

    /// Failed to write an output table.
    #[error("Output error: {0}")]
    Output(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for column operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for aggregation operations.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
