//! REST API types.
//!
//! Tables are serialized as arrays of row objects keyed by column name.
//! Every body carries a `requestId` so log lines and responses can be
//! matched up.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{LoadError, PipelineError, ServerError};
use crate::models::Table;
use crate::transform::clean::RowIssue;
use crate::transform::pipeline::CsvInfo;

fn request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Per-team summary over a date window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub request_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Column the teams are ranked by (descending)
    pub sort: String,
    pub teams: Table,
    pub metadata: FixturesMetadata,
}

/// What the fixtures pipeline saw on the way in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturesMetadata {
    pub csv_info: CsvInfo,
    pub played: usize,
    pub unplayed: usize,
    pub rejected: Vec<RowIssue>,
}

/// A plain table of rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub request_id: String,
    pub row_count: usize,
    pub rows: Table,
}

impl From<Table> for TableResponse {
    fn from(rows: Table) -> Self {
        Self {
            request_id: request_id(),
            row_count: rows.len(),
            rows,
        }
    }
}

/// The two team rows of a match, plus the venues in use that day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub request_id: String,
    pub date: NaiveDate,
    pub venues: Vec<String>,
    pub venue: Option<String>,
    pub rows: Table,
}

impl SummaryResponse {
    pub fn new(start: NaiveDate, end: NaiveDate, sort: String, teams: Table, metadata: FixturesMetadata) -> Self {
        Self {
            request_id: request_id(),
            start,
            end,
            sort,
            teams,
            metadata,
        }
    }
}

impl MatchResponse {
    pub fn new(date: NaiveDate, venues: Vec<String>, venue: Option<String>, rows: Table) -> Self {
        Self {
            request_id: request_id(),
            date,
            venues,
            venue,
            rows,
        }
    }
}

/// Query for `GET /api/fixtures/summary`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub sort: Option<String>,
}

/// Query for `GET /api/fixtures/played-after`
#[derive(Debug, Clone, Deserialize)]
pub struct PlayedAfterQuery {
    pub date: NaiveDate,
    pub limit: Option<usize>,
}

/// Query for `GET /api/fixtures/matches`
#[derive(Debug, Clone, Deserialize)]
pub struct MatchQuery {
    pub date: NaiveDate,
    pub venue: Option<String>,
}

/// Query for `GET /api/players/top`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopQuery {
    pub min: Option<f64>,
}

/// Query for `GET /api/players/young`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YoungQuery {
    pub born: Option<i64>,
    pub nineties: Option<f64>,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": request_id(),
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Pipeline(err) => match err {
                PipelineError::Load(LoadError::FileNotFound { .. }) => StatusCode::NOT_FOUND,
                PipelineError::Load(LoadError::Io { .. }) | PipelineError::Output(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                PipelineError::Load(_) | PipelineError::Schema(_) | PipelineError::Aggregate(_) => {
                    StatusCode::BAD_REQUEST
                }
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AggregateError, SchemaError};
    use crate::models::Value as Cell;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        let missing: ServerError = PipelineError::from(LoadError::FileNotFound {
            path: PathBuf::from("fbref_fixtures_data.csv"),
        })
        .into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let range: ServerError = PipelineError::from(AggregateError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        })
        .into();
        assert_eq!(range.status(), StatusCode::BAD_REQUEST);

        let column: ServerError = PipelineError::from(SchemaError::DuplicateColumn("xg".into())).into();
        assert_eq!(column.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ServerError::Internal("join".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_names_the_file() {
        let err: ServerError = PipelineError::from(LoadError::FileNotFound {
            path: PathBuf::from("fbref_fixtures_data.csv"),
        })
        .into();
        let body = error_response(&err.to_string());
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("fbref_fixtures_data.csv"));
        assert!(body["requestId"].is_string());
    }

    #[test]
    fn test_table_response_shape() {
        let table = Table::from_rows(
            vec!["team_name".into(), "games_played".into()],
            vec![vec![Cell::from("Arsenal"), Cell::Int(38)]],
        )
        .unwrap();
        let json = serde_json::to_value(TableResponse::from(table)).unwrap();
        assert_eq!(json["rowCount"], 1);
        assert_eq!(json["rows"][0]["team_name"], "Arsenal");
        assert_eq!(json["rows"][0]["games_played"], 38);
    }
}
