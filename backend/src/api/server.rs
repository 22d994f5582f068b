//! HTTP server for the FBref lessons.
//!
//! # API Endpoints
//!
//! | Method | Path                          | Description                               |
//! |--------|-------------------------------|-------------------------------------------|
//! | GET    | `/health`                     | Health check                              |
//! | GET    | `/api/fixtures/summary`       | Team summary over `start..=end`           |
//! | POST   | `/api/fixtures/summary`       | Same, for an uploaded fixtures export     |
//! | GET    | `/api/fixtures/played-after`  | Matches played after `date`               |
//! | GET    | `/api/fixtures/matches`       | Team rows for `date` (and `venue`)        |
//! | GET    | `/api/players/top`            | Players with at least `min` G+A           |
//! | GET    | `/api/players/young`          | Young regulars by goal contributions / 90 |
//! | GET    | `/api/logs`                   | SSE stream for real-time logs             |
//!
//! Every request loads its own copy of the CSV on a blocking task.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, Method},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{
    FixturesMetadata, MatchQuery, MatchResponse, PlayedAfterQuery, SummaryQuery, SummaryResponse,
    TableResponse, TopQuery, YoungQuery,
};
use crate::config::{self, Settings};
use crate::error::{PipelineResult, ServerError, ServerResult};
use crate::transform::aggregate::summarize;
use crate::transform::clean::played_after;
use crate::transform::pipeline::{fixtures, fixtures_from_bytes, players, FixturesOptions, FixturesResult, PlayersOptions};
use crate::transform::players::{top_contributors, young_regulars};
use crate::transform::reshape::{match_rows, venues_on};

/// Shared, read-only server state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

/// Build the router
pub fn router(settings: Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let state = AppState {
        settings: Arc::new(settings),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/fixtures/summary", get(fixtures_summary).post(upload_summary))
        .route("/api/fixtures/played-after", get(fixtures_played_after))
        .route("/api/fixtures/matches", get(fixtures_matches))
        .route("/api/players/top", get(players_top))
        .route("/api/players/young", get(players_young))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let port = settings.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    eprintln!("🚀 FBref lessons server running on http://localhost:{}", port);
    eprintln!("   fixtures: {}", settings.fixtures_path.display());
    eprintln!("   players:  {}", settings.players_path.display());
    eprintln!("   GET  /api/fixtures/summary?start&end&sort");
    eprintln!("   POST /api/fixtures/summary  (multipart: file, start, end)");
    eprintln!("   GET  /api/fixtures/played-after?date&limit");
    eprintln!("   GET  /api/fixtures/matches?date&venue");
    eprintln!("   GET  /api/players/top?min");
    eprintln!("   GET  /api/players/young?born&nineties");
    eprintln!("   GET  /api/logs   - SSE log stream");
    eprintln!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(settings)).await?;

    Ok(())
}

/// Run a pipeline closure on the blocking pool.
async fn run_blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    result.map_err(|e| {
        log_error(e.to_string());
        ServerError::from(e)
    })
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "fbref-lessons",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "summary": "GET|POST /api/fixtures/summary",
            "playedAfter": "GET /api/fixtures/played-after",
            "matches": "GET /api/fixtures/matches",
            "topPlayers": "GET /api/players/top",
            "youngPlayers": "GET /api/players/young",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn summary_response(
    result: FixturesResult,
    start: NaiveDate,
    end: NaiveDate,
    sort: String,
) -> PipelineResult<SummaryResponse> {
    let teams = summarize(&result.team_rows, start, end)?.sort_by(&sort, true)?;
    let metadata = FixturesMetadata {
        csv_info: result.csv_info,
        played: result.matches.len(),
        unplayed: result.unplayed,
        rejected: result.rejected,
    };
    Ok(SummaryResponse::new(start, end, sort, teams, metadata))
}

/// Team summary for the configured fixtures file
async fn fixtures_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ServerResult<Json<SummaryResponse>> {
    let start = query.start.unwrap_or_else(config::season_start);
    let end = query.end.unwrap_or_else(config::season_end);
    let sort = query.sort.unwrap_or_else(|| "xg_difference".to_string());
    log_info(format!("📊 Summary {} → {} (by {})", start, end, sort));

    let path = state.settings.fixtures_path.clone();
    let response = run_blocking(move || {
        let result = fixtures(&path, &FixturesOptions::default())?;
        summary_response(result, start, end, sort)
    })
    .await?;

    Ok(Json(response))
}

fn parse_date_field(name: &str, raw: &str) -> ServerResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ServerError::BadRequest(format!("Invalid {} '{}': {}", name, raw, e)))
}

/// Team summary for an uploaded fixtures export
async fn upload_summary(mut multipart: Multipart) -> ServerResult<Json<SummaryResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut start = config::season_start();
    let mut end = config::season_end();
    let mut sort = "xg_difference".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        match name.as_str() {
            "start" => start = parse_date_field("start", &text)?,
            "end" => end = parse_date_field("end", &text)?,
            "sort" => sort = text,
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    log_info(format!(
        "📄 Upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let response = run_blocking(move || {
        let result = fixtures_from_bytes(&bytes, &FixturesOptions::default())?;
        summary_response(result, start, end, sort)
    })
    .await?;

    Ok(Json(response))
}

/// Matches played strictly after a date
async fn fixtures_played_after(
    State(state): State<AppState>,
    Query(query): Query<PlayedAfterQuery>,
) -> ServerResult<Json<TableResponse>> {
    let path = state.settings.fixtures_path.clone();
    let table = run_blocking(move || {
        let result = fixtures(&path, &FixturesOptions::default())?;
        let after = played_after(&result.matches, query.date)?;
        Ok(match query.limit {
            Some(n) => after.head(n),
            None => after,
        })
    })
    .await?;

    Ok(Json(TableResponse::from(table)))
}

/// Team rows for a match day, optionally narrowed to one venue
async fn fixtures_matches(
    State(state): State<AppState>,
    Query(query): Query<MatchQuery>,
) -> ServerResult<Json<MatchResponse>> {
    let path = state.settings.fixtures_path.clone();
    let response = run_blocking(move || {
        let result = fixtures(&path, &FixturesOptions::default())?;
        let venues = venues_on(&result.team_rows, query.date)?;
        let rows = match &query.venue {
            Some(venue) => match_rows(&result.team_rows, query.date, venue)?,
            None => result.team_rows.filter(|row| {
                row.get("date").and_then(|v| v.as_date()) == Some(query.date)
            }),
        };
        Ok(MatchResponse::new(query.date, venues, query.venue, rows))
    })
    .await?;

    Ok(Json(response))
}

/// Players at or above a goal-contribution threshold
async fn players_top(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> ServerResult<Json<TableResponse>> {
    let min = query.min.unwrap_or(config::DEFAULT_MIN_CONTRIBUTIONS);
    let path = state.settings.players_path.clone();
    let table = run_blocking(move || {
        let result = players(&path, &PlayersOptions::default())?;
        Ok(top_contributors(&result.rearranged, min)?)
    })
    .await?;

    Ok(Json(TableResponse::from(table)))
}

/// Young regulars, best goal contributions per 90 first
async fn players_young(
    State(state): State<AppState>,
    Query(query): Query<YoungQuery>,
) -> ServerResult<Json<TableResponse>> {
    let born = query.born.unwrap_or(config::DEFAULT_BORN_FROM);
    let nineties = query.nineties.unwrap_or(config::DEFAULT_MIN_NINETIES);
    let path = state.settings.players_path.clone();
    let table = run_blocking(move || {
        let result = players(&path, &PlayersOptions::default())?;
        Ok(young_regulars(&result.rearranged, born, nineties)?)
    })
    .await?;

    Ok(Json(TableResponse::from(table)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::io::Write as _;

    const FIXTURES_CSV: &str = "\
Wk,Day,Date,Time,Home,xG,Score,xG,Away,Attendance,Venue,Referee,Match Report,Notes
1,Fri,05/08/2022,20:00,Crystal Palace,1.2,0–2,1.0,Arsenal,\"25,286\",Selhurst Park,Anthony Taylor,Match Report,
1,Sat,06/08/2022,12:30,Fulham,1.2,2–2,1.2,Liverpool,\"22,207\",Craven Cottage,Andy Madley,Match Report,
2,Sat,13/08/2022,15:00,Arsenal,2.0,4–2,0.5,Leicester City,\"60,033\",Emirates Stadium,Darren England,Match Report,
";

    fn state_for(file: &tempfile::NamedTempFile) -> State<AppState> {
        State(AppState {
            settings: Arc::new(Settings {
                fixtures_path: file.path().to_path_buf(),
                ..Settings::default()
            }),
        })
    }

    fn fixtures_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURES_CSV.as_bytes()).unwrap();
        file
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_summary_ranked_by_xg_difference() {
        let file = fixtures_file();
        let query = SummaryQuery {
            start: Some(ymd(2022, 8, 1)),
            end: Some(ymd(2022, 8, 31)),
            sort: None,
        };
        let Json(response) = fixtures_summary(state_for(&file), Query(query)).await.unwrap();

        assert_eq!(response.metadata.played, 3);
        assert_eq!(response.teams.len(), 5);
        assert_eq!(
            response.teams.value(0, "team_name").map(|v| v.to_string()),
            Some("Arsenal".to_string())
        );
    }

    #[tokio::test]
    async fn test_summary_inverted_range_is_bad_request() {
        let file = fixtures_file();
        let query = SummaryQuery {
            start: Some(ymd(2022, 9, 1)),
            end: Some(ymd(2022, 8, 1)),
            sort: None,
        };
        let err = fixtures_summary(state_for(&file), Query(query)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let state = State(AppState {
            settings: Arc::new(Settings {
                fixtures_path: "no_such_fixtures.csv".into(),
                ..Settings::default()
            }),
        });
        let err = fixtures_summary(state, Query(SummaryQuery::default())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_match_check_yields_two_rows() {
        let file = fixtures_file();
        let query = MatchQuery {
            date: ymd(2022, 8, 13),
            venue: Some("Emirates Stadium".to_string()),
        };
        let Json(response) = fixtures_matches(state_for(&file), Query(query)).await.unwrap();
        assert_eq!(response.venues, vec!["Emirates Stadium".to_string()]);
        assert_eq!(response.rows.len(), 2);

        let query = MatchQuery {
            date: ymd(2022, 8, 13),
            venue: Some("Anfield".to_string()),
        };
        let Json(response) = fixtures_matches(state_for(&file), Query(query)).await.unwrap();
        assert!(response.rows.is_empty());
    }

    #[tokio::test]
    async fn test_played_after_limit() {
        let file = fixtures_file();
        let query = PlayedAfterQuery {
            date: ymd(2022, 8, 5),
            limit: Some(1),
        };
        let Json(response) = fixtures_played_after(state_for(&file), Query(query)).await.unwrap();
        assert_eq!(response.row_count, 1);
        assert_eq!(
            response.rows.value(0, "home").map(|v| v.to_string()),
            Some("Fulham".to_string())
        );
    }
}
