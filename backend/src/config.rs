//! Application configuration.
//!
//! Defaults are compile-time constants; file locations and the server port
//! can be overridden from the environment (a `.env` file is read by the
//! binary at startup).

use chrono::NaiveDate;
use std::path::PathBuf;

/// Date pattern FBref uses in fixture exports (day/month/4-digit year).
pub const FBREF_DATE_FORMAT: &str = "%d/%m/%Y";

/// Default fixtures export.
pub const DEFAULT_FIXTURES_FILE: &str = "data/fbref_fixtures_data.csv";

/// Default squad standard-stats export (two header lines).
pub const DEFAULT_PLAYERS_FILE: &str = "data/fbref_player_data.csv";

/// HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// First and last match dates in the bundled 2022/23 export.
pub const SEASON_START: (i32, u32, u32) = (2022, 8, 5);
pub const SEASON_END: (i32, u32, u32) = (2023, 4, 21);

/// Minimum goals plus assists for the top-contributors filter.
pub const DEFAULT_MIN_CONTRIBUTIONS: f64 = 10.0;

/// Earliest birth year for the young-players filter.
pub const DEFAULT_BORN_FROM: i64 = 2000;

/// Minimum full matches (minutes / 90) for the young-regulars filter.
pub const DEFAULT_MIN_NINETIES: f64 = 5.0;

pub fn season_start() -> NaiveDate {
    let (y, m, d) = SEASON_START;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

pub fn season_end() -> NaiveDate {
    let (y, m, d) = SEASON_END;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MAX)
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub fixtures_path: PathBuf,
    pub players_path: PathBuf,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fixtures_path: PathBuf::from(DEFAULT_FIXTURES_FILE),
            players_path: PathBuf::from(DEFAULT_PLAYERS_FILE),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read `FBREF_FIXTURES_CSV`, `FBREF_PLAYERS_CSV` and `FBREF_PORT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            fixtures_path: lookup("FBREF_FIXTURES_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.fixtures_path),
            players_path: lookup("FBREF_PLAYERS_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.players_path),
            port: lookup("FBREF_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_season_bounds() {
        assert!(season_start() < season_end());
        assert_eq!(season_start().to_string(), "2022-08-05");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("FBREF_FIXTURES_CSV", "/tmp/f.csv"), ("FBREF_PORT", "8080")]
            .into_iter()
            .collect();
        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.fixtures_path, PathBuf::from("/tmp/f.csv"));
        assert_eq!(settings.players_path, PathBuf::from(DEFAULT_PLAYERS_FILE));
        assert_eq!(settings.port, 8080);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let settings = Settings::from_lookup(|k| (k == "FBREF_PORT").then(|| "http".to_string()));
        assert_eq!(settings.port, DEFAULT_PORT);
    }
}
