//! fbref CLI - football stats lessons over FBref CSV exports
//!
//! # Main Commands
//!
//! ```bash
//! fbref fixtures summary --start 2022-08-05 --end 2022-10-31   # Team xG table
//! fbref players young --born 2000 --nineties 5                 # Young regulars
//! fbref serve                                                  # HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! fbref parse input.csv --header-rows 2 --preset players       # Normalized table
//! fbref fixtures team-rows                                     # Unpivoted rows
//! ```
//!
//! Tables go to stdout (or `--output`) as CSV or JSON; progress goes to stderr.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fbref_lessons::config::{self, Settings};
use fbref_lessons::{
    export, fixtures, load, match_rows, normalize, played_after, players, summarize,
    top_contributors, venues_on, young_players, young_regulars, FixturesOptions, HeaderRows,
    LoadOptions, NormalizeOptions, OutputFormat, PlayersOptions, Table,
};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fbref")]
#[command(about = "Clean, reshape and summarise FBref football CSV exports", long_about = None)]
struct Cli {
    /// Output format for tables
    #[arg(short, long, global = true, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a CSV export and print its normalized table
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Number of header lines (1 or 2)
        #[arg(long, default_value = "1")]
        header_rows: u8,

        /// Column preset to apply
        #[arg(long, value_enum, default_value = "raw")]
        preset: Preset,

        /// CSV delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Scores & Fixtures lessons
    Fixtures {
        /// Fixtures CSV (default: FBREF_FIXTURES_CSV or data/fbref_fixtures_data.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(subcommand)]
        action: FixturesAction,
    },

    /// Player season lessons
    Players {
        /// Standard stats CSV (default: FBREF_PLAYERS_CSV or data/fbref_player_data.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(subcommand)]
        action: PlayersAction,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: FBREF_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum FixturesAction {
    /// Played matches with split scores and parsed dates
    Clean,

    /// One row per team per match, with points
    TeamRows,

    /// Per-team means over a date window
    Summary {
        /// First day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Column to rank by
        #[arg(long, default_value = "xg_difference")]
        sort: String,

        /// Rank ascending instead of descending
        #[arg(long)]
        ascending: bool,
    },

    /// Matches played strictly after a date
    PlayedAfter {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Keep only the first N matches
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Both team rows of a match, found by date and venue
    Match {
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,

        /// Venue; lists the day's venues when omitted
        #[arg(long)]
        venue: Option<String>,
    },
}

#[derive(Subcommand)]
enum PlayersAction {
    /// Players with at least MIN goals plus assists
    Top {
        #[arg(long, default_value_t = config::DEFAULT_MIN_CONTRIBUTIONS)]
        min: f64,
    },

    /// Young players ranked by goal contributions per 90
    Young {
        /// Earliest birth year
        #[arg(long, default_value_t = config::DEFAULT_BORN_FROM)]
        born: i64,

        /// Minimum full matches played
        #[arg(long, default_value_t = config::DEFAULT_MIN_NINETIES)]
        nineties: f64,

        /// Ignore the minutes threshold
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Raw,
    Fixtures,
    Players,
}

impl Preset {
    fn options(self) -> NormalizeOptions {
        match self {
            Preset::Raw => NormalizeOptions::new(),
            Preset::Fixtures => NormalizeOptions::fixtures(),
            Preset::Players => NormalizeOptions::player_season(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let out = Output {
        format: cli.format,
        path: cli.output,
    };

    let result = match cli.command {
        Commands::Parse {
            input,
            header_rows,
            preset,
            delimiter,
        } => cmd_parse(&input, header_rows, preset, delimiter, &out),

        Commands::Fixtures { input, action } => {
            let input = input.unwrap_or_else(|| settings.fixtures_path.clone());
            cmd_fixtures(&input, action, &out)
        }

        Commands::Players { input, action } => {
            let input = input.unwrap_or_else(|| settings.players_path.clone());
            cmd_players(&input, action, &out)
        }

        Commands::Serve { port } => cmd_serve(settings, port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Where and how tables are written
struct Output {
    format: OutputFormat,
    path: Option<PathBuf>,
}

impl Output {
    fn write(&self, table: &Table) -> Result<(), Box<dyn std::error::Error>> {
        match &self.path {
            Some(p) => {
                let mut writer = BufWriter::new(fs::File::create(p)?);
                export(table, self.format, &mut writer)?;
                writer.flush()?;
                eprintln!("💾 Output written to: {}", p.display());
            }
            None => {
                let stdout = io::stdout();
                export(table, self.format, stdout.lock())?;
            }
        }
        Ok(())
    }
}

fn cmd_parse(
    input: &Path,
    header_rows: u8,
    preset: Preset,
    delimiter: char,
    out: &Output,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    if !delimiter.is_ascii() {
        return Err(format!("Delimiter must be a single ASCII character, got '{}'", delimiter).into());
    }
    let options = LoadOptions {
        header_rows: HeaderRows::try_from(header_rows)?,
        delimiter: delimiter as u8,
    };

    let loaded = load(input, options)?;
    eprintln!("   Columns: {}", loaded.header.labels().join(", "));

    let table = normalize(&loaded, &preset.options())?;
    eprintln!("   Normalized: {}", table.columns().join(", "));
    eprintln!("✅ Parsed {} rows", table.len());

    out.write(&table)
}

fn cmd_fixtures(input: &Path, action: FixturesAction, out: &Output) -> Result<(), Box<dyn std::error::Error>> {
    let result = fixtures(input, &FixturesOptions::default())?;

    let table = match action {
        FixturesAction::Clean => {
            for issue in &result.rejected {
                eprintln!("   ⚠️  {}", issue);
            }
            result.matches
        }

        FixturesAction::TeamRows => result.team_rows,

        FixturesAction::Summary {
            start,
            end,
            sort,
            ascending,
        } => {
            let start = start.unwrap_or_else(config::season_start);
            let end = end.unwrap_or_else(config::season_end);
            eprintln!("\n📊 Summary {} → {} (by {})", start, end, sort);
            summarize(&result.team_rows, start, end)?.sort_by(&sort, !ascending)?
        }

        FixturesAction::PlayedAfter { date, limit } => {
            let after = played_after(&result.matches, date)?;
            match limit {
                Some(n) => after.head(n),
                None => after,
            }
        }

        FixturesAction::Match { date, venue } => {
            let venues = venues_on(&result.team_rows, date)?;
            match venue {
                Some(venue) => {
                    let rows = match_rows(&result.team_rows, date, &venue)?;
                    if rows.is_empty() {
                        eprintln!("   No match at {} on {} (venues that day: {})", venue, date, venues.join(", "));
                    }
                    rows
                }
                None => {
                    eprintln!("📍 Venues on {}:", date);
                    for v in &venues {
                        println!("  {}", v);
                    }
                    return Ok(());
                }
            }
        }
    };

    out.write(&table)
}

fn cmd_players(input: &Path, action: PlayersAction, out: &Output) -> Result<(), Box<dyn std::error::Error>> {
    let result = players(input, &PlayersOptions::default())?;

    let table = match action {
        PlayersAction::Top { min } => {
            eprintln!("\n⚽ Players with at least {} goals + assists", min);
            top_contributors(&result.rearranged, min)?
        }
        PlayersAction::Young { born, nineties, all } => {
            if all {
                eprintln!("\n🌱 Players born in {} or later", born);
                young_players(&result.rearranged, born)?
            } else {
                eprintln!("\n🌱 Players born in {} or later with at least {} 90s", born, nineties);
                young_regulars(&result.rearranged, born, nineties)?
            }
        }
    };

    out.write(&table)
}

async fn cmd_serve(mut settings: Settings, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port {
        settings.port = port;
    }
    fbref_lessons::server::start_server(settings).await
}
