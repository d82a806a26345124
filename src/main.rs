//! CLI entry point for the meter readings tool.
//!
//! Provides subcommands for logging in, recording water and electricity
//! readings, browsing the history, and charting consumption over time.

use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use meter_readings::{
    auth::{SessionFile, login, require_session},
    charts::{Granularity, Locale, aggregate_with_locale},
    config::Config,
    history::{HistoryFilter, distinct_units, newest_first, paginate, within_last_days},
    output::{print_series_json, render_history, render_series},
    readings::{Category, NewReading},
    store::ReadingStore,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "meter_readings")]
#[command(about = "Record and review water and electricity meter readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with one of the demo accounts
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Register a new reading (requires login)
    Record {
        /// water (agua) or electricity (luz)
        #[arg(short, long, default_value = "water")]
        category: Category,

        /// Reading date, YYYY-MM-DD
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Name of the person taking the reading
        #[arg(short, long, default_value = "")]
        responsible: String,

        /// Consumer unit (hotel or administrative building)
        #[arg(short, long, default_value = "")]
        unit: String,

        #[arg(long, default_value = "")]
        hypolito: String,

        /// Number of guests at the time of the reading
        #[arg(short, long)]
        guests: Option<u32>,

        /// Meter value
        #[arg(short, long)]
        value: Option<f64>,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List recorded readings, most recent first
    History {
        #[arg(short, long)]
        category: Option<Category>,

        /// Only readings for this consumer unit
        #[arg(short, long)]
        unit: Option<String>,

        /// Match responsible name or unit (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },
    /// Delete a reading by id (requires login)
    Delete {
        #[arg(value_name = "ID")]
        id: Uuid,
    },
    /// Chart average consumption per day, week or month
    Chart {
        #[arg(short, long)]
        category: Category,

        /// day, week or month
        #[arg(short, long, default_value = "day")]
        granularity: Granularity,

        /// Only readings from the last N days (defaults to METER_WINDOW_DAYS)
        #[arg(short, long)]
        window_days: Option<u32>,

        /// Label language: pt-BR or en (defaults to METER_LOCALE)
        #[arg(short, long)]
        locale: Option<Locale>,

        /// Print the series as JSON instead of log lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write demo readings if the store is empty
    Seed,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = Config::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = config.log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = config
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("meter_readings.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let sessions = SessionFile::new(&config.data_dir);

    match cli.command {
        Commands::Login { email, password } => {
            let session = login(&email, &password)?;
            sessions.save(&session)?;
            info!("Bem-vindo, {}!", session.user.name);
        }
        Commands::Logout => {
            sessions.clear()?;
            info!("Sessão encerrada");
        }
        Commands::Whoami => match sessions.load() {
            Some(session) => info!(
                user_id = %session.user.id,
                email = %session.user.email,
                "{}",
                session.user.name
            ),
            None => info!("Nenhuma sessão ativa"),
        },
        Commands::Record {
            category,
            date,
            responsible,
            unit,
            hypolito,
            guests,
            value,
            notes,
        } => {
            let form = NewReading {
                category,
                date,
                responsible,
                unit,
                hypolito,
                guests,
                value,
                notes,
            };
            record(&config, &sessions, form)?;
        }
        Commands::History {
            category,
            unit,
            search,
            page,
            per_page,
        } => {
            let filter = HistoryFilter {
                category,
                unit,
                search,
            };
            history(&config, &filter, page.saturating_sub(1), per_page)?;
        }
        Commands::Delete { id } => {
            require_session(&sessions)?;
            let store = ReadingStore::open(&config.data_dir)?;
            if store.delete(id)? {
                info!(%id, "Medição excluída");
            } else {
                info!(%id, "Nenhuma medição com este id");
            }
        }
        Commands::Chart {
            category,
            granularity,
            window_days,
            locale,
            json,
        } => {
            chart(
                &config,
                category,
                granularity,
                window_days.unwrap_or(config.window_days),
                locale.unwrap_or(config.locale),
                json,
            )?;
        }
        Commands::Seed => {
            let store = ReadingStore::open(&config.data_dir)?;
            let written = store.seed_if_empty(today())?;
            if written == 0 {
                info!("Store already has data, nothing seeded");
            }
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Validates the form and appends the new reading to the store.
#[tracing::instrument(skip_all, fields(category = %form.category))]
fn record(config: &Config, sessions: &SessionFile, form: NewReading) -> Result<()> {
    let session = require_session(sessions)?;
    let reading = form.into_reading(Utc::now())?;

    let store = ReadingStore::open(&config.data_dir)?;
    store.append(&reading)?;

    info!(
        id = %reading.id,
        user = %session.user.email,
        "Medição registrada com sucesso!"
    );
    Ok(())
}

/// Prints one page of the filtered history, most recent first.
#[tracing::instrument(skip(config, filter))]
fn history(config: &Config, filter: &HistoryFilter, page: usize, per_page: usize) -> Result<()> {
    let store = ReadingStore::open(&config.data_dir)?;
    let readings = store.load()?;

    let units = distinct_units(&readings);
    info!(units = ?units, "Unidades");

    let mut matching = filter.apply(&readings);
    newest_first(&mut matching);

    render_history(&paginate(matching, page, per_page));
    Ok(())
}

/// Aggregates one category over the rolling window and renders the series.
#[tracing::instrument(skip(config))]
fn chart(
    config: &Config,
    category: Category,
    granularity: Granularity,
    window_days: u32,
    locale: Locale,
    json: bool,
) -> Result<()> {
    let store = ReadingStore::open(&config.data_dir)?;
    let readings = store.load()?;

    let filter = HistoryFilter {
        category: Some(category),
        ..Default::default()
    };
    let recent = within_last_days(filter.apply(&readings), today(), window_days);
    let series: Vec<_> = recent.iter().map(|r| r.as_reading()).collect();

    let points = aggregate_with_locale(&series, granularity, locale);

    if json {
        print_series_json(&points)?;
    } else {
        render_series(category.title(), category.unit(), &points);
    }
    Ok(())
}
