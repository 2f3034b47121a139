//! CLI entry point for the missed-stops operations tool.
//!
//! Provides subcommands for printing today's zone assignments, rendering the
//! operations dashboard, and exporting per-window statistics and route
//! breakdowns.

mod infra;
mod services;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use missed_stops_ops::breakdown;
use missed_stops_ops::output;
use missed_stops_ops::schedule::calendar;
use missed_stops_ops::schedule::routes::active_route_counts;
use missed_stops_ops::schedule::service::SERVICE_TYPES;
use missed_stops_ops::stats::compute_stats;

use crate::infra::config::{OpsConfig, Role, SheetsAuth};
use crate::infra::sheets::SheetsClient;
use crate::services::cache::CachedSource;
use crate::services::record_source::{ALL_WINDOWS, FetchError, RecordSource, Window};

/// How long fetched windows are served from memory before re-reading.
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "missed_stops_ops")]
#[command(about = "Operations reporting for missed waste-collection stops", long_about = None)]
struct Cli {
    /// Path to the deployment config JSON
    #[arg(short, long, default_value = "ops_config.json", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print today's operating zone and yard-waste zone code
    Zone,
    /// Render zone assignments, route counts, and all stats windows
    Dashboard {
        /// Username to run the dashboard as
        #[arg(short, long)]
        user: String,
    },
    /// Compute missed-stop statistics for one reporting window
    Stats {
        /// Reporting window
        #[arg(short, long, value_enum)]
        period: Window,

        /// CSV file to append the stats rows to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the routes with the most missed stops in a window
    Routes {
        /// Reporting window
        #[arg(short, long, value_enum)]
        period: Window,

        /// Number of routes to list
        #[arg(short, long, default_value_t = 15)]
        top: usize,
    },
    /// Print the per-day per-service counts behind the trend charts
    Trend {
        /// Reporting window
        #[arg(short, long, value_enum, default_value = "all-time")]
        period: Window,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/missed_stops_ops.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("missed_stops_ops.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Zone => {
            zone_summary();
        }
        Commands::Dashboard { user } => {
            let config = OpsConfig::load(&cli.config)?;
            let profile = config
                .user(&user)
                .ok_or_else(|| anyhow::anyhow!("unknown user '{user}'"))?;
            info!(%user, display_name = %profile.display_name, "User signed in");

            if profile.role != Role::Jpm {
                info!("Operations dashboard is limited to JPM staff; showing zone summary only");
                zone_summary();
                return Ok(());
            }

            let source = connect(&config).await?;
            dashboard(&config, &source).await?;
        }
        Commands::Stats { period, output } => {
            let config = OpsConfig::load(&cli.config)?;
            let source = connect(&config).await?;

            let records = source.fetch_records(period).await?;
            let stats = compute_stats(&records, &SERVICE_TYPES);

            println!("{}", period.label());
            println!("{}", output::stats_table(&stats, &SERVICE_TYPES));

            if let Some(path) = output {
                output::append_stats_csv(&path, period.label(), &stats, &SERVICE_TYPES)?;
                info!(%path, "Stats rows appended");
            }
        }
        Commands::Routes { period, top } => {
            let config = OpsConfig::load(&cli.config)?;
            let source = connect(&config).await?;

            let records = source.fetch_records(period).await?;
            let rows = breakdown::top_routes(&records, top);

            if rows.is_empty() {
                println!("No route data for {}", period.label());
            } else {
                println!("{}", output::routes_table(&rows));
            }
        }
        Commands::Trend { period } => {
            let config = OpsConfig::load(&cli.config)?;
            let source = connect(&config).await?;

            let records = source.fetch_records(period).await?;
            let min_date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
            let series = breakdown::daily_series(&records, min_date);

            if series.is_empty() {
                println!("No date/service data for {}", period.label());
            } else {
                println!("{}", output::trend_table(&series));
            }
        }
    }

    Ok(())
}

/// Builds the cached sheets-backed record source from config and env
/// credentials.
async fn connect(config: &OpsConfig) -> Result<CachedSource<SheetsClient>> {
    let auth = SheetsAuth::from_env()?;
    let client = SheetsClient::new(&auth, config.folder_id.clone()).await?;
    Ok(CachedSource::new(client, CACHE_TTL))
}

/// Prints today's operating zone and yard-waste zone code.
fn zone_summary() {
    let today = calendar::today_local();
    let zone_day = calendar::operating_zone_day(today);
    let yw_zone = calendar::yard_waste_zone(today);

    println!("Today's Zone: {}", calendar::day_name(zone_day));
    println!("Weekly Yard Waste Zone: {}", yw_zone.code());
}

/// Renders the full dashboard: zone summary, active-route counts, then the
/// stats table and service breakdown for every reporting window.
#[tracing::instrument(skip(config, source))]
async fn dashboard(config: &OpsConfig, source: &CachedSource<SheetsClient>) -> Result<()> {
    zone_summary();
    println!();

    let today = calendar::today_local();
    let zone_day = calendar::operating_zone_day(today);
    let yw_zone = calendar::yard_waste_zone(today);

    match source.inner().address_records(&config.address_sheet_id).await {
        Ok(addresses) if !addresses.is_empty() => {
            let counts = active_route_counts(&addresses, zone_day, yw_zone);
            println!("Route Counts by Service");
            println!("{}", output::route_counts_table(&counts));
            println!();
        }
        Ok(_) => info!("Address list is empty; skipping route counts"),
        Err(e) => warn!(error = %e, "Failed to load address list; skipping route counts"),
    }

    for window in ALL_WINDOWS {
        let records = match source.fetch_records(window).await {
            Ok(records) => records,
            Err(e @ FetchError::MissingWeeklyLog { .. }) => {
                // Operator has to create the sheet; stop rendering here.
                error!(error = %e, "Cannot render the weekly view");
                println!("{e}");
                return Ok(());
            }
            Err(FetchError::Backend { message }) => {
                return Err(anyhow::anyhow!(message));
            }
        };

        let stats = compute_stats(&records, &SERVICE_TYPES);
        println!("{}", window.label());
        println!("{}", output::stats_table(&stats, &SERVICE_TYPES));

        if records.is_empty() {
            println!("No data for {}", window.label());
        } else {
            let by_service: Vec<String> = breakdown::service_counts(&records)
                .into_iter()
                .map(|(service, count)| format!("{service} {count}"))
                .collect();
            println!("Misses by Service: {}", by_service.join(" | "));
        }
        println!();
    }

    Ok(())
}
