//! Output formatting and persistence for missed-stop statistics.
//!
//! Supports text tables, JSON logging, and CSV append.

use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use tracing::{debug, info};

use crate::breakdown::{DailySeriesPoint, RouteMisses};
use crate::schedule::routes::RouteCounts;
use crate::schedule::service::{SERVICE_TYPES, ServiceType};
use crate::stats::{StatKey, StatsBucket};

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Submitted")]
    submitted: usize,
    #[tabled(rename = "Resolved")]
    resolved: usize,
    #[tabled(rename = "% Resolved")]
    pct_resolved: String,
    #[tabled(rename = "Legitimate")]
    legitimate: usize,
    #[tabled(rename = "Illegitimate")]
    illegitimate: i64,
    #[tabled(rename = "% Legitimate")]
    pct_legit: String,
}

fn ordered_keys(service_types: &[ServiceType]) -> Vec<StatKey> {
    let mut keys = vec![StatKey::All];
    keys.extend(service_types.iter().map(|s| StatKey::Service(*s)));
    keys
}

/// Renders the stats mapping as a text table, the aggregate row first.
pub fn stats_table(
    stats: &HashMap<StatKey, StatsBucket>,
    service_types: &[ServiceType],
) -> String {
    let rows: Vec<StatsRow> = ordered_keys(service_types)
        .into_iter()
        .filter_map(|key| {
            let bucket = stats.get(&key)?;
            Some(StatsRow {
                service: match key {
                    StatKey::All => "Total".to_string(),
                    StatKey::Service(s) => s.as_str().to_string(),
                },
                submitted: bucket.total_misses,
                resolved: bucket.resolved,
                pct_resolved: format!("{:.1}%", bucket.pct_resolved),
                legitimate: bucket.legit_misses,
                illegitimate: bucket.illegit_misses,
                pct_legit: format!("{:.1}%", bucket.pct_legit),
            })
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

#[derive(Tabled)]
struct RouteRow {
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Service")]
    service: ServiceType,
    #[tabled(rename = "Misses")]
    misses: usize,
}

/// Renders a route breakdown as a text table.
pub fn routes_table(rows: &[RouteMisses]) -> String {
    let rows: Vec<RouteRow> = rows
        .iter()
        .map(|r| RouteRow {
            route: r.route.clone(),
            service: r.service,
            misses: r.misses,
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

#[derive(Tabled)]
struct RouteCountRow {
    #[tabled(rename = "Service")]
    service: &'static str,
    #[tabled(rename = "Active Routes")]
    routes: usize,
}

/// Renders today's active-route counts per service.
pub fn route_counts_table(counts: &RouteCounts) -> String {
    let rows: Vec<RouteCountRow> = SERVICE_TYPES
        .iter()
        .map(|service| RouteCountRow {
            service: service.as_str(),
            routes: counts.get(*service),
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Misses")]
    misses: usize,
}

/// Renders a daily series as a text table.
pub fn trend_table(series: &[DailySeriesPoint]) -> String {
    let rows: Vec<TrendRow> = series
        .iter()
        .map(|p| TrendRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            service: p.service.clone(),
            misses: p.misses,
        })
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

/// Logs the stats mapping as pretty-printed JSON, keyed by bucket label.
pub fn print_json(stats: &HashMap<StatKey, StatsBucket>) -> Result<()> {
    let by_label: BTreeMap<&str, &StatsBucket> =
        stats.iter().map(|(key, bucket)| (key.label(), bucket)).collect();
    info!("{}", serde_json::to_string_pretty(&by_label)?);
    Ok(())
}

#[derive(Serialize)]
struct StatsCsvRow<'a> {
    period: &'a str,
    service: &'a str,
    submitted: usize,
    resolved: usize,
    pct_resolved: f64,
    legitimate: usize,
    illegitimate: i64,
    pct_legit: f64,
}

/// Appends one CSV row per bucket to `path`.
///
/// Creates the file with headers if it does not already exist.
pub fn append_stats_csv(
    path: &str,
    period: &str,
    stats: &HashMap<StatKey, StatsBucket>,
    service_types: &[ServiceType],
) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending stats CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for key in ordered_keys(service_types) {
        if let Some(bucket) = stats.get(&key) {
            writer.serialize(StatsCsvRow {
                period,
                service: key.label(),
                submitted: bucket.total_misses,
                resolved: bucket.resolved,
                pct_resolved: bucket.pct_resolved,
                legitimate: bucket.legit_misses,
                illegitimate: bucket.illegit_misses,
                pct_legit: bucket.pct_legit,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}
