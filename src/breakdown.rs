//! Chart-ready groupings of raw miss records.
//!
//! These produce the data behind the dashboard's by-service, by-route, and
//! over-time views; drawing is left to the presentation layer.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::records::MissRecord;
use crate::schedule::service::{SERVICE_TYPES, ServiceType};
use crate::stats::clean_status;

/// Total misses for one route, with the service type decoded from its code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteMisses {
    pub route: String,
    pub misses: usize,
    pub service: ServiceType,
}

/// Miss count for one service on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub service: String,
    pub misses: usize,
}

/// Misses per service type, in display order.
pub fn service_counts(records: &[MissRecord]) -> Vec<(ServiceType, usize)> {
    SERVICE_TYPES
        .iter()
        .map(|service| {
            let count = records
                .iter()
                .filter(|r| clean_status(&r.service_type) == service.as_str())
                .count();
            (*service, count)
        })
        .collect()
}

/// The `n` routes with the most misses, descending. Ties break on the route
/// code so the ordering is stable.
pub fn top_routes(records: &[MissRecord], n: usize) -> Vec<RouteMisses> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let route = record.route.trim();
        if route.is_empty() {
            continue;
        }
        *counts.entry(route).or_default() += 1;
    }

    let mut rows: Vec<RouteMisses> = counts
        .into_iter()
        .map(|(route, misses)| RouteMisses {
            route: route.to_string(),
            misses,
            service: ServiceType::from_route(route),
        })
        .collect();
    rows.sort_by(|a, b| b.misses.cmp(&a.misses).then_with(|| a.route.cmp(&b.route)));
    rows.truncate(n);
    rows
}

fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Per-date per-service counts for trend lines, sorted by date. Rows with an
/// unparseable date, a blank service, or a date before `min_date` are
/// skipped.
pub fn daily_series(records: &[MissRecord], min_date: NaiveDate) -> Vec<DailySeriesPoint> {
    let mut counts: BTreeMap<(NaiveDate, String), usize> = BTreeMap::new();
    for record in records {
        let Some(date) = parse_record_date(&record.date) else {
            continue;
        };
        if date < min_date {
            continue;
        }
        let service = record.service_type.trim();
        if service.is_empty() {
            continue;
        }
        *counts.entry((date, service.to_string())).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((date, service), misses)| DailySeriesPoint {
            date,
            service,
            misses,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str, service: &str, route: &str, date: &str) -> MissRecord {
        MissRecord {
            address: address.to_string(),
            service_type: service.to_string(),
            route: route.to_string(),
            date: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_service_counts_in_display_order() {
        let records = vec![
            record("1 Main", "MSW", "1021", ""),
            record("2 Main", "msw", "1022", ""),
            record("3 Main", "YW", "1140", ""),
        ];
        let counts = service_counts(&records);

        assert_eq!(
            counts,
            vec![
                (ServiceType::Msw, 2),
                (ServiceType::Ss, 0),
                (ServiceType::Yw, 1),
            ]
        );
    }

    #[test]
    fn test_top_routes_sorts_and_truncates() {
        let records = vec![
            record("1 Main", "MSW", "1021", ""),
            record("2 Main", "MSW", "1021", ""),
            record("3 Main", "SS", "1330", ""),
            record("4 Main", "YW", "1140", ""),
            record("5 Main", "YW", "1140", ""),
            record("6 Main", "YW", "1140", ""),
        ];
        let rows = top_routes(&records, 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].route, "1140");
        assert_eq!(rows[0].misses, 3);
        assert_eq!(rows[0].service, ServiceType::Yw);
        assert_eq!(rows[1].route, "1021");
        assert_eq!(rows[1].service, ServiceType::Msw);
    }

    #[test]
    fn test_top_routes_skips_blank_routes() {
        let records = vec![
            record("1 Main", "MSW", "", ""),
            record("2 Main", "MSW", "  ", ""),
        ];
        assert!(top_routes(&records, 15).is_empty());
    }

    #[test]
    fn test_daily_series_groups_and_filters() {
        let min = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let records = vec![
            record("1 Main", "MSW", "1021", "2025-08-04"),
            record("2 Main", "MSW", "1022", "8/4/2025"),
            record("3 Main", "SS", "1330", "2025-08-04"),
            record("4 Main", "MSW", "1021", "2020-12-31"),
            record("5 Main", "MSW", "1021", "not a date"),
            record("6 Main", "", "1021", "2025-08-04"),
        ];
        let series = daily_series(&records, min);

        let day = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, day);
        assert_eq!(series[0].service, "MSW");
        assert_eq!(series[0].misses, 2);
        assert_eq!(series[1].service, "SS");
        assert_eq!(series[1].misses, 1);
    }
}
