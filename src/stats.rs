use std::collections::HashMap;

use serde::Serialize;

use crate::records::MissRecord;
use crate::schedule::service::ServiceType;

/// Statuses counting as administratively resolved, regardless of legitimacy.
pub const RESOLVED_STATUSES: [&str; 6] = [
    "PICKED UP",
    "REJECTED",
    "CONFIRMED PREMATURE",
    "ONE TIME EXCEPTION",
    "NOT OUT",
    "CREATED IN ERROR",
];

/// The one status meaning the stop was collected late rather than genuinely
/// skipped.
pub const LEGITIMATE_STATUS: &str = "PICKED UP";

/// Key for a statistics bucket: one per service type, plus the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatKey {
    Service(ServiceType),
    All,
}

impl StatKey {
    pub fn label(&self) -> &'static str {
        match self {
            StatKey::Service(service) => service.as_str(),
            StatKey::All => "ALL",
        }
    }
}

/// Resolution and legitimacy counts for one service type (or the aggregate).
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StatsBucket {
    pub total_misses: usize,
    pub legit_misses: usize,
    pub resolved: usize,
    /// `resolved - legit_misses`; kept signed so inconsistent upstream data
    /// surfaces instead of panicking.
    pub illegit_misses: i64,
    pub pct_resolved: f64,
    pub pct_legit: f64,
}

/// Normalizes a status or service cell for comparison.
pub fn clean_status(val: &str) -> String {
    val.trim().to_uppercase()
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Rolls raw records into per-service buckets in a single pass.
///
/// Rows with a blank address are skipped. Every counted row lands in the
/// `All` bucket, and additionally in its service bucket when the Service
/// Type field matches one of `service_types`; unknown service values are
/// still part of the aggregate.
pub fn compute_stats(
    records: &[MissRecord],
    service_types: &[ServiceType],
) -> HashMap<StatKey, StatsBucket> {
    let mut result: HashMap<StatKey, StatsBucket> = HashMap::new();
    for service in service_types {
        result.insert(StatKey::Service(*service), StatsBucket::default());
    }
    result.insert(StatKey::All, StatsBucket::default());

    for row in records {
        if row.address.trim().is_empty() {
            continue;
        }

        let status = clean_status(&row.collection_status);
        let service = clean_status(&row.service_type);
        let is_resolved = RESOLVED_STATUSES.contains(&status.as_str());
        let is_legit = status == LEGITIMATE_STATUS;

        let mut applicable = Vec::with_capacity(2);
        if let Some(known) = service_types.iter().find(|s| s.as_str() == service) {
            applicable.push(StatKey::Service(*known));
        }
        applicable.push(StatKey::All);

        for key in applicable {
            let bucket = result.entry(key).or_default();
            bucket.total_misses += 1;
            if is_legit {
                bucket.legit_misses += 1;
            }
            if is_resolved {
                bucket.resolved += 1;
            }
        }
    }

    for bucket in result.values_mut() {
        bucket.illegit_misses = bucket.resolved as i64 - bucket.legit_misses as i64;
        bucket.pct_resolved = pct(bucket.resolved, bucket.total_misses);
        bucket.pct_legit = pct(bucket.legit_misses, bucket.total_misses);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::service::SERVICE_TYPES;

    fn record(address: &str, status: &str, service: &str) -> MissRecord {
        MissRecord {
            address: address.to_string(),
            collection_status: status.to_string(),
            service_type: service.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_normal_values() {
        assert_eq!(pct(50, 100), 50.0);
        assert_eq!(pct(1, 4), 25.0);
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[], &SERVICE_TYPES);

        assert_eq!(stats.len(), 4);
        for bucket in stats.values() {
            assert_eq!(bucket.total_misses, 0);
            assert_eq!(bucket.pct_resolved, 0.0);
            assert_eq!(bucket.pct_legit, 0.0);
        }
    }

    #[test]
    fn test_compute_stats_counts_and_percentages() {
        let records = vec![
            record("1 Main", "PICKED UP", "MSW"),
            record("2 Main", "REJECTED", "MSW"),
            record("", "PICKED UP", "SS"),
        ];
        let stats = compute_stats(&records, &SERVICE_TYPES);

        let msw = &stats[&StatKey::Service(ServiceType::Msw)];
        assert_eq!(msw.total_misses, 2);
        assert_eq!(msw.legit_misses, 1);
        assert_eq!(msw.resolved, 2);
        assert_eq!(msw.illegit_misses, 1);
        assert_eq!(msw.pct_resolved, 100.0);
        assert_eq!(msw.pct_legit, 50.0);

        // the blank-address row is excluded everywhere
        assert_eq!(stats[&StatKey::All].total_misses, 2);
        assert_eq!(stats[&StatKey::Service(ServiceType::Ss)].total_misses, 0);
    }

    #[test]
    fn test_compute_stats_unknown_service_counts_in_all_only() {
        let records = vec![
            record("1 Main", "NOT OUT", "BULK"),
            record("2 Main", "OPEN", ""),
        ];
        let stats = compute_stats(&records, &SERVICE_TYPES);

        assert_eq!(stats[&StatKey::All].total_misses, 2);
        assert_eq!(stats[&StatKey::All].resolved, 1);
        for service in SERVICE_TYPES {
            assert_eq!(stats[&StatKey::Service(service)].total_misses, 0);
        }
    }

    #[test]
    fn test_compute_stats_normalizes_case_and_whitespace() {
        let records = vec![record("1 Main", "  picked up ", " msw ")];
        let stats = compute_stats(&records, &SERVICE_TYPES);

        let msw = &stats[&StatKey::Service(ServiceType::Msw)];
        assert_eq!(msw.total_misses, 1);
        assert_eq!(msw.legit_misses, 1);
        assert_eq!(msw.resolved, 1);
    }

    #[test]
    fn test_compute_stats_unresolved_status() {
        let records = vec![record("1 Main", "PENDING", "YW")];
        let stats = compute_stats(&records, &SERVICE_TYPES);

        let yw = &stats[&StatKey::Service(ServiceType::Yw)];
        assert_eq!(yw.total_misses, 1);
        assert_eq!(yw.resolved, 0);
        assert_eq!(yw.illegit_misses, 0);
        assert_eq!(yw.pct_resolved, 0.0);
    }

    #[test]
    fn test_compute_stats_is_idempotent() {
        let records = vec![
            record("1 Main", "PICKED UP", "MSW"),
            record("2 Main", "ONE TIME EXCEPTION", "SS"),
        ];
        let first = compute_stats(&records, &SERVICE_TYPES);
        let second = compute_stats(&records, &SERVICE_TYPES);

        assert_eq!(first, second);
    }
}
