//! Counts of routes active in today's operating zone.

use std::collections::HashSet;

use chrono::Weekday;
use serde::Serialize;

use crate::records::AddressRecord;
use crate::schedule::calendar::{YardWasteZone, day_name};
use crate::schedule::service::ServiceType;

/// Distinct active routes per service for one zone day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteCounts {
    pub msw: usize,
    pub ss: usize,
    pub yw: usize,
}

impl RouteCounts {
    pub fn get(&self, service: ServiceType) -> usize {
        match service {
            ServiceType::Msw => self.msw,
            ServiceType::Ss => self.ss,
            ServiceType::Yw => self.yw,
        }
    }
}

fn distinct_routes<'a>(
    addresses: &'a [AddressRecord],
    zone: &str,
    select: impl Fn(&'a AddressRecord) -> (&'a str, &'a str),
    yw_code: Option<&str>,
) -> usize {
    let mut routes: HashSet<&str> = HashSet::new();
    for addr in addresses {
        let (addr_zone, route) = select(addr);
        if !addr_zone.trim().eq_ignore_ascii_case(zone) {
            continue;
        }
        let route = route.trim();
        if let Some(code) = yw_code {
            if !route.ends_with(code) {
                continue;
            }
        }
        routes.insert(route);
    }
    routes.len()
}

/// Counts the distinct routes serving `zone_day` for each service. Zone
/// labels match case-insensitively. Yard-waste routes additionally require
/// the route code to end with the biweekly zone code.
pub fn active_route_counts(
    addresses: &[AddressRecord],
    zone_day: Weekday,
    yw_zone: YardWasteZone,
) -> RouteCounts {
    let zone = day_name(zone_day);
    RouteCounts {
        msw: distinct_routes(
            addresses,
            zone,
            |a| (a.msw_zone.as_str(), a.msw_route.as_str()),
            None,
        ),
        ss: distinct_routes(
            addresses,
            zone,
            |a| (a.ss_zone.as_str(), a.ss_route.as_str()),
            None,
        ),
        yw: distinct_routes(
            addresses,
            zone,
            |a| (a.yw_zone.as_str(), a.yw_route.as_str()),
            Some(yw_zone.code()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(msw: (&str, &str), ss: (&str, &str), yw: (&str, &str)) -> AddressRecord {
        AddressRecord {
            address: "1 Main St".to_string(),
            msw_zone: msw.0.to_string(),
            msw_route: msw.1.to_string(),
            ss_zone: ss.0.to_string(),
            ss_route: ss.1.to_string(),
            yw_zone: yw.0.to_string(),
            yw_route: yw.1.to_string(),
        }
    }

    #[test]
    fn test_counts_distinct_routes_for_zone() {
        let addresses = vec![
            addr(("Monday", "1021"), ("Monday", "1330"), ("Tuesday", "2140")),
            addr(("Monday", "1021"), ("Monday", "1331"), ("Tuesday", "2140")),
            addr(("Tuesday", "1055"), ("Monday", "1330"), ("Tuesday", "2141")),
        ];
        let counts =
            active_route_counts(&addresses, Weekday::Mon, YardWasteZone::Z140);

        assert_eq!(counts.msw, 1);
        assert_eq!(counts.ss, 2);
        assert_eq!(counts.yw, 0);
    }

    #[test]
    fn test_zone_match_is_case_insensitive() {
        let addresses = vec![addr(
            ("monday", "1021"),
            ("MONDAY", "1330"),
            ("Friday", "2140"),
        )];
        let counts =
            active_route_counts(&addresses, Weekday::Mon, YardWasteZone::Z140);

        assert_eq!(counts.msw, 1);
        assert_eq!(counts.ss, 1);
    }

    #[test]
    fn test_yard_waste_filtered_by_zone_code() {
        let addresses = vec![
            addr(("Friday", "1021"), ("Friday", "1330"), ("Tuesday", "2140")),
            addr(("Friday", "1022"), ("Friday", "1330"), ("Tuesday", "2141")),
        ];

        let z140 = active_route_counts(&addresses, Weekday::Tue, YardWasteZone::Z140);
        assert_eq!(z140.yw, 1);
        assert_eq!(z140.msw, 0);

        let z141 = active_route_counts(&addresses, Weekday::Tue, YardWasteZone::Z141);
        assert_eq!(z141.yw, 1);
    }
}
