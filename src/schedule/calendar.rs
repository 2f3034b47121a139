//! Date arithmetic for zones, yard-waste rotation, and log naming.
//!
//! All functions are pure over their date input. [`today_local`] is the one
//! clock read, pinned to the America/New_York operating time zone.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::America::New_York;

/// The biweekly-alternating yard-waste zone code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YardWasteZone {
    Z140,
    Z141,
}

impl YardWasteZone {
    pub fn code(&self) -> &'static str {
        match self {
            YardWasteZone::Z140 => "140",
            YardWasteZone::Z141 => "141",
        }
    }
}

impl std::fmt::Display for YardWasteZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Which daily tab a fetch should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabDay {
    Today,
    Yesterday,
}

/// Weekday labels used in tab names, Monday through Saturday. The logs have
/// no Sunday tab.
const TAB_WEEKDAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Current date in the operating time zone.
pub fn today_local() -> NaiveDate {
    Utc::now().with_timezone(&New_York).date_naive()
}

/// Full weekday name, matching the zone labels in the address list.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// The operating zone for `today`: collection runs one day behind the
/// calendar, so the zone is yesterday's weekday name. Sunday reuses Friday's
/// zone, and Monday wraps around to Sunday.
pub fn operating_zone_day(today: NaiveDate) -> Weekday {
    match today.weekday() {
        Weekday::Sun => Weekday::Fri,
        // one day back from Monday wraps to the end of the week
        Weekday::Mon => Weekday::Sun,
        other => other.pred(),
    }
}

/// The yard-waste zone code for `today`.
///
/// The rotation anchors on the first Monday on or after June 1 of the current
/// year and alternates every two weeks: even week offsets are 140, odd are
/// 141. Dates before the anchor use floor division, so the alternation is
/// continuous across the anchor.
pub fn yard_waste_zone(today: NaiveDate) -> YardWasteZone {
    let june_first = NaiveDate::from_ymd_opt(today.year(), 6, 1).unwrap();
    let to_monday = (7 - june_first.weekday().num_days_from_monday() as i64) % 7;
    let first_monday = june_first + Duration::days(to_monday);
    let weeks_since = (today - first_monday).num_days().div_euclid(7);
    if weeks_since.rem_euclid(2) == 0 {
        YardWasteZone::Z140
    } else {
        YardWasteZone::Z141
    }
}

/// Resolves which date's tab to read for the "today" or "yesterday" view.
///
/// There is no Sunday collection: on Sundays "today" falls back to Saturday,
/// and on Mondays and Sundays "yesterday" skips back two days.
pub fn tab_date(day: TabDay, today: NaiveDate) -> NaiveDate {
    match day {
        TabDay::Today => {
            if today.weekday() == Weekday::Sun {
                today - Duration::days(1)
            } else {
                today
            }
        }
        TabDay::Yesterday => match today.weekday() {
            Weekday::Mon | Weekday::Sun => today - Duration::days(2),
            _ => today - Duration::days(1),
        },
    }
}

/// The Saturday ending the week containing `date` (or `date` itself if it is
/// a Saturday).
pub fn next_saturday(date: NaiveDate) -> NaiveDate {
    let offset = (5 - date.weekday().num_days_from_monday() as i64).rem_euclid(7);
    date + Duration::days(offset)
}

/// Canonical title of the weekly log spreadsheet holding `date`'s records.
pub fn week_ending_title(date: NaiveDate) -> String {
    format!(
        "Misses Week Ending {}",
        next_saturday(date).format("%Y-%m-%d")
    )
}

/// Canonical label of the daily tab holding `date`'s records, e.g.
/// `"Wednesday 8/6/25"`. Month and day are not zero-padded; the year is two
/// digits. Dates outside the Monday..Saturday range fall back to the Monday
/// label.
pub fn daily_tab_label(date: NaiveDate) -> String {
    let monday = next_saturday(date) - Duration::days(5);
    let idx = (date - monday).num_days();
    let label = if (0..6).contains(&idx) {
        TAB_WEEKDAYS[idx as usize]
    } else {
        TAB_WEEKDAYS[0]
    };
    format!(
        "{} {}/{}/{:02}",
        label,
        date.month(),
        date.day(),
        date.year() % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_operating_zone_is_previous_day() {
        // 2025-08-05 is a Tuesday
        assert_eq!(operating_zone_day(date(2025, 8, 5)), Weekday::Mon);
        assert_eq!(operating_zone_day(date(2025, 8, 2)), Weekday::Fri);
    }

    #[test]
    fn test_operating_zone_sunday_reuses_friday() {
        assert_eq!(operating_zone_day(date(2025, 8, 3)), Weekday::Fri);
    }

    #[test]
    fn test_operating_zone_monday_wraps_to_sunday() {
        assert_eq!(operating_zone_day(date(2025, 8, 4)), Weekday::Sun);
    }

    #[test]
    fn test_operating_zone_friday_only_on_sunday_or_saturday() {
        // zone == Friday exactly when today is Sunday or Saturday
        let mut d = date(2025, 1, 1);
        let end = date(2026, 1, 1);
        while d < end {
            let zone = operating_zone_day(d);
            if d.weekday() == Weekday::Sun || d.weekday() == Weekday::Sat {
                assert_eq!(zone, Weekday::Fri, "{d}");
            } else {
                assert_ne!(zone, Weekday::Fri, "{d}");
            }
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_yard_waste_zone_alternates_biweekly() {
        // first Monday on/after 2025-06-01 is 2025-06-02
        let anchor = date(2025, 6, 2);
        assert_eq!(yard_waste_zone(anchor), YardWasteZone::Z140);
        assert_eq!(yard_waste_zone(anchor + Duration::days(7)), YardWasteZone::Z141);
        assert_eq!(yard_waste_zone(anchor + Duration::days(14)), YardWasteZone::Z140);
        // still 140 later in the anchor week
        assert_eq!(yard_waste_zone(anchor + Duration::days(5)), YardWasteZone::Z140);
    }

    #[test]
    fn test_yard_waste_zone_before_anchor_floors() {
        // the week ending at the anchor is one week back, not truncated to zero
        assert_eq!(yard_waste_zone(date(2025, 6, 1)), YardWasteZone::Z141);
        assert_eq!(yard_waste_zone(date(2025, 5, 26)), YardWasteZone::Z141);
        assert_eq!(yard_waste_zone(date(2025, 5, 19)), YardWasteZone::Z140);
    }

    #[test]
    fn test_tab_date_today() {
        // Wednesday stays put
        assert_eq!(tab_date(TabDay::Today, date(2025, 8, 6)), date(2025, 8, 6));
        // Sunday reads Saturday's tab
        assert_eq!(tab_date(TabDay::Today, date(2025, 8, 3)), date(2025, 8, 2));
    }

    #[test]
    fn test_tab_date_yesterday() {
        assert_eq!(
            tab_date(TabDay::Yesterday, date(2025, 8, 6)),
            date(2025, 8, 5)
        );
        // Monday skips Sunday back to Saturday
        assert_eq!(
            tab_date(TabDay::Yesterday, date(2025, 8, 4)),
            date(2025, 8, 2)
        );
        // Sunday skips back to Friday
        assert_eq!(
            tab_date(TabDay::Yesterday, date(2025, 8, 3)),
            date(2025, 8, 1)
        );
    }

    #[test]
    fn test_week_ending_title() {
        assert_eq!(
            week_ending_title(date(2025, 8, 6)),
            "Misses Week Ending 2025-08-09"
        );
        // a Saturday is its own week ending
        assert_eq!(
            week_ending_title(date(2025, 8, 9)),
            "Misses Week Ending 2025-08-09"
        );
    }

    #[test]
    fn test_next_saturday_bounds() {
        let mut d = date(2025, 1, 1);
        let end = date(2025, 3, 1);
        while d < end {
            let sat = next_saturday(d);
            assert_eq!(sat.weekday(), Weekday::Sat);
            assert!(sat >= d && sat <= d + Duration::days(6));
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_daily_tab_label() {
        assert_eq!(daily_tab_label(date(2025, 8, 6)), "Wednesday 8/6/25");
        assert_eq!(daily_tab_label(date(2025, 8, 9)), "Saturday 8/9/25");
        // no zero padding on month or day
        assert_eq!(daily_tab_label(date(2025, 1, 2)), "Thursday 1/2/25");
    }

    #[test]
    fn test_daily_tab_label_sunday_clamps_to_monday() {
        // Sunday sits before its week's Monday; the label falls back to Monday
        assert_eq!(daily_tab_label(date(2025, 8, 3)), "Monday 8/3/25");
    }
}
