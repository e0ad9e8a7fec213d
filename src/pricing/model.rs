//! # Pricing Models
//!
//! Zone prices are the base: one price per (variant, zone, service type).
//! A daily special ("Sub del Día") overrides the base price inside its
//! weekday/time window and suppresses every other discount on that line.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::{Money, ServiceType, WeekdaySet, Zone};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonePrice {
    pub variant_id: i64,
    pub zone: Zone,
    pub service_type: ServiceType,
    pub price: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySpecial {
    pub id: i64,
    pub variant_id: i64,
    pub special_price: Money,
    pub weekdays: WeekdaySet,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub active: bool,
}

impl DailySpecial {
    /// Whether the special covers the given local instant. A window with
    /// `starts_at > ends_at` crosses midnight and belongs to the day it
    /// starts on.
    pub fn covers(&self, at: NaiveDateTime) -> bool {
        self.active && crate::types::window_covers(self.weekdays, self.starts_at, self.ends_at, at)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewDailySpecial {
    pub variant_id: i64,
    pub special_price: Money,
    pub weekdays: WeekdaySet,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

/// Where a quoted unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuoteSource {
    Base,
    DailySpecial { special_id: i64 },
}

/// Unit price for one variant at one instant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Quote {
    pub unit_price: Money,
    pub source: QuoteSource,
}

impl Quote {
    pub fn is_daily_special(&self) -> bool {
        matches!(self.source, QuoteSource::DailySpecial { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn special(weekdays: WeekdaySet, starts: (u32, u32), ends: (u32, u32)) -> DailySpecial {
        DailySpecial {
            id: 1,
            variant_id: 1,
            special_price: 25_000,
            weekdays,
            starts_at: NaiveTime::from_hms_opt(starts.0, starts.1, 0).unwrap(),
            ends_at: NaiveTime::from_hms_opt(ends.0, ends.1, 0).unwrap(),
            active: true,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_simple_window() {
        // 2026-08-03 is a Monday.
        let s = special(WeekdaySet::from_days(&[chrono::Weekday::Mon]), (11, 0), (14, 0));

        assert!(s.covers(at(2026, 8, 3, 12, 0)));
        assert!(!s.covers(at(2026, 8, 3, 14, 0))); // end exclusive
        assert!(!s.covers(at(2026, 8, 3, 10, 59)));
        assert!(!s.covers(at(2026, 8, 4, 12, 0))); // Tuesday
    }

    #[test]
    fn test_midnight_crossing_window() {
        // Friday 22:00 - 02:00: Saturday 01:00 still counts as Friday's window.
        let s = special(WeekdaySet::from_days(&[chrono::Weekday::Fri]), (22, 0), (2, 0));

        assert!(s.covers(at(2026, 8, 7, 23, 0))); // Friday night
        assert!(s.covers(at(2026, 8, 8, 1, 0))); // Saturday small hours
        assert!(!s.covers(at(2026, 8, 8, 3, 0)));
        assert!(!s.covers(at(2026, 8, 8, 23, 0))); // Saturday night: not Friday's window
    }

    #[test]
    fn test_inactive_special_never_covers() {
        let mut s = special(WeekdaySet::all(), (0, 0), (23, 59));
        s.active = false;
        assert!(!s.covers(at(2026, 8, 3, 12, 0)));
    }
}
