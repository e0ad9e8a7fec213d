//! # Shared domain types
//!
//! Money, delivery zones, service types and weekday sets used across
//! pricing, promotions, carts and orders.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Monetary amount in integer minor units. No floats in money math.
pub type Money = i64;

/// Delivery zone a price or promotion is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Capital,
    Interior,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Capital => "capital",
            Zone::Interior => "interior",
        }
    }
}

impl FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "capital" => Ok(Zone::Capital),
            "interior" => Ok(Zone::Interior),
            other => Err(format!("unknown zone `{other}`")),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Pickup,
    Delivery,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Pickup => "pickup",
            ServiceType::Delivery => "delivery",
        }
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(ServiceType::Pickup),
            "delivery" => Ok(ServiceType::Delivery),
            other => Err(format!("unknown service type `{other}`")),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of weekdays a rule is active on, stored as a 7-bit mask
/// (bit 0 = Monday per ISO ordering).
///
/// Serializes as a list of short lowercase day names so rule payloads
/// stay readable: `["mon", "wed", "fri"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekdaySet(u8);

const DAY_NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

impl WeekdaySet {
    /// Empty set. A rule with an empty set matches no day.
    pub fn empty() -> Self {
        WeekdaySet(0)
    }

    /// Every day of the week.
    pub fn all() -> Self {
        WeekdaySet(0b0111_1111)
    }

    pub fn from_days(days: &[Weekday]) -> Self {
        let mut set = WeekdaySet(0);
        for day in days {
            set.insert(*day);
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Raw mask for storage. `from_mask` masks out the unused high bit.
    pub fn mask(&self) -> u8 {
        self.0
    }

    pub fn from_mask(mask: u8) -> Self {
        WeekdaySet(mask & 0b0111_1111)
    }
}

fn day_index(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

fn day_from_name(name: &str) -> Option<Weekday> {
    match name {
        "mon" => Some(Weekday::Mon),
        "tue" => Some(Weekday::Tue),
        "wed" => Some(Weekday::Wed),
        "thu" => Some(Weekday::Thu),
        "fri" => Some(Weekday::Fri),
        "sat" => Some(Weekday::Sat),
        "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let days: Vec<&str> = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .iter()
        .filter(|d| self.contains(**d))
        .map(|d| DAY_NAMES[day_index(*d)])
        .collect();

        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(day)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DaysVisitor;

        impl<'de> Visitor<'de> for DaysVisitor {
            type Value = WeekdaySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of day names like [\"mon\", \"fri\"]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = WeekdaySet::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    let day = day_from_name(&name)
                        .ok_or_else(|| de::Error::custom(format!("unknown day `{name}`")))?;
                    set.insert(day);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(DaysVisitor)
    }
}

/// Whether a weekday-masked time window covers a local instant.
///
/// A window with `starts_at > ends_at` crosses midnight; its weekday is
/// the day the window starts, so the after-midnight tail belongs to the
/// previous day's entry.
pub fn window_covers(
    weekdays: WeekdaySet,
    starts_at: chrono::NaiveTime,
    ends_at: chrono::NaiveTime,
    at: chrono::NaiveDateTime,
) -> bool {
    use chrono::Datelike;

    let t = at.time();
    if starts_at <= ends_at {
        weekdays.contains(at.weekday()) && t >= starts_at && t < ends_at
    } else if t >= starts_at {
        weekdays.contains(at.weekday())
    } else if t < ends_at {
        weekdays.contains(at.weekday().pred())
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_round_trip() {
        assert_eq!("capital".parse::<Zone>().unwrap(), Zone::Capital);
        assert_eq!(Zone::Interior.as_str(), "interior");
        assert!("moon".parse::<Zone>().is_err());
    }

    #[test]
    fn test_weekday_set_membership() {
        let set = WeekdaySet::from_days(&[Weekday::Mon, Weekday::Fri]);
        assert!(set.contains(Weekday::Mon));
        assert!(set.contains(Weekday::Fri));
        assert!(!set.contains(Weekday::Sun));
    }

    #[test]
    fn test_weekday_set_mask_round_trip() {
        let set = WeekdaySet::from_days(&[Weekday::Tue, Weekday::Sat]);
        assert_eq!(WeekdaySet::from_mask(set.mask()), set);
        // High bit is ignored
        assert_eq!(WeekdaySet::from_mask(0b1000_0000), WeekdaySet::empty());
    }

    #[test]
    fn test_weekday_set_serde() {
        let set = WeekdaySet::from_days(&[Weekday::Mon, Weekday::Wed]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["mon","wed"]"#);

        let parsed: WeekdaySet = serde_json::from_str(r#"["wed","mon"]"#).unwrap();
        assert_eq!(parsed, set);

        assert!(serde_json::from_str::<WeekdaySet>(r#"["noday"]"#).is_err());
    }

    #[test]
    fn test_weekday_set_all() {
        let all = WeekdaySet::all();
        for day in [Weekday::Mon, Weekday::Thu, Weekday::Sun] {
            assert!(all.contains(day));
        }
    }
}
