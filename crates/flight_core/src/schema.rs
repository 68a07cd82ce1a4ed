//! Canonical column names and derived categorical values shared by the
//! normalizer and the dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const AIRLINE: &str = "airline";
pub const CLASS: &str = "class";
pub const PRICE: &str = "price";
pub const DEPARTURE_DATE: &str = "departure_date";
pub const DEPARTURE_CITY: &str = "departure_city";
pub const ARRIVAL_CITY: &str = "arrival_city";
pub const DEPARTURE_TIME: &str = "departure_time";

pub const DAYS_TO_DEPARTURE: &str = "Days_To_Departure";
pub const SEASON: &str = "Season";
pub const TIME_OF_DAY: &str = "Departure_Time";
pub const ROUTE: &str = "route";

/// Source column names in the raw export and their canonical replacements.
pub const COLUMN_RENAMES: [(&str, &str); 4] = [
    ("flight date", DEPARTURE_DATE),
    ("from", DEPARTURE_CITY),
    ("to", ARRIVAL_CITY),
    ("dep_time", DEPARTURE_TIME),
];

/// Map a raw column header to its canonical name. Unknown headers pass
/// through unchanged.
pub fn canonical_column(name: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(raw, _)| *raw == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Meteorological season of a departure date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season for a calendar month (1-12). Months outside that range fall
    /// into the last bucket.
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse bucket of the scheduled departure hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// [5,12) Morning, [12,17) Afternoon, [17,21) Evening, otherwise Night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_partition() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Spring),
            (5, Season::Spring),
            (6, Season::Summer),
            (8, Season::Summer),
            (9, Season::Autumn),
            (11, Season::Autumn),
            (12, Season::Winter),
        ];
        for (month, season) in expected {
            assert_eq!(Season::from_month(month), season, "month {}", month);
        }
    }

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn test_canonical_column_renames() {
        assert_eq!(canonical_column("flight date"), DEPARTURE_DATE);
        assert_eq!(canonical_column("from"), DEPARTURE_CITY);
        assert_eq!(canonical_column("to"), ARRIVAL_CITY);
        assert_eq!(canonical_column("dep_time"), DEPARTURE_TIME);
        assert_eq!(canonical_column("airline"), "airline");
        // Already canonical names are left alone
        assert_eq!(canonical_column(DEPARTURE_CITY), DEPARTURE_CITY);
    }
}
