//! Period labels used by historical series and forecast paths
//!
//! Three granularities appear in the dataset: annual (`"2024"`),
//! quarterly (`"T3 2025"`) and monthly (`"2025-11"`).

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A calendar period at annual, quarterly or monthly granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Calendar year
    Annual(i32),
    /// Quarter `1..=4` of a year
    Quarter { year: i32, quarter: u32 },
    /// Month `1..=12` of a year
    Month { year: i32, month: u32 },
}

impl Period {
    /// Create a monthly period, validating the month
    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidParameter(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Period::Month { year, month })
    }

    /// Create a quarterly period, validating the quarter
    pub fn quarter(year: i32, quarter: u32) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(ForecastError::InvalidParameter(format!(
                "Quarter must be between 1 and 4, got {}",
                quarter
            )));
        }
        Ok(Period::Quarter { year, quarter })
    }

    /// Calendar year the period belongs to
    pub fn year(&self) -> i32 {
        match *self {
            Period::Annual(year) => year,
            Period::Quarter { year, .. } => year,
            Period::Month { year, .. } => year,
        }
    }

    /// Calendar month the period starts in (1-based)
    pub fn start_month(&self) -> u32 {
        match *self {
            Period::Annual(_) => 1,
            Period::Quarter { quarter, .. } => (quarter - 1) * 3 + 1,
            Period::Month { month, .. } => month,
        }
    }

    /// The period immediately following this one at the same granularity
    pub fn next(&self) -> Period {
        match *self {
            Period::Annual(year) => Period::Annual(year + 1),
            Period::Quarter { year, quarter: 4 } => Period::Quarter {
                year: year + 1,
                quarter: 1,
            },
            Period::Quarter { year, quarter } => Period::Quarter {
                year,
                quarter: quarter + 1,
            },
            Period::Month { year, month: 12 } => Period::Month {
                year: year + 1,
                month: 1,
            },
            Period::Month { year, month } => Period::Month {
                year,
                month: month + 1,
            },
        }
    }

    /// Month containing `date`
    pub fn month_of(date: NaiveDate) -> Period {
        Period::Month {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Quarter containing `date`
    pub fn quarter_of(date: NaiveDate) -> Period {
        Period::Quarter {
            year: date.year(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }

    /// The `count` periods following `self`
    pub fn following(&self, count: usize) -> Vec<Period> {
        let mut periods = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            current = current.next();
            periods.push(current);
        }
        periods
    }

    fn chronological_key(&self) -> (i64, u8) {
        let index = self.year() as i64 * 12 + (self.start_month() as i64 - 1);
        let rank = match self {
            Period::Annual(_) => 0,
            Period::Quarter { .. } => 1,
            Period::Month { .. } => 2,
        };
        (index, rank)
    }
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chronological_key().cmp(&other.chronological_key())
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Annual(year) => write!(f, "{}", year),
            Period::Quarter { year, quarter } => write!(f, "T{} {}", quarter, year),
            Period::Month { year, month } => write!(f, "{}-{:02}", year, month),
        }
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        let invalid = || ForecastError::Schema(format!("Unrecognized period label: {:?}", s));

        if let Some(rest) = label.strip_prefix('T').or_else(|| label.strip_prefix('Q')) {
            let (quarter, year) = rest.split_once(' ').ok_or_else(invalid)?;
            let quarter = quarter.trim().parse().map_err(|_| invalid())?;
            let year = year.trim().parse().map_err(|_| invalid())?;
            return Period::quarter(year, quarter);
        }

        if let Some((year, month)) = label.split_once('-') {
            let year = year.parse().map_err(|_| invalid())?;
            let month = month.parse().map_err(|_| invalid())?;
            return Period::month(year, month);
        }

        label.parse().map(Period::Annual).map_err(|_| invalid())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A single (period, value) point of a historical or institutional series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Period the value refers to
    pub period: Period,
    /// Observed value
    pub value: f64,
}

impl Observation {
    /// Create a new observation
    pub fn new(period: Period, value: f64) -> Self {
        Self { period, value }
    }
}

/// Values of a chronologically sorted copy of `observations`
pub fn sorted_values(observations: &[Observation]) -> Vec<f64> {
    let mut sorted = observations.to_vec();
    sorted.sort_by(|a, b| a.period.cmp(&b.period));
    sorted.into_iter().map(|o| o.value).collect()
}

/// First day of the January following `date`
pub fn next_january(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024", Period::Annual(2024))]
    #[case("T3 2025", Period::Quarter { year: 2025, quarter: 3 })]
    #[case("Q1 2026", Period::Quarter { year: 2026, quarter: 1 })]
    #[case("2025-11", Period::Month { year: 2025, month: 11 })]
    fn test_parse_labels(#[case] label: &str, #[case] expected: Period) {
        assert_eq!(label.parse::<Period>().unwrap(), expected);
    }

    #[rstest]
    #[case("T5 2025")]
    #[case("2025-13")]
    #[case("soon")]
    fn test_reject_invalid_labels(#[case] label: &str) {
        assert!(label.parse::<Period>().is_err());
    }

    #[test]
    fn test_display_matches_dataset_labels() {
        assert_eq!(Period::Quarter { year: 2025, quarter: 3 }.to_string(), "T3 2025");
        assert_eq!(Period::Month { year: 2025, month: 2 }.to_string(), "2025-02");
    }

    #[test]
    fn test_following_wraps_years() {
        let start = Period::month_of(NaiveDate::from_ymd_opt(2026, 11, 15).unwrap());
        let labels: Vec<String> = start.following(3).iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["2026-12", "2027-01", "2027-02"]);

        let quarter = Period::quarter_of(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(quarter, Period::Quarter { year: 2026, quarter: 4 });
        assert_eq!(quarter.next(), Period::Quarter { year: 2027, quarter: 1 });
    }

    #[test]
    fn test_chronological_order() {
        let mut periods = vec![
            "T2 2025".parse::<Period>().unwrap(),
            "T4 2024".parse().unwrap(),
            "T1 2025".parse().unwrap(),
        ];
        periods.sort();
        assert_eq!(periods[0].to_string(), "T4 2024");
        assert_eq!(periods[2].to_string(), "T2 2025");
    }
}
