//! Frequency tags and period advancement.
//!
//! Recurring transactions, subscriptions and recurring reminders share one table that
//! maps a frequency tag to a date-advance step. Tags the table does not know fall back
//! to a one-month step rather than failing, so a bad tag in the store never stalls a
//! tick.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known recurrence frequencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every day
    Daily,
    /// Every seven days
    Weekly,
    /// Same day next calendar month
    Monthly,
    /// Three calendar months
    Quarterly,
    /// One calendar year
    Yearly,
}

type Step = fn(NaiveDate) -> Option<NaiveDate>;

/// Tag → step lookup. Month arithmetic clamps to the last day of shorter months.
const ADVANCE_TABLE: [(Frequency, Step); 5] = [
    (Frequency::Daily, add_one_day),
    (Frequency::Weekly, add_one_week),
    (Frequency::Monthly, add_one_month),
    (Frequency::Quarterly, add_one_quarter),
    (Frequency::Yearly, add_one_year),
];

/// Step used for tags that are not in [`ADVANCE_TABLE`]
const FALLBACK_STEP: Step = add_one_month;

fn add_one_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

fn add_one_week(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(7))
}

fn add_one_month(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

fn add_one_quarter(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(3))
}

fn add_one_year(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(12))
}

impl Frequency {
    /// Tag stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Parses a stored tag, ignoring ASCII case. Returns `None` for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        ADVANCE_TABLE
            .iter()
            .map(|(frequency, _)| *frequency)
            .find(|frequency| frequency.as_str().eq_ignore_ascii_case(tag.trim()))
    }

    /// Advances `date` by exactly one period.
    #[must_use]
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        step_for(Some(self))(date)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| crate::errors::Error::Config {
            message: format!("Unknown frequency: {s}"),
        })
    }
}

fn step_for(frequency: Option<Frequency>) -> Step {
    frequency
        .and_then(|wanted| {
            ADVANCE_TABLE
                .iter()
                .find(|(frequency, _)| *frequency == wanted)
                .map(|(_, step)| *step)
        })
        .unwrap_or(FALLBACK_STEP)
}

/// Advances `date` by one period of the frequency named by `tag`.
///
/// Unknown tags advance by one month. Returns `None` only if the result would fall
/// outside chrono's calendar range.
#[must_use]
pub fn advance_by_tag(date: NaiveDate, tag: &str) -> Option<NaiveDate> {
    let frequency = Frequency::from_tag(tag);
    if frequency.is_none() {
        tracing::warn!("Unknown frequency tag {tag:?}, advancing by one month");
    }
    step_for(frequency)(date)
}

/// Same as [`advance_by_tag`] for a timestamp; the time of day is kept.
#[must_use]
pub fn advance_instant_by_tag(instant: DateTime<Utc>, tag: &str) -> Option<DateTime<Utc>> {
    let date = advance_by_tag(instant.date_naive(), tag)?;
    Some(date.and_time(instant.time()).and_utc())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_advance_table() {
        let start = date(2024, 1, 15);
        assert_eq!(advance_by_tag(start, "daily"), Some(date(2024, 1, 16)));
        assert_eq!(advance_by_tag(start, "weekly"), Some(date(2024, 1, 22)));
        assert_eq!(advance_by_tag(start, "monthly"), Some(date(2024, 2, 15)));
        assert_eq!(advance_by_tag(start, "quarterly"), Some(date(2024, 4, 15)));
        assert_eq!(advance_by_tag(start, "yearly"), Some(date(2025, 1, 15)));
    }

    #[test]
    fn test_unknown_tag_falls_back_to_monthly() {
        let start = date(2024, 1, 15);
        assert_eq!(advance_by_tag(start, "fortnightly"), Some(date(2024, 2, 15)));
        assert_eq!(advance_by_tag(start, ""), Some(date(2024, 2, 15)));
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        assert_eq!(Frequency::from_tag("Weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::from_tag(" YEARLY "), Some(Frequency::Yearly));
        assert_eq!(Frequency::from_tag("biweekly"), None);
    }

    #[test]
    fn test_month_end_clamps() {
        assert_eq!(advance_by_tag(date(2024, 1, 31), "monthly"), Some(date(2024, 2, 29)));
        assert_eq!(advance_by_tag(date(2023, 11, 30), "quarterly"), Some(date(2024, 2, 29)));
        assert_eq!(advance_by_tag(date(2024, 2, 29), "yearly"), Some(date(2025, 2, 28)));
    }

    #[test]
    fn test_advance_across_year_boundary() {
        assert_eq!(advance_by_tag(date(2024, 12, 31), "daily"), Some(date(2025, 1, 1)));
        assert_eq!(advance_by_tag(date(2024, 12, 15), "monthly"), Some(date(2025, 1, 15)));
    }

    #[test]
    fn test_advance_instant_keeps_time_of_day() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let next = advance_instant_by_tag(at, "weekly").unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 8, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_round_trip_through_str() {
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::Yearly,
        ] {
            assert_eq!(frequency.to_string().parse::<Frequency>().unwrap(), frequency);
        }
        assert!("never".parse::<Frequency>().is_err());
    }
}
