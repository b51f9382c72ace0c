//! Snapshot Period
//!
//! A period tags a ranking snapshot batch and defines the half-open interval
//! `[start, end)` the batch belongs to. Boundaries are computed in a fixed
//! UTC offset (the deployment's "local" day) and stored in UTC.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[display("daily")]
    Daily,
    #[display("weekly")]
    Weekly,
    #[display("monthly")]
    Monthly,
}

/// Returned when a period tag is not one of `daily`, `weekly`, `monthly`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown period '{0}'")]
pub struct UnknownPeriod(pub String);

/// Half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodBounds {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Daily, Period::Weekly, Period::Monthly];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Interval of this period containing `now`, anchored to `now`'s offset.
    ///
    /// `None` only at the edges of chrono's representable calendar.
    pub fn bounds(&self, now: DateTime<FixedOffset>) -> Option<PeriodBounds> {
        let offset = *now.offset();
        let today = now.date_naive();

        let (start, end) = match self {
            Period::Daily => (today, today.succ_opt()?),
            Period::Weekly => {
                let monday = today
                    .checked_sub_signed(TimeDelta::days(today.weekday().num_days_from_monday().into()))?;
                (monday, monday.checked_add_signed(TimeDelta::days(7))?)
            }
            Period::Monthly => {
                let first = today.with_day(1)?;
                let next = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
                };
                (first, next)
            }
        };

        Some(PeriodBounds {
            start: local_midnight(start, offset),
            end: local_midnight(end, offset),
        })
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    (local - TimeDelta::seconds(offset.local_minus_utc().into())).and_utc()
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 30, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!("daily".parse::<Period>(), Ok(Period::Daily));
        assert_eq!(" Weekly ".parse::<Period>(), Ok(Period::Weekly));
        assert_eq!("monthly".parse::<Period>(), Ok(Period::Monthly));
        assert_eq!(
            "yearly".parse::<Period>(),
            Err(UnknownPeriod("yearly".to_string()))
        );
    }

    #[test]
    fn test_display_matches_code() {
        for period in Period::ALL {
            assert_eq!(period.to_string(), period.code());
        }
    }

    #[test]
    fn test_daily_bounds() {
        let bounds = Period::Daily.bounds(at(0, 2024, 3, 15, 13)).unwrap();
        assert_eq!(bounds.start, utc(2024, 3, 15, 0));
        assert_eq!(bounds.end, utc(2024, 3, 16, 0));
    }

    #[test]
    fn test_daily_bounds_respect_offset() {
        // 01:30 at +03:00 is still the 15th locally
        let bounds = Period::Daily.bounds(at(3, 2024, 3, 15, 1)).unwrap();
        assert_eq!(bounds.start, utc(2024, 3, 14, 21));
        assert_eq!(bounds.end, utc(2024, 3, 15, 21));
    }

    #[test]
    fn test_weekly_bounds_start_on_monday() {
        // 2024-03-15 is a Friday
        let bounds = Period::Weekly.bounds(at(0, 2024, 3, 15, 9)).unwrap();
        assert_eq!(bounds.start, utc(2024, 3, 11, 0));
        assert_eq!(bounds.end, utc(2024, 3, 18, 0));

        // Sunday belongs to the week that started six days earlier
        let sunday = Period::Weekly.bounds(at(0, 2024, 3, 17, 23)).unwrap();
        assert_eq!(sunday.start, utc(2024, 3, 11, 0));

        // Monday starts a new week
        let monday = Period::Weekly.bounds(at(0, 2024, 3, 18, 0)).unwrap();
        assert_eq!(monday.start, utc(2024, 3, 18, 0));
    }

    #[test]
    fn test_monthly_bounds() {
        let bounds = Period::Monthly.bounds(at(0, 2024, 2, 29, 12)).unwrap();
        assert_eq!(bounds.start, utc(2024, 2, 1, 0));
        assert_eq!(bounds.end, utc(2024, 3, 1, 0));

        let december = Period::Monthly.bounds(at(0, 2023, 12, 31, 23)).unwrap();
        assert_eq!(december.end, utc(2024, 1, 1, 0));
    }

    #[test]
    fn test_bounds_contain_now() {
        let now = at(5, 2024, 7, 4, 18);
        for period in Period::ALL {
            let bounds = period.bounds(now).unwrap();
            assert!(bounds.contains(now.with_timezone(&Utc)), "{period}");
            assert!(!bounds.contains(bounds.end));
        }
    }
}
