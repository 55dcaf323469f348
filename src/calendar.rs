//! Month lengths, day ranges and hour selections.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{Era5Error, Result};

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Ok(31),
        4 | 6 | 9 | 11 => Ok(30),
        2 if is_leap_year(year) => Ok(29),
        2 => Ok(28),
        _ => Err(Era5Error::InvalidMonth(month)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An inclusive range of days within a single month.
pub struct DayRange {
    pub year: i32,
    pub month: u32,
    pub start: u32,
    pub end: u32,
}

impl DayRange {
    /// Fills in the defaults (first and last day of the month) and validates the range.
    pub fn resolve(year: i32, month: u32, start: Option<u32>, end: Option<u32>) -> Result<Self> {
        let max = days_in_month(year, month)?;
        let start = start.unwrap_or(1);
        let end = end.unwrap_or(max);

        for day in [start, end] {
            if day == 0 || day > max {
                return Err(Era5Error::InvalidDay { day, month, max });
            }
        }
        if start > end {
            return Err(Era5Error::InvalidDayRange { start, end });
        }

        Ok(DayRange {
            year,
            month,
            start,
            end,
        })
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn days(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days()
            .filter_map(move |day| NaiveDate::from_ymd_opt(self.year, self.month, day))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A sorted, deduplicated set of UTC hours.
pub struct Hours(Vec<u32>);

impl Hours {
    pub fn all() -> Self {
        Hours((0..24).collect())
    }

    /// Parses a comma separated list of hours and `a-b` ranges, e.g. `0-5,12,18`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Era5Error::InvalidHours(s.to_string());
        let parse_hour = |part: &str| -> Result<u32> {
            part.trim()
                .parse::<u32>()
                .ok()
                .filter(|h| *h < 24)
                .ok_or_else(invalid)
        };

        let mut hours = Vec::new();
        for part in s.split(',').map(str::trim) {
            if part.is_empty() {
                return Err(invalid());
            }
            match part.split_once('-') {
                Some((from, to)) => {
                    let (from, to) = (parse_hour(from)?, parse_hour(to)?);
                    if from > to {
                        return Err(invalid());
                    }
                    hours.extend(from..=to);
                }
                None => hours.push(parse_hour(part)?),
            }
        }

        hours.sort_unstable();
        hours.dedup();

        Ok(Hours(hours))
    }

    fn is_contiguous(&self) -> bool {
        self.0.windows(2).all(|w| w[1] == w[0] + 1)
    }
}

#[cfg(test)]
impl DayRange {
    /// The whole month.
    pub fn full_month(year: i32, month: u32) -> Result<Self> {
        Self::resolve(year, month, None, None)
    }
}

#[cfg(test)]
impl Hours {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Default for Hours {
    fn default() -> Self {
        Hours::all()
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [first, .., last] if self.is_contiguous() => write!(f, "{:02}-{:02}", first, last),
            hours => {
                let parts: Vec<String> = hours.iter().map(|h| format!("{:02}", h)).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_give_31_days_for_long_months() {
        for month in [1, 3, 5, 7, 8, 10, 12] {
            assert_eq!(days_in_month(2014, month).unwrap(), 31);
        }
    }

    #[test]
    fn should_give_30_days_for_short_months() {
        for month in [4, 6, 9, 11] {
            assert_eq!(days_in_month(2014, month).unwrap(), 30);
        }
        assert_eq!(days_in_month(2014, 6).unwrap(), 30);
    }

    #[test]
    fn should_apply_leap_rule_to_february() {
        assert_eq!(days_in_month(2016, 2).unwrap(), 29);
        assert_eq!(days_in_month(2015, 2).unwrap(), 28);
        assert_eq!(days_in_month(1900, 2).unwrap(), 28);
        assert_eq!(days_in_month(2000, 2).unwrap(), 29);
    }

    #[test]
    fn should_reject_invalid_month() {
        assert!(matches!(days_in_month(2014, 0), Err(Era5Error::InvalidMonth(0))));
        assert!(matches!(days_in_month(2014, 13), Err(Era5Error::InvalidMonth(13))));
    }

    #[test]
    fn should_default_to_whole_month() {
        let range = DayRange::resolve(2016, 2, None, None).unwrap();
        assert_eq!((range.start, range.end), (1, 29));
        assert_eq!(range.len(), 29);

        let range = DayRange::resolve(2014, 5, Some(10), None).unwrap();
        assert_eq!((range.start, range.end), (10, 31));
    }

    #[test]
    fn should_reject_days_outside_month() {
        assert!(matches!(
            DayRange::resolve(2015, 2, Some(1), Some(29)),
            Err(Era5Error::InvalidDay { day: 29, max: 28, .. })
        ));
        assert!(matches!(
            DayRange::resolve(2015, 2, Some(0), None),
            Err(Era5Error::InvalidDay { day: 0, .. })
        ));
        assert!(matches!(
            DayRange::resolve(2015, 3, Some(5), Some(2)),
            Err(Era5Error::InvalidDayRange { start: 5, end: 2 })
        ));
    }

    #[test]
    fn should_list_dates() {
        let range = DayRange::resolve(2014, 5, Some(30), None).unwrap();
        let dates: Vec<String> = range.dates().map(|d| d.format("%Y%m%d").to_string()).collect();
        assert_eq!(dates, vec!["20140530", "20140531"]);
    }

    #[test]
    fn should_parse_hours() {
        assert_eq!(Hours::parse("0-23").unwrap(), Hours::all());
        assert_eq!(Hours::parse("18, 0,6,12,6").unwrap().as_slice(), &[0, 6, 12, 18]);
        assert_eq!(Hours::parse("0-2,12").unwrap().as_slice(), &[0, 1, 2, 12]);
    }

    #[test]
    fn should_reject_bad_hours() {
        for s in ["24", "5-2", "", "a", "1,,2"] {
            assert!(Hours::parse(s).is_err(), "{} should be rejected", s);
        }
    }

    #[test]
    fn should_format_hours() {
        assert_eq!(Hours::all().to_string(), "00-23");
        assert_eq!(Hours::parse("0,6,12,18").unwrap().to_string(), "00,06,12,18");
        assert_eq!(Hours::parse("6").unwrap().to_string(), "06");
    }
}
