use crate::error::{DreError, Result};
use chrono::{Datelike, Days, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_days(Days::new(1))
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}

/// `YYYY-MM` label of the calendar month lying `months` after `date`'s month.
///
/// Only the year and month of `date` matter, so a period ending on the 31st
/// never spills into the following month.
pub fn month_label_after(date: NaiveDate, months: u32) -> String {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Parses a period string in the format "YYYY-MM" or "YYYY-MM:YYYY-MM"
/// Returns (start_date, end_date)
pub fn parse_period_string(period: &str) -> Result<(NaiveDate, NaiveDate)> {
    let parts: Vec<&str> = period.split(':').collect();

    match parts.len() {
        1 => {
            let start_date = parse_month_start(parts[0])?;
            let end_date = month_end_of(start_date)?;
            Ok((start_date, end_date))
        }
        2 => {
            let start_date = parse_month_start(parts[0])?;
            let end_date = month_end_of(parse_month_start(parts[1])?)?;
            Ok((start_date, end_date))
        }
        _ => Err(DreError::DateError(format!(
            "Invalid period format: {}. Expected 'YYYY-MM' or 'YYYY-MM:YYYY-MM'",
            period
        ))),
    }
}

fn parse_month_start(raw: &str) -> Result<NaiveDate> {
    let start_str = format!("{}-01", raw.trim());
    NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        DreError::DateError(format!(
            "Invalid date format in period: {}. Expected YYYY-MM",
            raw
        ))
    })
}

fn month_end_of(date: NaiveDate) -> Result<NaiveDate> {
    last_day_of_month(date.year(), date.month())
        .ok_or_else(|| DreError::DateError(format!("No month end for {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            last_day_of_month(2023, 12),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_months_between() {
        let start = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(months_between(start, end), 3);
    }

    #[test]
    fn test_month_label_after() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(month_label_after(date, 0), "2024-01");
        assert_eq!(month_label_after(date, 1), "2024-02");
        assert_eq!(month_label_after(date, 11), "2024-12");
        assert_eq!(month_label_after(date, 12), "2025-01");
        assert_eq!(month_label_after(date, 25), "2026-02");
        assert_eq!(month_label_after(date, u32::MAX), "357915965-04");
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        // 0.125 and 2.5 are exact in binary, so these are true ties.
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert_eq!(round_to(12.34, 1), 12.3);
    }

    #[test]
    fn test_parse_period_string_month_and_range() {
        let (start, end) = parse_period_string("2023-02").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());

        let (start, end) = parse_period_string("2023-01:2023-03").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2023, 3, 31).unwrap());
    }

    #[test]
    fn test_parse_period_string_rejects_garbage() {
        assert!(parse_period_string("march").is_err());
        assert!(parse_period_string("2023-01:2023-02:2023-03").is_err());
    }
}
