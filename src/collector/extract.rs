use chrono::{Datelike, Duration, NaiveDate};

use crate::collector::classify::RawTimeSeries;
use crate::error::{AppError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One curated weekly closing price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub symbol: String,
    pub date: String,
    pub value: f64,
}

/// Turn a raw series into curated weekly points for `symbol`.
///
/// Starts from the series' last-refreshed date normalised to the most recent
/// Sunday, then walks backward in 7-day steps for up to `n` weeks. Weeks
/// absent from the series are skipped, not zero-filled. Returns the points
/// plus how many of the `n` requested weeks were actually present; the caller
/// decides whether a short count matters.
pub fn extract_weekly(
    raw: &RawTimeSeries,
    n: usize,
    symbol: &str,
) -> Result<(Vec<PricePoint>, usize)> {
    let last_refreshed = &raw.meta.last_refreshed;
    let date_part = last_refreshed
        .split_once(' ')
        .map(|(date, _)| date)
        .ok_or_else(|| {
            AppError::message("unable to get last refreshed date from raw data")
        })?;

    let mut date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| AppError::message("unable to parse the last refreshed date"))?;

    // Weekly values are reported on Sundays; roll back to the latest one.
    // num_days_from_sunday is 0 on Sunday, so that case needs no adjustment.
    date -= Duration::days(i64::from(date.weekday().num_days_from_sunday()));

    let mut points = Vec::new();
    let mut missing = 0;
    for _ in 0..n {
        let key = date.format(DATE_FORMAT).to_string();
        if let Some(entry) = raw.series.get(&key) {
            let value: f64 = entry.close.parse().map_err(|_| {
                AppError::message(format!(
                    "unable to parse closing value {:?} for {}",
                    entry.close, symbol
                ))
            })?;
            points.push(PricePoint {
                symbol: symbol.to_string(),
                date: key,
                value,
            });
        } else {
            missing += 1;
        }
        date -= Duration::days(7);
    }

    Ok((points, n - missing))
}
