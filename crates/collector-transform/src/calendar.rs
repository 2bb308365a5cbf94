//! Calendar bucketing of collection ranges.
//!
//! A range is split into consecutive, non-overlapping, inclusive windows at
//! the job's frequency:
//! - daily windows are single days
//! - weekly windows run Monday to Sunday; the range start is moved back to
//!   its Monday first
//! - monthly windows are whole calendar months, including partial months
//!   touched by either end of the range
//!
//! Without an explicit range, a single window is produced: the most recently
//! completed day, Monday-start week, or calendar month before `today`.

use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use collector_model::{CollectorError, Frequency, Result, TimeWindow};
use tracing::debug;

/// Bucket a range using today's UTC date for defaults.
///
/// `frequency` accepts `day`/`daily`, `week`/`weekly` and `month`/`monthly`.
pub fn bucket(
    frequency: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<TimeWindow>> {
    let frequency: Frequency = frequency.parse()?;
    period_range(frequency, start, end, Utc::now().date_naive())
}

/// Bucket `[start, end]` at `frequency`, filling missing bounds from the
/// default window relative to `today`.
pub fn period_range(
    frequency: Frequency,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<Vec<TimeWindow>> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (start, end) => {
            let fallback = default_window(frequency, today)?;
            (start.unwrap_or(fallback.start), end.unwrap_or(fallback.end))
        }
    };
    if start > end {
        return Err(CollectorError::InvalidRange { start, end });
    }

    let period = frequency.period();
    let mut windows = Vec::new();
    let mut window_start = match frequency {
        Frequency::Daily => start,
        Frequency::Weekly => start_of_week(start)?,
        Frequency::Monthly => start_of_month(start),
    };
    while window_start <= end {
        let next_start = advance(frequency, window_start)?;
        let window_end = next_start.pred_opt().unwrap_or(next_start);
        windows.push(TimeWindow::new(window_start, window_end, period));
        window_start = next_start;
    }

    debug!(
        frequency = %frequency,
        start = %start,
        end = %end,
        windows = windows.len(),
        "bucketed collection range"
    );
    Ok(windows)
}

/// The single window collected when no range is given.
pub fn default_window(frequency: Frequency, today: NaiveDate) -> Result<TimeWindow> {
    let period = frequency.period();
    let window = match frequency {
        Frequency::Daily => {
            let yesterday = sub_days(today, 1)?;
            TimeWindow::new(yesterday, yesterday, period)
        }
        Frequency::Weekly => {
            let start = sub_days(start_of_week(today)?, 7)?;
            TimeWindow::new(start, add_days(start, 6)?, period)
        }
        Frequency::Monthly => {
            let first = start_of_month(today);
            let start = first
                .checked_sub_months(Months::new(1))
                .ok_or(CollectorError::DateOutOfRange { date: first })?;
            TimeWindow::new(start, end_of_month(start)?, period)
        }
    };
    Ok(window)
}

/// The Monday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> Result<NaiveDate> {
    sub_days(date, u64::from(date.weekday().num_days_from_monday()))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> Result<NaiveDate> {
    let next = advance(Frequency::Monthly, start_of_month(date))?;
    Ok(next.pred_opt().unwrap_or(next))
}

/// Start of the window after the one starting at `date`.
///
/// The last window before `NaiveDate::MAX` has no successor, so a range
/// reaching it is `DateOutOfRange` rather than a truncated window.
fn advance(frequency: Frequency, date: NaiveDate) -> Result<NaiveDate> {
    match frequency {
        Frequency::Daily => add_days(date, 1),
        Frequency::Weekly => add_days(date, 7),
        Frequency::Monthly => date
            .checked_add_months(Months::new(1))
            .ok_or(CollectorError::DateOutOfRange { date }),
    }
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or(CollectorError::DateOutOfRange { date })
}

fn sub_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_sub_days(Days::new(days))
        .ok_or(CollectorError::DateOutOfRange { date })
}
