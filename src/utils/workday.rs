//! Workday date arithmetic.

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate, TimeZone, Weekday};

use crate::git::TimeWindow;

/// The workday before `date`. Mondays and weekends resolve to the
/// preceding Friday.
pub fn previous_workday(date: NaiveDate) -> NaiveDate {
    let back = match date.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    date - Days::new(back)
}

/// The `[midnight, next midnight)` window of `date` in `tz`.
pub fn day_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<TimeWindow> {
    let start = local_midnight(date, tz)?;
    let next = date
        .succ_opt()
        .with_context(|| format!("No day after {date}"))?;
    let end = local_midnight(next, tz)?;
    Ok(TimeWindow::new(start, end))
}

fn local_midnight<Tz: TimeZone>(
    date: NaiveDate,
    tz: &Tz,
) -> Result<chrono::DateTime<chrono::FixedOffset>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .with_context(|| format!("Invalid midnight for {date}"))?;
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("Midnight of {date} does not exist in the local timezone"))?;
    Ok(local.fixed_offset())
}
