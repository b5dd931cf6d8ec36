//! Renewal-period window computation.
//!
//! Pure calendar math, no state and no I/O. Windows are half-open
//! `[start, end)` and are always derived by calendar addition from the
//! leave type's anchor date, so month-length and leap-year variation
//! fall out of `chrono` rather than any day-count arithmetic.

use chrono::{Datelike, Months, NaiveDate};

use crate::ledger::error::LedgerError;
use crate::model::leave_type::RenewPeriod;

/// One renewal period, half-open: `start` is in the window, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

/// A window together with how many requested days fall inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDays {
    pub window: PeriodWindow,
    pub days: i64,
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
    } else {
        date.checked_sub_months(Months::new(magnitude))
    }
}

/// Computes the ordered, contiguous sequence of renewal windows that
/// intersect the inclusive range `[range_start, range_end]`.
///
/// Window `k` spans `[anchor + k*span, anchor + (k+1)*span)` months where
/// `span = renew_period_count` months (or `12 *` that for yearly rules).
/// Every boundary is shifted from the anchor itself; shifting from the
/// previous boundary would accumulate end-of-month clamping drift
/// (Jan 31, Feb 28, then Mar 28 instead of Mar 31).
///
/// Exactly one returned window contains any given day of the range.
pub fn period_windows(
    renew_period: RenewPeriod,
    renew_period_count: u32,
    anchor: NaiveDate,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Result<Vec<PeriodWindow>, LedgerError> {
    if renew_period_count < 1 {
        return Err(LedgerError::InvalidConfiguration {
            reason: format!("renew period count must be at least 1, got {renew_period_count}"),
        });
    }
    if range_start > range_end {
        return Err(LedgerError::InvalidConfiguration {
            reason: "date range start is after its end".to_string(),
        });
    }

    let span = i64::from(renew_period_count)
        * match renew_period {
            RenewPeriod::Month => 1,
            RenewPeriod::Year => 12,
        };
    let out_of_range = || LedgerError::InvalidConfiguration {
        reason: "period window out of calendar range".to_string(),
    };

    // Month-diff division lands on or near the window holding range_start;
    // end-of-month clamping can still leave the guess one window off, so
    // walk until the window actually contains it. Ranges before the anchor
    // resolve to negative indices.
    let month_diff = i64::from(range_start.year() - anchor.year()) * 12
        + i64::from(range_start.month())
        - i64::from(anchor.month());
    let mut k = month_diff.div_euclid(span);
    loop {
        let start = shift_months(anchor, k * span).ok_or_else(out_of_range)?;
        let end = shift_months(anchor, (k + 1) * span).ok_or_else(out_of_range)?;
        if range_start < start {
            k -= 1;
        } else if range_start >= end {
            k += 1;
        } else {
            break;
        }
    }

    let mut windows = Vec::new();
    loop {
        let start = shift_months(anchor, k * span).ok_or_else(out_of_range)?;
        if start > range_end {
            break;
        }
        let end = shift_months(anchor, (k + 1) * span).ok_or_else(out_of_range)?;
        windows.push(PeriodWindow { start, end });
        k += 1;
    }
    Ok(windows)
}

/// Counts, per window, the days of the inclusive range `[range_start,
/// range_end]` falling inside it. Windows the range never touches are
/// omitted; the day counts partition the range exactly.
pub fn split_days(
    windows: &[PeriodWindow],
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> Vec<WindowDays> {
    let mut splits = Vec::with_capacity(windows.len());
    for &window in windows {
        let Some(last_in_window) = window.end.pred_opt() else {
            continue;
        };
        let from = window.start.max(range_start);
        let to = last_in_window.min(range_end);
        let days = (to - from).num_days() + 1;
        if days > 0 {
            splits.push(WindowDays { window, days });
        }
    }
    splits
}

/// User-facing label for the period starting at `start`, formatted per the
/// renewal rule: month name for monthly rules, year for yearly ones.
pub fn period_label(renew_period: RenewPeriod, start: NaiveDate) -> String {
    match renew_period {
        RenewPeriod::Month => start.format("%b").to_string(),
        RenewPeriod::Year => start.format("%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_yields_one_window() {
        let windows = period_windows(
            RenewPeriod::Month,
            1,
            date(2026, 1, 1),
            date(2026, 3, 15),
            date(2026, 3, 15),
        )
        .unwrap();
        assert_eq!(
            windows,
            vec![PeriodWindow {
                start: date(2026, 3, 1),
                end: date(2026, 4, 1),
            }]
        );

        let splits = split_days(&windows, date(2026, 3, 15), date(2026, 3, 15));
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].days, 1);
    }

    #[test]
    fn month_boundary_straddle_splits_in_two() {
        let windows = period_windows(
            RenewPeriod::Month,
            1,
            date(2026, 1, 1),
            date(2026, 3, 30),
            date(2026, 4, 1),
        )
        .unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, date(2026, 3, 1));
        assert_eq!(windows[1].start, date(2026, 4, 1));

        let splits = split_days(&windows, date(2026, 3, 30), date(2026, 4, 1));
        assert_eq!(splits[0].days, 2);
        assert_eq!(splits[1].days, 1);
    }

    #[test]
    fn two_month_periods_share_one_window_across_the_month_line() {
        let windows = period_windows(
            RenewPeriod::Month,
            2,
            date(2026, 1, 1),
            date(2026, 3, 30),
            date(2026, 4, 1),
        )
        .unwrap();
        // Mar 30 and Apr 1 both sit in [Mar 1, May 1)
        assert_eq!(
            windows,
            vec![PeriodWindow {
                start: date(2026, 3, 1),
                end: date(2026, 5, 1),
            }]
        );
        let splits = split_days(&windows, date(2026, 3, 30), date(2026, 4, 1));
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].days, 3);
    }

    #[test]
    fn yearly_windows_use_calendar_years_not_day_counts() {
        // Anchor in a leap year: the next boundary is one calendar year on,
        // 366 days later, not 365.
        let windows = period_windows(
            RenewPeriod::Year,
            1,
            date(2024, 1, 1),
            date(2024, 6, 1),
            date(2024, 6, 1),
        )
        .unwrap();
        assert_eq!(
            windows,
            vec![PeriodWindow {
                start: date(2024, 1, 1),
                end: date(2025, 1, 1),
            }]
        );
        assert_eq!((windows[0].end - windows[0].start).num_days(), 366);
    }

    #[test]
    fn leap_day_anchor_clamps_each_boundary_from_the_anchor() {
        let windows = period_windows(
            RenewPeriod::Year,
            1,
            date(2024, 2, 29),
            date(2025, 3, 1),
            date(2025, 3, 1),
        )
        .unwrap();
        assert_eq!(
            windows,
            vec![PeriodWindow {
                start: date(2025, 2, 28),
                end: date(2026, 2, 28),
            }]
        );
    }

    #[test]
    fn end_of_month_anchor_does_not_drift() {
        let windows = period_windows(
            RenewPeriod::Month,
            1,
            date(2026, 1, 31),
            date(2026, 2, 1),
            date(2026, 4, 1),
        )
        .unwrap();
        // Feb clamps to the 28th but March snaps back to the 31st because
        // every boundary is shifted from the anchor, not the previous one.
        assert_eq!(windows[0].start, date(2026, 1, 31));
        assert_eq!(windows[0].end, date(2026, 2, 28));
        assert_eq!(windows[1].end, date(2026, 3, 31));
        assert_eq!(windows[2].end, date(2026, 4, 30));
    }

    #[test]
    fn range_before_anchor_is_covered() {
        let windows = period_windows(
            RenewPeriod::Month,
            1,
            date(2026, 6, 1),
            date(2026, 3, 10),
            date(2026, 3, 10),
        )
        .unwrap();
        assert_eq!(
            windows,
            vec![PeriodWindow {
                start: date(2026, 3, 1),
                end: date(2026, 4, 1),
            }]
        );
    }

    #[test]
    fn zero_period_count_is_rejected() {
        let err = period_windows(
            RenewPeriod::Month,
            0,
            date(2026, 1, 1),
            date(2026, 3, 1),
            date(2026, 3, 2),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = period_windows(
            RenewPeriod::Month,
            1,
            date(2026, 1, 1),
            date(2026, 3, 2),
            date(2026, 3, 1),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn labels_follow_the_renewal_rule() {
        assert_eq!(period_label(RenewPeriod::Month, date(2026, 3, 1)), "Mar");
        assert_eq!(period_label(RenewPeriod::Year, date(2026, 1, 1)), "2026");
    }
}
