//! Property-based tests for the period calculator.
//!
//! These validate the coverage and partition guarantees: every day of a
//! requested range lands in exactly one window, and the per-window day
//! counts sum to the inclusive length of the range.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use crate::ledger::period::{period_windows, split_days};
use crate::model::leave_type::RenewPeriod;

/// Strategy for dates between 1990 and ~2044.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + Duration::days(offset)
    })
}

fn arb_renew_period() -> impl Strategy<Value = RenewPeriod> {
    prop_oneof![Just(RenewPeriod::Month), Just(RenewPeriod::Year)]
}

proptest! {
    #[test]
    fn every_day_of_the_range_is_in_exactly_one_window(
        anchor in arb_date(),
        range_start in arb_date(),
        range_len in 0i64..90,
        renew_period in arb_renew_period(),
        count in 1u32..4,
    ) {
        let range_end = range_start + Duration::days(range_len);
        let windows =
            period_windows(renew_period, count, anchor, range_start, range_end).unwrap();

        let mut day = range_start;
        while day <= range_end {
            let containing = windows.iter().filter(|w| w.contains(day)).count();
            prop_assert_eq!(containing, 1, "day {} covered {} times", day, containing);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn windows_are_ordered_and_contiguous(
        anchor in arb_date(),
        range_start in arb_date(),
        range_len in 0i64..90,
        renew_period in arb_renew_period(),
        count in 1u32..4,
    ) {
        let range_end = range_start + Duration::days(range_len);
        let windows =
            period_windows(renew_period, count, anchor, range_start, range_end).unwrap();

        prop_assert!(!windows.is_empty());
        prop_assert!(windows[0].contains(range_start));
        prop_assert!(windows[windows.len() - 1].contains(range_end));
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn split_day_counts_partition_the_range(
        anchor in arb_date(),
        range_start in arb_date(),
        range_len in 0i64..90,
        renew_period in arb_renew_period(),
        count in 1u32..4,
    ) {
        let range_end = range_start + Duration::days(range_len);
        let windows =
            period_windows(renew_period, count, anchor, range_start, range_end).unwrap();
        let splits = split_days(&windows, range_start, range_end);

        let total: i64 = splits.iter().map(|s| s.days).sum();
        prop_assert_eq!(total, range_len + 1);

        for split in &splits {
            prop_assert!(split.days > 0);
            // Brute-force count of range days inside this window.
            let mut expected = 0;
            let mut day = range_start;
            while day <= range_end {
                if split.window.contains(day) {
                    expected += 1;
                }
                day = day.succ_opt().unwrap();
            }
            prop_assert_eq!(split.days, expected);
        }
    }
}
