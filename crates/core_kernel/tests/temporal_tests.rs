//! Comprehensive unit tests for the Temporal module
//!
//! Tests cover DateRange, Timezone conversions, and the Clock seam.

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::temporal::TemporalError;
use core_kernel::{Clock, DateRange, FixedClock, SystemClock, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_range {
    use super::*;

    mod creation {
        use super::*;

        #[test]
        fn test_new_accepts_ordered_bounds() {
            let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
            assert_eq!(range.start, date(2024, 1, 1));
            assert_eq!(range.end, date(2024, 12, 31));
        }

        #[test]
        fn test_new_accepts_a_single_day() {
            let range = DateRange::new(date(2024, 6, 15), date(2024, 6, 15)).unwrap();
            assert_eq!(range.days(), 0);
            assert_eq!(range.iter_days().count(), 1);
        }

        #[test]
        fn test_new_fails_when_start_after_end() {
            let result = DateRange::new(date(2024, 12, 31), date(2024, 1, 1));
            assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
        }

        #[test]
        fn test_invalid_period_names_both_bounds() {
            let err = DateRange::new(date(2024, 6, 15), date(2024, 6, 1)).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("2024-06-15"));
            assert!(message.contains("2024-06-01"));
        }
    }

    mod trailing_windows {
        use super::*;

        #[test]
        fn test_trailing_includes_the_end_date() {
            let range = DateRange::trailing(date(2024, 3, 30), 30);
            assert_eq!(range.start, date(2024, 3, 1));
            assert_eq!(range.end, date(2024, 3, 30));
        }

        #[test]
        fn test_trailing_spans_exactly_the_requested_days() {
            let range = DateRange::trailing(date(2024, 6, 30), 7);
            assert_eq!(range.iter_days().count(), 7);
        }

        #[test]
        fn test_trailing_one_day_is_just_the_end() {
            let range = DateRange::trailing(date(2024, 6, 30), 1);
            assert_eq!(range.start, range.end);
        }

        #[test]
        fn test_trailing_zero_days_saturates_to_one() {
            let range = DateRange::trailing(date(2024, 6, 30), 0);
            assert_eq!(range.start, range.end);
        }

        #[test]
        fn test_trailing_crosses_month_boundaries() {
            let range = DateRange::trailing(date(2024, 3, 2), 5);
            assert_eq!(range.start, date(2024, 2, 27));
        }

        #[test]
        fn test_trailing_handles_leap_february() {
            let range = DateRange::trailing(date(2024, 3, 1), 2);
            assert_eq!(range.start, date(2024, 2, 29));
        }
    }

    mod membership {
        use super::*;

        #[test]
        fn test_contains_is_inclusive_on_both_ends() {
            let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();

            assert!(range.contains(date(2024, 6, 1)));
            assert!(range.contains(date(2024, 6, 15)));
            assert!(range.contains(date(2024, 6, 30)));
        }

        #[test]
        fn test_contains_excludes_outside_dates() {
            let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();

            assert!(!range.contains(date(2024, 5, 31)));
            assert!(!range.contains(date(2024, 7, 1)));
        }
    }

    mod iteration {
        use super::*;

        #[test]
        fn test_iter_days_runs_oldest_first() {
            let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 3)).unwrap();
            let days: Vec<NaiveDate> = range.iter_days().collect();

            assert_eq!(days, vec![date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 3)]);
        }

        #[test]
        fn test_days_is_the_difference_not_the_count() {
            let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 30)).unwrap();
            assert_eq!(range.days(), 29);
            assert_eq!(range.iter_days().count(), 30);
        }
    }

    mod wire_format {
        use super::*;

        #[test]
        fn test_serializes_dates_as_iso_strings() {
            let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
            let value = serde_json::to_value(&range).unwrap();

            assert_eq!(value["start"], "2024-06-01");
            assert_eq!(value["end"], "2024-06-30");
        }

        #[test]
        fn test_round_trips_through_json() {
            let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
            let json = serde_json::to_string(&range).unwrap();
            let back: DateRange = serde_json::from_str(&json).unwrap();
            assert_eq!(back, range);
        }
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_default_is_utc() {
        let tz = Timezone::default();
        let instant = Utc.with_ymd_and_hms(2024, 5, 10, 22, 30, 0).unwrap();
        assert_eq!(tz.local_date(instant), date(2024, 5, 10));
    }

    #[test]
    fn test_local_date_shifts_across_midnight() {
        // 22:30 UTC is already 01:30 the next day in Nairobi (UTC+3)
        let tz = Timezone::new(chrono_tz::Africa::Nairobi);
        let instant = Utc.with_ymd_and_hms(2024, 5, 10, 22, 30, 0).unwrap();

        assert_eq!(tz.local_date(instant), date(2024, 5, 11));
    }

    #[test]
    fn test_start_of_day_converts_back_to_utc() {
        let tz = Timezone::new(chrono_tz::Africa::Nairobi);
        let start = tz.start_of_day(date(2024, 5, 10));

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 9, 21, 0, 0).unwrap());
    }

    #[test]
    fn test_end_of_day_lands_on_the_last_nanosecond() {
        let tz = Timezone::new(chrono_tz::Africa::Nairobi);
        let end = tz.end_of_day(date(2024, 5, 10));

        let expected = Utc
            .with_ymd_and_hms(2024, 5, 10, 20, 59, 59)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(999_999_999))
            .unwrap();
        assert_eq!(end, expected);
    }

    #[test]
    fn test_day_window_brackets_a_local_instant() {
        let tz = Timezone::new(chrono_tz::Africa::Nairobi);
        let day = date(2024, 5, 10);
        // Mid-morning local time
        let instant = Utc.with_ymd_and_hms(2024, 5, 10, 7, 0, 0).unwrap();

        assert!(tz.start_of_day(day) <= instant);
        assert!(instant <= tz.end_of_day(day));
        assert_eq!(tz.local_date(instant), day);
    }

    #[test]
    fn test_serializes_as_the_iana_name() {
        let tz = Timezone::new(chrono_tz::Africa::Nairobi);
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Africa/Nairobi\"");
    }

    #[test]
    fn test_deserializes_from_the_iana_name() {
        let tz: Timezone = serde_json::from_str("\"Africa/Nairobi\"").unwrap();
        assert_eq!(tz, Timezone::new(chrono_tz::Africa::Nairobi));
    }

    #[test]
    fn test_rejects_unknown_timezone_names() {
        let result = serde_json::from_str::<Timezone>("\"Mars/Olympus_Mons\"");
        assert!(result.is_err());
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_reports_the_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let clock = FixedClock(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_fixed_clock_today_respects_the_timezone() {
        // 22:30 UTC pinned; Nairobi is already on the next day
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 10, 22, 30, 0).unwrap());

        assert_eq!(clock.today(&Timezone::default()), date(2024, 5, 10));
        assert_eq!(
            clock.today(&Timezone::new(chrono_tz::Africa::Nairobi)),
            date(2024, 5, 11)
        );
    }

    #[test]
    fn test_system_clock_is_non_decreasing() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_clock_trait_objects_are_usable() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let clock: Box<dyn Clock> = Box::new(FixedClock(instant));
        assert_eq!(clock.now(), instant);
    }
}
