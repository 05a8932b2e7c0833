// WeekWindow and WeekNavigator.
//
// Purpose
// - Describe the 7 visible days and move them a whole week at a time.
//
// Notes
// - A window is always replaced as a whole. There is no setter for its start.
// - Navigation stops at the calendar's bounds. A shift that would leave it
//   yields no window.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DAYS_PER_WEEK: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl WeekWindow {
    /// The 7 days from `start_date`, if all of them exist on the calendar.
    pub fn checked_starting(start_date: NaiveDate) -> Option<Self> {
        let end_date = start_date.checked_add_days(Days::new(DAYS_PER_WEEK - 1))?;
        Some(Self {
            start_date,
            end_date,
        })
    }

    /// A start too close to the end of the calendar yields its last full week.
    pub fn starting(start_date: NaiveDate) -> Self {
        Self::checked_starting(start_date).unwrap_or_else(Self::last)
    }

    fn last() -> Self {
        Self {
            start_date: NaiveDate::MAX - Days::new(DAYS_PER_WEEK - 1),
            end_date: NaiveDate::MAX,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start_date;
        (0..DAYS_PER_WEEK).filter_map(move |offset| start.checked_add_days(Days::new(offset)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Short label such as "Jun 10 - Jun 16".
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%b %-d"),
            self.end_date.format("%b %-d")
        )
    }
}

/// Where a freshly opened schedule starts its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekAnchor {
    /// The window starts on the given day itself.
    #[default]
    Today,
    /// The window starts on the Monday of the given day's ISO week.
    Monday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekNavigator {
    anchor: WeekAnchor,
}

impl WeekNavigator {
    pub fn new(anchor: WeekAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> WeekAnchor {
        self.anchor
    }

    pub fn window_for(&self, date: NaiveDate) -> WeekWindow {
        match self.anchor {
            WeekAnchor::Today => WeekWindow::starting(date),
            WeekAnchor::Monday => {
                let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
                WeekWindow::starting(date.checked_sub_days(back).unwrap_or(date))
            }
        }
    }

    /// `None` when the shifted week would not fit on the calendar.
    pub fn shift(&self, window: WeekWindow, delta_weeks: i32) -> Option<WeekWindow> {
        let days = Days::new(u64::from(delta_weeks.unsigned_abs()) * DAYS_PER_WEEK);
        let start = if delta_weeks >= 0 {
            window.start_date.checked_add_days(days)
        } else {
            window.start_date.checked_sub_days(days)
        }?;
        WeekWindow::checked_starting(start)
    }
}

#[cfg(test)]
mod week_window_tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    fn it_should_span_seven_days() {
        let window = WeekWindow::starting(d(2024, 6, 10));
        assert_eq!(window.end_date(), d(2024, 6, 16));
        let dates: Vec<NaiveDate> = window.dates().collect();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], d(2024, 6, 10));
        assert_eq!(dates[6], d(2024, 6, 16));
        assert!(window.contains(d(2024, 6, 13)));
        assert!(!window.contains(d(2024, 6, 9)));
        assert!(!window.contains(d(2024, 6, 17)));
    }

    #[rstest]
    #[case(WeekAnchor::Today, d(2024, 6, 12), d(2024, 6, 12))]
    #[case(WeekAnchor::Monday, d(2024, 6, 12), d(2024, 6, 10))]
    #[case(WeekAnchor::Monday, d(2024, 6, 10), d(2024, 6, 10))]
    #[case(WeekAnchor::Monday, d(2024, 6, 16), d(2024, 6, 10))]
    fn it_should_anchor_the_window(
        #[case] anchor: WeekAnchor,
        #[case] today: NaiveDate,
        #[case] expected_start: NaiveDate,
    ) {
        let window = WeekNavigator::new(anchor).window_for(today);
        assert_eq!(window.start_date(), expected_start);
    }

    #[rstest]
    #[case(1, d(2024, 6, 17))]
    #[case(-1, d(2024, 6, 3))]
    #[case(4, d(2024, 7, 8))]
    #[case(0, d(2024, 6, 10))]
    fn it_should_shift_by_whole_weeks(#[case] delta: i32, #[case] expected_start: NaiveDate) {
        let navigator = WeekNavigator::default();
        let shifted = navigator
            .shift(WeekWindow::starting(d(2024, 6, 10)), delta)
            .unwrap();
        assert_eq!(shifted.start_date(), expected_start);
        assert_eq!(
            shifted.end_date(),
            expected_start.checked_add_days(Days::new(6)).unwrap()
        );
    }

    #[rstest]
    #[case(d(2024, 6, 10))]
    #[case(d(2024, 12, 30))]
    #[case(d(2024, 2, 26))]
    #[case(d(2023, 3, 23))]
    fn shifting_forward_then_back_returns_the_same_window(#[case] start: NaiveDate) {
        let navigator = WeekNavigator::new(WeekAnchor::Monday);
        let window = WeekWindow::starting(start);
        let round_trip = navigator
            .shift(window, 1)
            .and_then(|w| navigator.shift(w, -1));
        assert_eq!(round_trip, Some(window));
    }

    #[rstest]
    #[case(i32::MAX)]
    #[case(i32::MIN)]
    #[case(2_000_000_000)]
    #[case(-2_000_000_000)]
    fn it_should_refuse_to_shift_off_the_calendar(#[case] delta: i32) {
        let navigator = WeekNavigator::default();
        assert_eq!(navigator.shift(WeekWindow::starting(d(2024, 6, 10)), delta), None);
    }

    #[rstest]
    fn it_should_refuse_a_shift_that_cuts_the_last_week_short() {
        let navigator = WeekNavigator::default();
        let last = WeekWindow::starting(NaiveDate::MAX);
        assert_eq!(navigator.shift(last, 1), None);
        assert_eq!(
            navigator.shift(last, -1).map(|w| w.dates().count()),
            Some(DAYS_PER_WEEK as usize)
        );
    }

    #[rstest]
    #[case(NaiveDate::MAX)]
    #[case(NaiveDate::MIN)]
    fn windows_at_the_calendar_bounds_keep_seven_distinct_days(#[case] start: NaiveDate) {
        let window = WeekWindow::starting(start);
        let dates: Vec<NaiveDate> = window.dates().collect();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates.first(), Some(&window.start_date()));
        assert_eq!(dates.last(), Some(&window.end_date()));
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn it_should_label_the_window() {
        assert_eq!(WeekWindow::starting(d(2024, 6, 10)).label(), "Jun 10 - Jun 16");
        assert_eq!(WeekWindow::starting(d(2024, 6, 28)).label(), "Jun 28 - Jul 4");
    }
}
