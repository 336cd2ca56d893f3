use time::{macros::date, util::is_leap_year, Date, Duration, Month};

/// Earliest month that can be displayed.  Its leading cells reach back into
/// January -9999, the first month `time` can represent.
const FIRST_MONTH: Date = date!(-9999 - 02 - 01);

/// Latest month that can be displayed.  Its trailing cells reach forwards
/// into December 9999, the last month `time` can represent.
const LAST_MONTH: Date = date!(9999 - 11 - 01);

/// The first day of the month currently on display
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct MonthCursor(Date);

impl Default for MonthCursor {
    fn default() -> MonthCursor {
        MonthCursor(FIRST_MONTH)
    }
}

impl MonthCursor {
    /// Returns the cursor for the month containing `date`, clamped to the
    /// displayable range
    pub(crate) fn containing(date: Date) -> MonthCursor {
        let first = date.saturating_sub(Duration::days(i64::from(date.day()) - 1));
        MonthCursor(first.clamp(FIRST_MONTH, LAST_MONTH))
    }

    pub(crate) fn first_day(self) -> Date {
        self.0
    }

    pub(crate) fn last_day(self) -> Date {
        self.0
            .saturating_add(Duration::days(i64::from(self.days_in_month()) - 1))
    }

    pub(crate) fn year(self) -> i32 {
        self.0.year()
    }

    pub(crate) fn month(self) -> Month {
        self.0.month()
    }

    pub(crate) fn days_in_month(self) -> u8 {
        match self.month() {
            Month::February if is_leap_year(self.year()) => 29,
            Month::February => 28,
            Month::April | Month::June | Month::September | Month::November => 30,
            _ => 31,
        }
    }

    pub(crate) fn contains(self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

/// Moves the cursor back one month.  Saturates at the earliest displayable
/// month.
pub(crate) fn previous_month(cursor: MonthCursor) -> MonthCursor {
    cursor
        .first_day()
        .previous_day()
        .map_or(cursor, MonthCursor::containing)
}

/// Moves the cursor forwards one month.  Saturates at the latest displayable
/// month.
pub(crate) fn next_month(cursor: MonthCursor) -> MonthCursor {
    cursor
        .last_day()
        .next_day()
        .map_or(cursor, MonthCursor::containing)
}

pub(crate) fn reset_to_today(today: Date) -> MonthCursor {
    MonthCursor::containing(today)
}
