mod cursor;
mod grid;
mod widget;
pub(crate) use self::cursor::{next_month, previous_month, reset_to_today, MonthCursor};
pub(crate) use self::grid::{CalendarCell, MonthGrid};
pub(crate) use self::widget::MonthView;
use std::fmt;
use std::iter::successors;
use std::str::FromStr;
use thiserror::Error;
use time::Weekday;

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// The weekday shown in the leftmost column of the month grid
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct WeekStart(Weekday);

impl WeekStart {
    pub(crate) fn new(weekday: Weekday) -> WeekStart {
        WeekStart(weekday)
    }

    pub(crate) fn weekday(self) -> Weekday {
        self.0
    }

    /// Number of columns between the start of the week and `wd`
    pub(crate) fn offset_of(self, wd: Weekday) -> u8 {
        (wd.number_days_from_monday() + 7 - self.0.number_days_from_monday()) % 7
    }

    /// The seven weekdays in column order
    pub(crate) fn weekdays(self) -> impl Iterator<Item = Weekday> {
        successors(Some(self.0), |wd| Some(wd.next())).take(DAYS_IN_WEEK)
    }
}

impl Default for WeekStart {
    fn default() -> WeekStart {
        WeekStart::new(Weekday::Sunday)
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.weekday())
    }
}

impl FromStr for WeekStart {
    type Err = ParseWeekStartError;

    fn from_str(s: &str) -> Result<WeekStart, ParseWeekStartError> {
        let wd = match s.to_ascii_lowercase().as_str() {
            "sun" | "sunday" => Weekday::Sunday,
            "mon" | "monday" => Weekday::Monday,
            "tue" | "tuesday" => Weekday::Tuesday,
            "wed" | "wednesday" => Weekday::Wednesday,
            "thu" | "thursday" => Weekday::Thursday,
            "fri" | "friday" => Weekday::Friday,
            "sat" | "saturday" => Weekday::Saturday,
            _ => return Err(ParseWeekStartError(s.to_owned())),
        };
        Ok(WeekStart::new(wd))
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown weekday {0:?}")]
pub(crate) struct ParseWeekStartError(String);
