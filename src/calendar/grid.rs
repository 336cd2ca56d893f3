use super::cursor::MonthCursor;
use super::{WeekStart, DAYS_IN_WEEK};
use std::iter::successors;
use time::{Date, Duration};

/// Cell count of a month that fits in five weeks
const SHORT_GRID_LEN: usize = 5 * DAYS_IN_WEEK;

/// Cell count of a month that spills into a sixth week
const LONG_GRID_LEN: usize = 6 * DAYS_IN_WEEK;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct CalendarCell {
    pub(crate) date: Date,
    pub(crate) day_number: u8,
    pub(crate) in_displayed_month: bool,
    pub(crate) is_today: bool,
}

/// The days shown for one month: the tail of the previous month back to the
/// start of the week, every day of the month, then the head of the next month
/// up to a whole number of weeks.
///
/// Invariant: `cells` holds 35 or 42 consecutive dates, the first of which
/// falls on the week start.  The exception is the `Default` grid, which has
/// no cells at all.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    cursor: MonthCursor,
    week_start: WeekStart,
    cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Builds the grid for the month containing `reference`.  Only the year
    /// and month of `reference` are significant.
    pub(crate) fn generate(reference: Date, today: Date, week_start: WeekStart) -> MonthGrid {
        MonthGrid::for_cursor(MonthCursor::containing(reference), today, week_start)
    }

    pub(crate) fn for_cursor(cursor: MonthCursor, today: Date, week_start: WeekStart) -> MonthGrid {
        let first = cursor.first_day();
        let leading = week_start.offset_of(first.weekday());
        let len = if usize::from(leading) + usize::from(cursor.days_in_month()) <= SHORT_GRID_LEN
        {
            SHORT_GRID_LEN
        } else {
            LONG_GRID_LEN
        };
        let start = first.saturating_sub(Duration::days(i64::from(leading)));
        let cells = iter_days_from(start)
            .take(len)
            .map(|date| CalendarCell {
                date,
                day_number: date.day(),
                in_displayed_month: cursor.contains(date),
                is_today: date == today,
            })
            .collect();
        MonthGrid {
            cursor,
            week_start,
            cells,
        }
    }

    pub(crate) fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub(crate) fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub(crate) fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    pub(crate) fn week_count(&self) -> usize {
        self.cells.len() / DAYS_IN_WEEK
    }

    pub(crate) fn first_date(&self) -> Date {
        self.cursor.first_day().saturating_sub(Duration::days(i64::from(
            self.week_start.offset_of(self.cursor.first_day().weekday()),
        )))
    }

    pub(crate) fn last_date(&self) -> Date {
        self.cells.last().map_or_else(|| self.first_date(), |c| c.date)
    }

    /// Index of the cell showing `date`, if it is on the grid
    pub(crate) fn position_of(&self, date: Date) -> Option<usize> {
        let offset = (date - self.first_date()).whole_days();
        usize::try_from(offset)
            .ok()
            .filter(|&i| i < self.cells.len())
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.position_of(date).is_some()
    }
}

fn iter_days_from(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day())
}
