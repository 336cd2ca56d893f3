use crate::calendar::{
    next_month, previous_month, reset_to_today, CalendarCell, MonthCursor, MonthGrid, WeekStart,
};
use crate::entries::{DateKey, Entry, EntryStore};
use time::{Date, Duration};

/// How a cell should be decorated, derived from the entry for its date
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Decoration {
    pub(crate) has_note: bool,
    pub(crate) has_photo: bool,
}

impl Decoration {
    fn for_entry(entry: Option<&Entry>) -> Decoration {
        Decoration {
            has_note: entry.is_some_and(|e| e.note.is_some()),
            has_photo: entry.is_some_and(|e| e.photo.is_some()),
        }
    }
}

/// Everything a calendar view shows: which month, which day is selected,
/// and what is attached to each day.
///
/// Every transition consumes the state and returns the next one, rebuilding
/// the grid and decorations as needed so that they never go stale.
///
/// Invariants, except in the empty `Default` state:
/// - `decorations` has one element per grid cell and reflects `entries` as
///   of `decorated_revision`, which is always `entries.revision()`.
/// - `selected` is always on the grid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarState {
    today: Date,
    selected: Date,
    entries: EntryStore,
    grid: MonthGrid,
    decorations: Vec<Decoration>,
    decorated_revision: u64,
}

/// An empty state with no grid cells.  Owners use it to stand in while a
/// transition takes their state by value.
impl Default for CalendarState {
    fn default() -> CalendarState {
        CalendarState {
            today: Date::MIN,
            selected: Date::MIN,
            entries: EntryStore::new(),
            grid: MonthGrid::default(),
            decorations: Vec::new(),
            decorated_revision: 0,
        }
    }
}

impl CalendarState {
    /// Starts on today's month with today selected and no entries
    pub(crate) fn new(today: Date, week_start: WeekStart) -> CalendarState {
        let grid = MonthGrid::generate(today, today, week_start);
        CalendarState {
            today,
            selected: today,
            entries: EntryStore::new(),
            grid,
            decorations: Vec::new(),
            decorated_revision: 0,
        }
        .with_selected(today)
        .redecorated()
    }

    pub(crate) fn with_start_date(self, date: Date) -> CalendarState {
        self.with_cursor(MonthCursor::containing(date))
            .with_selected(date)
    }

    /// Shows the following month with its first day selected
    pub(crate) fn with_next_month(self) -> CalendarState {
        let cursor = next_month(self.cursor());
        self.with_cursor(cursor).with_selected(cursor.first_day())
    }

    /// Shows the preceding month with its first day selected
    pub(crate) fn with_previous_month(self) -> CalendarState {
        let cursor = previous_month(self.cursor());
        self.with_cursor(cursor).with_selected(cursor.first_day())
    }

    /// Shows the current month with today selected
    pub(crate) fn with_today(self) -> CalendarState {
        let today = self.today;
        self.with_cursor(reset_to_today(today)).with_selected(today)
    }

    /// Records that the date has changed; the displayed month stays put
    pub(crate) fn with_today_as(mut self, today: Date) -> CalendarState {
        if today == self.today {
            return self;
        }
        self.today = today;
        self.grid = MonthGrid::for_cursor(self.cursor(), today, self.week_start());
        self
    }

    /// Selects `date`.  Dates visible on the grid, including those of the
    /// neighboring months, are selected in place; any other date brings its
    /// own month into view.
    pub(crate) fn with_selected(mut self, date: Date) -> CalendarState {
        if !self.grid.contains(date) {
            self = self.with_cursor(MonthCursor::containing(date));
        }
        self.selected = if self.grid.contains(date) {
            date
        } else {
            // Only reachable at the very ends of time
            self.cursor().first_day()
        };
        self
    }

    /// Moves the selection by `days`, which may be negative
    pub(crate) fn with_selection_moved(self, days: i64) -> CalendarState {
        match self.selected.checked_add(Duration::days(days)) {
            Some(date) => self.with_selected(date),
            None => self,
        }
    }

    pub(crate) fn with_upserted_entry(mut self, key: DateKey, entry: Entry) -> CalendarState {
        self.entries.upsert(key, entry);
        self.redecorated()
    }

    pub(crate) fn with_seeded_entries<I>(mut self, records: I) -> CalendarState
    where
        I: IntoIterator<Item = (DateKey, Entry)>,
    {
        self.entries.seed(records);
        self.redecorated()
    }

    fn with_cursor(mut self, cursor: MonthCursor) -> CalendarState {
        if cursor != self.cursor() || self.grid.cells().is_empty() {
            self.grid = MonthGrid::for_cursor(cursor, self.today, self.week_start());
            self.decorations.clear();
        }
        self.redecorated()
    }

    fn redecorated(mut self) -> CalendarState {
        if self.decorations.len() != self.grid.cells().len()
            || self.decorated_revision != self.entries.revision()
        {
            let entries = &self.entries;
            self.decorations = self
                .grid
                .cells()
                .iter()
                .map(|c| Decoration::for_entry(entries.lookup(&DateKey::from(c.date))))
                .collect();
            self.decorated_revision = self.entries.revision();
        }
        self
    }

    pub(crate) fn today(&self) -> Date {
        self.today
    }

    pub(crate) fn selected(&self) -> Date {
        self.selected
    }

    pub(crate) fn selected_entry(&self) -> Option<&Entry> {
        self.entries.lookup(&DateKey::from(self.selected))
    }

    pub(crate) fn cursor(&self) -> MonthCursor {
        self.grid.cursor()
    }

    pub(crate) fn week_start(&self) -> WeekStart {
        self.grid.week_start()
    }

    pub(crate) fn grid(&self) -> &MonthGrid {
        &self.grid
    }

    pub(crate) fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub(crate) fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Pairs each grid cell with its decoration
    pub(crate) fn decorated_cells(&self) -> impl Iterator<Item = (&CalendarCell, Decoration)> + '_ {
        self.grid.cells().iter().zip(self.decorations().iter().copied())
    }
}
