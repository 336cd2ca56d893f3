use super::grid::CalendarCell;
use super::DAYS_IN_WEEK;
use crate::entries::DateKey;
use crate::session::{CalendarState, Decoration};
use crate::theme::{
    BASE_STYLE, DETAIL_STYLE, NOTE_MARKER_STYLE, OTHER_MONTH_STYLE, PHOTO_MARKER_STYLE,
    SELECTED_STYLE, TITLE_STYLE, TODAY_STYLE, WEEKDAY_STYLE,
};
use ratatui::{prelude::*, widgets::*};

/// Number of columns per day of week, including the gap to the next day
const DAY_WIDTH: u16 = 7;

/// Columns taken up by the day number and its brackets
const DAY_NUMBER_WIDTH: u16 = 4;

/// Width of the calendar in columns.  The last day of the week has no gap
/// after it.
const MAIN_WIDTH: u16 = DAY_WIDTH * 7 - 1;

/// Number of lines taken up by the title, the weekday header, and its rule
const HEADER_LINES: u16 = 3;

/// Number of lines taken up by each week of the calendar
const WEEK_LINES: u16 = 2;

const NOTE_MARKER: char = '*';
const PHOTO_MARKER: char = '#';
const ACS_HLINE: char = '─';

/// Draws the displayed month of a `CalendarState`, followed by a line
/// describing the selected day's entry
#[derive(Clone, Copy, Debug)]
pub(crate) struct MonthView<'a> {
    state: &'a CalendarState,
}

impl<'a> MonthView<'a> {
    pub(crate) fn new(state: &'a CalendarState) -> MonthView<'a> {
        MonthView { state }
    }

    /// Lines needed to draw the month, including the detail line
    pub(crate) fn height(&self) -> u16 {
        let weeks = u16::try_from(self.state.grid().week_count()).unwrap_or(u16::MAX);
        HEADER_LINES
            .saturating_add(weeks.saturating_mul(WEEK_LINES))
            .saturating_add(1)
    }
}

impl Widget for MonthView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let left = area.width.saturating_sub(MAIN_WIDTH) / 2;
        let area = Rect {
            x: area.x + left,
            width: area.width.min(MAIN_WIDTH),
            ..area
        };
        let state = self.state;
        let mut canvas = BufferCanvas::new(area, buf);
        let cursor = state.cursor();
        canvas.draw_title(&format!("{} {}", cursor.month(), cursor.year()));
        canvas.draw_header(state.week_start().weekdays().map(|wd| wd.to_string()));
        let cells = state.decorated_cells().collect::<Vec<_>>();
        for (row, week) in std::iter::zip(0u16.., cells.chunks(DAYS_IN_WEEK)) {
            for (col, &(cell, decoration)) in std::iter::zip(0u16.., week) {
                canvas.draw_day(row, col, cell, decoration, cell.date == state.selected());
            }
        }
        let weeks = u16::try_from(state.grid().week_count()).unwrap_or(u16::MAX);
        canvas.draw_detail(
            HEADER_LINES.saturating_add(weeks.saturating_mul(WEEK_LINES)),
            &detail_line(state),
        );
    }
}

fn detail_line(state: &CalendarState) -> String {
    let mut parts = vec![DateKey::from(state.selected()).to_string()];
    match state.selected_entry().filter(|e| !e.is_empty()) {
        Some(entry) => {
            parts.extend(entry.note.as_ref().map(|note| format!("Note: {note}")));
            parts.extend(entry.photo.as_ref().map(|photo| format!("Photo: {photo}")));
        }
        None => parts.push(String::from("No entry")),
    }
    parts.join("  ")
}

fn day_number(cell: &CalendarCell) -> String {
    if cell.is_today {
        format!("[{:2}]", cell.day_number)
    } else {
        format!(" {:2} ", cell.day_number)
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str) {
        let width = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
        self.mvprint(0, MAIN_WIDTH.saturating_sub(width) / 2, title, TITLE_STYLE);
    }

    fn draw_header<I: IntoIterator<Item = String>>(&mut self, weekday_names: I) {
        for (i, name) in std::iter::zip(0u16.., weekday_names) {
            let abbrev = name.chars().take(2).collect::<String>();
            self.mvprint(1, DAY_WIDTH * i + 1, abbrev, WEEKDAY_STYLE);
        }
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(
        &mut self,
        week_no: u16,
        col: u16,
        cell: &CalendarCell,
        decoration: Decoration,
        selected: bool,
    ) {
        let y = week_no * WEEK_LINES + HEADER_LINES;
        let x = DAY_WIDTH * col;
        let mut style = if cell.in_displayed_month {
            BASE_STYLE
        } else {
            OTHER_MONTH_STYLE
        };
        if cell.is_today {
            style = style.patch(TODAY_STYLE);
        }
        if selected {
            style = style.patch(SELECTED_STYLE);
        }
        self.mvprint(y, x, day_number(cell), style);
        if decoration.has_note {
            self.mvaddch(y, x + DAY_NUMBER_WIDTH, NOTE_MARKER, NOTE_MARKER_STYLE);
        }
        if decoration.has_photo {
            self.mvaddch(y, x + DAY_NUMBER_WIDTH + 1, PHOTO_MARKER, PHOTO_MARKER_STYLE);
        }
    }

    fn draw_detail(&mut self, y: u16, text: &str) {
        self.mvprint(y, 0, text, DETAIL_STYLE);
    }

    fn mvaddch(&mut self, y: u16, x: u16, ch: char, style: Style) {
        if y < self.area.height && x < self.area.width {
            if let Some(cell) = self.buf.cell_mut((x + self.area.x, y + self.area.y)) {
                cell.set_char(ch).set_style(style);
            }
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Style) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style);
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), BASE_STYLE);
    }
}
