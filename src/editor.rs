use crate::entries::{Entry, PhotoRef};
use crate::theme::{
    editor::{FOCUSED_FIELD_STYLE, HINT_STYLE, LABEL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use time::Date;

const OUTER_WIDTH: u16 = 52;
const OUTER_HEIGHT: u16 = 10;

const NOTE_LABEL: &str = "Note:  ";
const PHOTO_LABEL: &str = "Photo: ";
const HINT: &str = "TAB switch · ENTER save · ESC cancel";

/// Popup for editing the note and photo attached to one day
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct EntryEditor;

impl StatefulWidget for EntryEditor {
    type State = EditorState;

    /*
     * ....................................................
     * .┌──────── Thursday, March 7, 2024 ───────────────┐.
     * .│                                                │.
     * .│ Note:  Dentist_                                │.
     * .│ Photo: https://example.com/teeth.png           │.
     * .│                                                │.
     * .│      TAB switch · ENTER save · ESC cancel      │.
     * .│                                                │.
     * .└────────────────────────────────────────────────┘.
     * ....................................................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH.min(area.width)])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT.min(area.height)])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(format!(" {} ", state.title()))
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        let field_width = usize::from(text_area.width).saturating_sub(NOTE_LABEL.len() + 1);
        state.to_text(field_width).render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum Field {
    #[default]
    Note,
    Photo,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct EditorState {
    date: Date,
    note: String,
    photo: String,
    focus: Field,
}

impl EditorState {
    /// Starts editing `date`, prefilled from its current entry
    pub(crate) fn new(date: Date, entry: Option<&Entry>) -> EditorState {
        EditorState {
            date,
            note: entry.and_then(|e| e.note.clone()).unwrap_or_default(),
            photo: entry
                .and_then(|e| e.photo.as_ref())
                .map(|p| p.as_str().to_owned())
                .unwrap_or_default(),
            focus: Field::Note,
        }
    }

    pub(crate) fn date(&self) -> Date {
        self.date
    }

    fn title(&self) -> String {
        format!(
            "{}, {} {}, {}",
            self.date.weekday(),
            self.date.month(),
            self.date.day(),
            self.date.year()
        )
    }

    fn to_text(&self, field_width: usize) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.field_line(Field::Note, field_width),
            self.field_line(Field::Photo, field_width),
            Line::styled("", BASE_STYLE),
            Line::from(Span::styled(HINT, HINT_STYLE)).alignment(Alignment::Center),
        ])
    }

    fn field_line(&self, field: Field, width: usize) -> Line<'static> {
        let (label, value) = match field {
            Field::Note => (NOTE_LABEL, &self.note),
            Field::Photo => (PHOTO_LABEL, &self.photo),
        };
        let focused = field == self.focus;
        let mut shown = tail(value, if focused { width.saturating_sub(1) } else { width });
        if focused {
            shown.push('_');
        }
        Line::from_iter([
            Span::styled(label, LABEL_STYLE),
            Span::styled(
                shown,
                if focused {
                    FOCUSED_FIELD_STYLE
                } else {
                    BASE_STYLE
                },
            ),
        ])
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Note => &mut self.note,
            Field::Photo => &mut self.photo,
        }
    }

    /// The entry as currently filled in.  Blank fields are cleared.
    fn to_entry(&self) -> Entry {
        Entry::new(
            non_blank(&self.photo).map(PhotoRef::new),
            non_blank(&self.note).map(str::to_owned),
        )
    }

    pub(crate) fn handle_input(&mut self, input: EditorInput) -> EditorOutput {
        match input {
            EditorInput::Char(c) if !c.is_control() => {
                self.field_mut().push(c);
                EditorOutput::Ok
            }
            EditorInput::Char(_) => EditorOutput::Invalid,
            EditorInput::Backspace => {
                if self.field_mut().pop().is_some() {
                    EditorOutput::Ok
                } else {
                    EditorOutput::Invalid
                }
            }
            EditorInput::ClearField => {
                self.field_mut().clear();
                EditorOutput::Ok
            }
            EditorInput::SwitchField => {
                self.focus = match self.focus {
                    Field::Note => Field::Photo,
                    Field::Photo => Field::Note,
                };
                EditorOutput::Ok
            }
            EditorInput::Save => EditorOutput::Save(self.to_entry()),
            EditorInput::Cancel => EditorOutput::Cancel,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EditorInput {
    Char(char),
    Backspace,
    ClearField,
    SwitchField,
    Save,
    Cancel,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum EditorOutput {
    Ok,
    Invalid,
    Save(Entry),
    Cancel,
}

fn non_blank(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

/// The last `width` characters of `s`, so that the end being typed stays in
/// view
fn tail(s: &str, width: usize) -> String {
    let skip = s.chars().count().saturating_sub(width);
    s.chars().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn type_str(state: &mut EditorState, s: &str) {
        for c in s.chars() {
            assert_eq!(state.handle_input(EditorInput::Char(c)), EditorOutput::Ok);
        }
    }

    #[test]
    fn test_new_entry() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        type_str(&mut state, "Dentist");
        assert_eq!(
            state.handle_input(EditorInput::Save),
            EditorOutput::Save(Entry::new(None, Some(String::from("Dentist"))))
        );
    }

    #[test]
    fn test_switch_field_and_backspace() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        type_str(&mut state, "Dentisx");
        assert_eq!(state.handle_input(EditorInput::Backspace), EditorOutput::Ok);
        type_str(&mut state, "t");
        assert_eq!(state.handle_input(EditorInput::SwitchField), EditorOutput::Ok);
        type_str(&mut state, "/home/me/teeth.png");
        assert_eq!(
            state.handle_input(EditorInput::Save),
            EditorOutput::Save(Entry::new(
                Some(PhotoRef::new("/home/me/teeth.png")),
                Some(String::from("Dentist"))
            ))
        );
    }

    #[test]
    fn test_backspace_on_empty_field() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        assert_eq!(
            state.handle_input(EditorInput::Backspace),
            EditorOutput::Invalid
        );
    }

    #[test]
    fn test_control_chars_rejected() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        assert_eq!(
            state.handle_input(EditorInput::Char('\n')),
            EditorOutput::Invalid
        );
    }

    #[test]
    fn test_prefilled_from_entry() {
        let entry = Entry::new(
            Some(PhotoRef::new("https://example.com/cat.png")),
            Some(String::from("Cat")),
        );
        let mut state = EditorState::new(date!(2024 - 03 - 07), Some(&entry));
        assert_eq!(state.date(), date!(2024 - 03 - 07));
        // Saving untouched keeps both fields
        assert_eq!(
            state.handle_input(EditorInput::Save),
            EditorOutput::Save(entry)
        );
    }

    #[test]
    fn test_clearing_fields_clears_entry() {
        let entry = Entry::new(
            Some(PhotoRef::new("https://example.com/cat.png")),
            Some(String::from("Cat")),
        );
        let mut state = EditorState::new(date!(2024 - 03 - 07), Some(&entry));
        assert_eq!(state.handle_input(EditorInput::ClearField), EditorOutput::Ok);
        state.handle_input(EditorInput::SwitchField);
        assert_eq!(state.handle_input(EditorInput::ClearField), EditorOutput::Ok);
        assert_eq!(
            state.handle_input(EditorInput::Save),
            EditorOutput::Save(Entry::default())
        );
    }

    #[test]
    fn test_blank_note_is_none() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        type_str(&mut state, "   ");
        assert_eq!(
            state.handle_input(EditorInput::Save),
            EditorOutput::Save(Entry::default())
        );
    }

    #[test]
    fn test_cancel() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        type_str(&mut state, "never mind");
        assert_eq!(state.handle_input(EditorInput::Cancel), EditorOutput::Cancel);
    }

    #[test]
    fn test_title() {
        let state = EditorState::new(date!(2024 - 03 - 07), None);
        assert_eq!(state.title(), "Thursday, March 7, 2024");
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 3), "ab");
        assert_eq!(tail("héllo", 4), "éllo");
    }

    #[test]
    fn test_render() {
        let mut state = EditorState::new(date!(2024 - 03 - 07), None);
        type_str(&mut state, "Dentist");
        let area = Rect::new(0, 0, 60, 12);
        let mut buffer = Buffer::empty(area);
        EntryEditor.render(area, &mut buffer, &mut state);
        let text = buffer
            .content
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect::<String>();
        assert!(text.contains("Thursday, March 7, 2024"));
        assert!(text.contains("Note:  Dentist_"));
        assert!(text.contains("Photo: "));
        assert!(text.contains(HINT));
    }
}
