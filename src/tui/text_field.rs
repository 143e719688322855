use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Editable text buffer with a grapheme-aware cursor.
///
/// `cursor` is a byte offset into `value` and always sits on a grapheme
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
    multiline: bool,
    focused: bool,
    placeholder: &'static str,
}

impl TextField {
    pub fn single_line(placeholder: &'static str) -> Self {
        TextField {
            value: String::new(),
            cursor: 0,
            multiline: false,
            focused: false,
            placeholder,
        }
    }

    pub fn multi_line(placeholder: &'static str) -> Self {
        TextField {
            multiline: true,
            ..TextField::single_line(placeholder)
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the contents; the cursor moves to the end
    pub fn set_value(&mut self, value: &str) {
        self.value = if self.multiline {
            value.to_string()
        } else {
            value.replace('\n', " ")
        };
        self.cursor = self.value.len();
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor as (line index, display column)
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.value[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = self.line_start(self.cursor);
        (line, self.value[line_start..self.cursor].width())
    }

    /// Apply an editing key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Enter if self.multiline => self.insert('\n'),
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.value.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if let Some(next) = self.next_boundary() {
                    self.value.replace_range(self.cursor..next, "");
                }
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = self.line_start(self.cursor),
            KeyCode::End => self.cursor = self.line_end(self.cursor),
            KeyCode::Up if self.multiline => self.move_vertical(false),
            KeyCode::Down if self.multiline => self.move_vertical(true),
            _ => return false,
        }
        true
    }

    fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
    }

    fn line_start(&self, offset: usize) -> usize {
        self.value[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.value[offset..]
            .find('\n')
            .map_or(self.value.len(), |i| offset + i)
    }

    fn move_vertical(&mut self, down: bool) {
        let start = self.line_start(self.cursor);
        let column = self.value[start..self.cursor].graphemes(true).count();
        let target_start = if down {
            let end = self.line_end(self.cursor);
            if end == self.value.len() {
                return;
            }
            end + 1
        } else {
            if start == 0 {
                return;
            }
            self.line_start(start - 1)
        };
        let target_end = self.line_end(target_start);
        self.cursor = self.value[target_start..target_end]
            .grapheme_indices(true)
            .nth(column)
            .map_or(target_end, |(i, _)| target_start + i);
    }
}
