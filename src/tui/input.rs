//! Input field handling for the terminal user interface.
//!
//! Cursors count characters, not bytes, so titles in any script edit correctly.

/// Byte offset of the `char_idx`-th character of `s` (or `s.len()` past the end).
fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// A single-line text input field with cursor position and active state management.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input field with initial text value, cursor at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
            active: false,
        }
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        let at = byte_offset(&self.value, self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if self.cursor > 0 {
            let at = byte_offset(&self.value, self.cursor - 1);
            self.value.remove(at);
            self.cursor -= 1;
        }
    }

    /// Delete the character at the cursor position.
    pub fn handle_delete(&mut self) {
        if self.cursor < self.len() {
            let at = byte_offset(&self.value, self.cursor);
            self.value.remove(at);
        }
    }

    /// Move cursor one position to the left.
    pub fn move_cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Move cursor one position to the right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }
}

/// Multi-line editor used by the batch-add dialog.
#[derive(Clone, Debug)]
pub struct TextArea {
    lines: Vec<String>,
    /// Cursor row.
    pub row: usize,
    /// Cursor column, in characters.
    pub col: usize,
    /// First visible row.
    pub scroll: usize,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            scroll: 0,
        }
    }
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full contents with `\n` between lines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    pub fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.row];
        let at = byte_offset(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    /// Split the current line at the cursor.
    pub fn newline(&mut self) {
        let line = &mut self.lines[self.row];
        let at = byte_offset(line, self.col);
        let rest = line.split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    /// Remove the character before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = byte_offset(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else if self.row > 0 {
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&current);
        }
    }

    /// Remove the character at the cursor, joining the next line at end of line.
    pub fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let line = &mut self.lines[self.row];
            let at = byte_offset(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.line_len(self.row);
    }

    /// Adjust `scroll` so the cursor row is inside a viewport of `height` rows.
    pub fn scroll_to_cursor(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row >= self.scroll + height {
            self.scroll = self.row + 1 - height;
        } else if self.row < self.scroll {
            self.scroll = self.row;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_field_handles_multibyte_text() {
        let mut field = InputField::with_value("买菜");
        assert_eq!(field.cursor, 2);
        field.move_cursor_left();
        field.handle_char('x');
        assert_eq!(field.value, "买x菜");
        field.handle_backspace();
        field.handle_delete();
        assert_eq!(field.value, "买");
    }

    #[test]
    fn test_text_area_lines_and_joins() {
        let mut area = TextArea::new();
        for c in "Buy groceries|Get vegetables".chars() {
            area.insert_char(c);
        }
        area.newline();
        for c in "Call mom".chars() {
            area.insert_char(c);
        }
        assert_eq!(area.text(), "Buy groceries|Get vegetables\nCall mom");

        area.move_home();
        area.backspace();
        assert_eq!(area.lines().len(), 1);
        assert_eq!(area.col, "Buy groceries|Get vegetables".chars().count());

        area.newline();
        area.move_up();
        area.move_end();
        area.delete();
        assert_eq!(area.text(), "Buy groceries|Get vegetablesCall mom");
    }

    #[test]
    fn test_text_area_scroll_follows_cursor() {
        let mut area = TextArea::new();
        for _ in 0..10 {
            area.newline();
        }
        area.scroll_to_cursor(4);
        assert_eq!(area.scroll, 7);
        for _ in 0..10 {
            area.move_up();
        }
        area.scroll_to_cursor(4);
        assert_eq!(area.scroll, 0);
        assert!(area.is_blank());
    }
}
