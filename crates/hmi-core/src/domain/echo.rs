//! Local echo of typed text.
//!
//! Keyboard-style panels show the operator what they have typed so far.
//! The buffer stores characters (not bytes) so the cursor always sits on a
//! character boundary.

/// Editable text with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl EchoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `ch` at the cursor and moves the cursor past it.
    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor.  Returns `false` at the start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Deletes the character under the cursor.  Returns `false` at the end.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Returns the text and empties the buffer.
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(text: &str) -> EchoBuffer {
        let mut buf = EchoBuffer::new();
        for ch in text.chars() {
            buf.insert(ch);
        }
        buf
    }

    #[test]
    fn test_insert_appends_at_cursor() {
        let buf = buffer_with("abc");

        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_insert_in_middle_after_moving_left() {
        // Arrange
        let mut buf = buffer_with("ac");

        // Act
        buf.move_left();
        buf.insert('b');

        // Assert
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_backspace_and_delete() {
        // Arrange
        let mut buf = buffer_with("abcd");
        buf.move_left();
        buf.move_left();

        // Act
        assert!(buf.backspace());
        assert!(buf.delete());

        // Assert
        assert_eq!(buf.text(), "ad");
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn test_edits_at_bounds_are_no_ops() {
        let mut buf = buffer_with("x");

        assert!(!buf.delete());
        buf.home();
        assert!(!buf.backspace());
        buf.move_left();
        assert_eq!(buf.cursor(), 0);
        buf.end();
        buf.move_right();
        assert_eq!(buf.cursor(), 1);
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn test_take_returns_text_and_clears() {
        let mut buf = buffer_with("12+3");

        assert_eq!(buf.take(), "12+3");
        assert!(buf.is_empty());
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_multibyte_characters_keep_cursor_on_boundaries() {
        let mut buf = buffer_with("äö");

        buf.move_left();
        buf.backspace();

        assert_eq!(buf.text(), "ö");
        assert_eq!(buf.len(), 1);
    }
}
