//! Single-line text input for typing a directory path.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// State for text input.
///
/// The cursor is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
    error: Option<String>,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input state with an initial value.
    pub fn with_initial(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.len(),
            error: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in characters, for rendering.
    pub fn cursor_chars(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Show a validation error; the input stays open.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        self.error = None;

        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputResult::Submit(self.buffer.trim().to_string()),

            (KeyCode::Esc, _) => InputResult::Cancel,

            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    let start = self.prev_boundary();
                    self.buffer.replace_range(start..self.cursor, "");
                    self.cursor = start;
                }
                InputResult::Continue
            }

            (KeyCode::Delete, _) => {
                let end = self.next_boundary();
                self.buffer.replace_range(self.cursor..end, "");
                InputResult::Continue
            }

            (KeyCode::Left, _) => {
                self.cursor = self.prev_boundary();
                InputResult::Continue
            }

            (KeyCode::Right, _) => {
                self.cursor = self.next_boundary();
                InputResult::Continue
            }

            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                InputResult::Continue
            }

            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.buffer.len();
                InputResult::Continue
            }

            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.cursor = 0;
                InputResult::Continue
            }

            // Ctrl-W deletes back to the previous path separator.
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                if self.cursor > 0 {
                    let before = self.buffer[..self.cursor].trim_end_matches('/');
                    let start = before.rfind('/').map_or(0, |i| i + 1);
                    self.buffer.replace_range(start..self.cursor, "");
                    self.cursor = start;
                }
                InputResult::Continue
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                InputResult::Continue
            }

            _ => InputResult::Continue,
        }
    }
}

/// Result of handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Cancel,
    Submit(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_str(input: &mut InputState, text: &str) {
        for c in text.chars() {
            input.handle_key(key_event(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[test]
    fn test_input_basic() {
        let mut input = InputState::new();
        type_str(&mut input, "/srv");
        assert_eq!(input.buffer(), "/srv");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_input_multibyte() {
        let mut input = InputState::new();
        type_str(&mut input, "/写真");
        assert_eq!(input.cursor_chars(), 3);

        input.handle_key(key_event(KeyCode::Left, KeyModifiers::NONE));
        input.handle_key(key_event(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.buffer(), "/真");
        assert_eq!(input.cursor_chars(), 1);
    }

    #[test]
    fn test_ctrl_w_deletes_component() {
        let mut input = InputState::with_initial("/srv/photos/2021");
        input.handle_key(key_event(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(input.buffer(), "/srv/photos/");
        input.handle_key(key_event(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(input.buffer(), "/srv/");
    }

    #[test]
    fn test_submit_trims_and_cancel() {
        let mut input = InputState::with_initial("  /srv ");
        assert_eq!(
            input.handle_key(key_event(KeyCode::Enter, KeyModifiers::NONE)),
            InputResult::Submit("/srv".to_string())
        );
        assert_eq!(
            input.handle_key(key_event(KeyCode::Esc, KeyModifiers::NONE)),
            InputResult::Cancel
        );
    }

    #[test]
    fn test_error_cleared_on_key() {
        let mut input = InputState::new();
        input.set_error("Not an absolute path: srv");
        type_str(&mut input, "x");
        assert!(input.error().is_none());
    }
}
