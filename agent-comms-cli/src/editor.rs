//! Line buffer for the interactive chat prompt.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the chat loop should do after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Nothing visible changed
    Ignore,
    /// The prompt line must be redrawn
    Redraw,
    /// A finished, non-empty line to post
    Submit(String),
    Quit,
}

#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn prompt(&self) -> String {
        format!("> {}", self.buffer)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if key.kind != KeyEventKind::Press {
            return EditorAction::Ignore;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => EditorAction::Quit,
            KeyCode::Esc => EditorAction::Quit,
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.buffer);
                let line = line.trim();
                if line.is_empty() {
                    EditorAction::Redraw
                } else {
                    EditorAction::Submit(line.to_string())
                }
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    EditorAction::Redraw
                } else {
                    EditorAction::Ignore
                }
            }
            KeyCode::Char(ch) if !ctrl => {
                self.buffer.push(ch);
                EditorAction::Redraw
            }
            _ => EditorAction::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(editor: &mut LineEditor, text: &str) {
        for ch in text.chars() {
            assert_eq!(editor.handle_key(key(KeyCode::Char(ch))), EditorAction::Redraw);
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut editor = LineEditor::new();
        type_text(&mut editor, "  hello web  ");
        assert_eq!(editor.prompt(), ">   hello web  ");

        assert_eq!(
            editor.handle_key(key(KeyCode::Enter)),
            EditorAction::Submit("hello web".to_string())
        );
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn test_blank_line_is_not_submitted() {
        let mut editor = LineEditor::new();
        type_text(&mut editor, "   ");
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), EditorAction::Redraw);
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn test_backspace() {
        let mut editor = LineEditor::new();
        type_text(&mut editor, "héy");
        assert_eq!(editor.handle_key(key(KeyCode::Backspace)), EditorAction::Redraw);
        assert_eq!(editor.buffer(), "hé");
        editor.handle_key(key(KeyCode::Backspace));
        editor.handle_key(key(KeyCode::Backspace));
        assert_eq!(editor.handle_key(key(KeyCode::Backspace)), EditorAction::Ignore);
    }

    #[test]
    fn test_quit_keys() {
        let mut editor = LineEditor::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(ctrl_c), EditorAction::Quit);
        assert_eq!(editor.handle_key(ctrl_d), EditorAction::Quit);
        assert_eq!(editor.handle_key(key(KeyCode::Esc)), EditorAction::Quit);
    }

    #[test]
    fn test_other_control_chords_are_ignored() {
        let mut editor = LineEditor::new();
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert_eq!(editor.handle_key(ctrl_a), EditorAction::Ignore);
        assert_eq!(editor.handle_key(key(KeyCode::Up)), EditorAction::Ignore);
        assert_eq!(editor.buffer(), "");
    }
}
