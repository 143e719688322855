use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthStr;

use super::overlay::OverlayCommand;

pub const CONFIRM_SUFFIX: &str = " (y/n)";

/// Yes/no question. Accepting closes the dialog, then runs `accept`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    question: String,
    accept: Vec<OverlayCommand>,
}

impl ConfirmDialog {
    pub fn new(question: impl Into<String>, accept: Vec<OverlayCommand>) -> Self {
        ConfirmDialog {
            question: question.into(),
            accept,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<OverlayCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => vec![OverlayCommand::Quit],
                _ => Vec::new(),
            };
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let mut commands = vec![OverlayCommand::Close];
                commands.extend(self.accept.iter().cloned());
                commands
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                vec![OverlayCommand::Close]
            }
            _ => Vec::new(),
        }
    }

    /// Question plus border and padding; never larger than `max`
    pub fn required_size(&self, max: (u16, u16)) -> (u16, u16) {
        let text = self.question.width() + CONFIRM_SUFFIX.len();
        let width = (text as u16).saturating_add(2 + 4);
        (width.min(max.0), 5.min(max.1))
    }
}
