use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::Ticket;
use crate::ops::store_service::StoreCommand;

use super::confirm::ConfirmDialog;
use super::overlay::{OverlayCommand, OverlayFrame};
use super::text_field::TextField;

pub const DISCARD_QUESTION: &str = "Are you sure you want to exit editing?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Description,
}

/// Create/edit form for a single ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketEditor {
    /// The persisted ticket being edited; `None` when creating
    ticket: Option<Ticket>,
    title: TextField,
    description: TextField,
    focus: EditorField,
}

impl TicketEditor {
    pub fn create() -> Self {
        let mut editor = TicketEditor {
            ticket: None,
            title: TextField::single_line("Title"),
            description: TextField::multi_line("Description"),
            focus: EditorField::Title,
        };
        editor.title.focus();
        editor
    }

    pub fn edit(ticket: Ticket) -> Self {
        let mut editor = TicketEditor::create();
        editor.title.set_value(&ticket.title);
        editor.description.set_value(&ticket.description);
        editor.ticket = Some(ticket);
        editor
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn title(&self) -> &TextField {
        &self.title
    }

    pub fn description(&self) -> &TextField {
        &self.description
    }

    pub fn focus(&self) -> EditorField {
        self.focus
    }

    /// Whether the inputs differ from the persisted ticket (or are
    /// non-empty for a new one)
    pub fn has_changed(&self) -> bool {
        let (title, description) = match &self.ticket {
            Some(t) => (t.title.as_str(), t.description.as_str()),
            None => ("", ""),
        };
        self.title.value().trim() != title || self.description.value().trim() != description
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<OverlayCommand> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => vec![OverlayCommand::Quit],
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Esc if self.has_changed() => {
                vec![OverlayCommand::Push(OverlayFrame::Confirm(
                    ConfirmDialog::new(DISCARD_QUESTION, vec![OverlayCommand::Close]),
                ))]
            }
            KeyCode::Esc => vec![OverlayCommand::Close],
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                Vec::new()
            }
            KeyCode::Enter if self.focus == EditorField::Title => {
                self.toggle_focus();
                Vec::new()
            }
            _ => {
                match self.focus {
                    EditorField::Title => self.title.handle_key(key),
                    EditorField::Description => self.description.handle_key(key),
                };
                Vec::new()
            }
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            EditorField::Title => {
                self.title.blur();
                self.description.focus();
                EditorField::Description
            }
            EditorField::Description => {
                self.description.blur();
                self.title.focus();
                EditorField::Title
            }
        };
    }

    fn save(&self) -> Vec<OverlayCommand> {
        let title = self.title.value().trim().to_string();
        let description = self.description.value().trim().to_string();
        let command = match &self.ticket {
            Some(ticket) => StoreCommand::UpdateContent {
                id: ticket.id,
                title,
                description,
            },
            None => StoreCommand::Create { title, description },
        };
        vec![OverlayCommand::Store(command), OverlayCommand::Close]
    }

    /// Leaves a two-column, one-row margin inside `max`
    pub fn required_size(&self, max: (u16, u16)) -> (u16, u16) {
        (max.0.saturating_sub(4), max.1.saturating_sub(2))
    }
}
