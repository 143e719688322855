use crossterm::event::KeyEvent;

use crate::ops::store_service::StoreCommand;

use super::confirm::ConfirmDialog;
use super::editor::TicketEditor;

/// A modal window on the overlay stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayFrame {
    Editor(TicketEditor),
    Confirm(ConfirmDialog),
}

/// What a frame asks of the stack after handling a key. Applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    /// Pop the topmost frame
    Close,
    Push(OverlayFrame),
    Store(StoreCommand),
    Quit,
}

impl OverlayFrame {
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<OverlayCommand> {
        match self {
            OverlayFrame::Editor(editor) => editor.handle_key(key),
            OverlayFrame::Confirm(dialog) => dialog.handle_key(key),
        }
    }

    /// Size (width, height) this frame wants within `max`
    pub fn required_size(&self, max: (u16, u16)) -> (u16, u16) {
        match self {
            OverlayFrame::Editor(editor) => editor.required_size(max),
            OverlayFrame::Confirm(dialog) => dialog.required_size(max),
        }
    }
}

/// Side effects the board must carry out after the stack handled a key
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OverlayOutcome {
    pub store: Vec<StoreCommand>,
    pub quit: bool,
}

/// Stack of modal frames. While non-empty it owns all input and only the
/// topmost frame receives keys.
#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    frames: Vec<OverlayFrame>,
}

impl OverlayStack {
    pub fn new() -> Self {
        OverlayStack::default()
    }

    pub fn is_active(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames bottom to top
    pub fn frames(&self) -> &[OverlayFrame] {
        &self.frames
    }

    pub fn top(&self) -> Option<&OverlayFrame> {
        self.frames.last()
    }

    pub fn push(&mut self, frame: OverlayFrame) {
        self.frames.push(frame);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayOutcome {
        let Some(top) = self.frames.last_mut() else {
            return OverlayOutcome::default();
        };
        let commands = top.handle_key(key);
        self.apply(commands)
    }

    fn apply(&mut self, commands: Vec<OverlayCommand>) -> OverlayOutcome {
        let mut outcome = OverlayOutcome::default();
        for command in commands {
            match command {
                OverlayCommand::Close => {
                    self.frames.pop();
                }
                OverlayCommand::Push(frame) => self.frames.push(frame),
                OverlayCommand::Store(store) => outcome.store.push(store),
                OverlayCommand::Quit => outcome.quit = true,
            }
        }
        outcome
    }
}
