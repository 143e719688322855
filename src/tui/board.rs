use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::io::state::{ColumnUiState, UiState};
use crate::model::Status;
use crate::ops::store_service::{StoreCommand, StoreEvent};
use crate::ops::ticket_store::StoreError;

use super::column::{Column, ColumnAction};
use super::overlay::OverlayStack;

/// Lifecycle of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Failed,
    Quitting,
}

/// A fatal error as shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub summary: String,
    pub detail: String,
}

impl Failure {
    pub fn new(summary: impl Into<String>, detail: impl ToString) -> Self {
        Failure {
            summary: summary.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        Failure::new(err.summary(), &err)
    }
}

/// Input to the board
#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Mouse { event: MouseEvent, at: Instant },
    Resize(u16, u16),
    Tick,
    DatabaseOpened,
    OpenFailed(Failure),
    Store(StoreEvent),
}

/// Work the runtime must carry out on the board's behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenDatabase,
    Store(StoreCommand),
}

/// Top-level board state. Never performs I/O: every transition returns the
/// effects it needs as data.
#[derive(Debug)]
pub struct Board {
    phase: Phase,
    failure: Option<Failure>,
    width: u16,
    height: u16,
    columns: Vec<Column>,
    focused: usize,
    overlay: OverlayStack,
    spinner: usize,
    double_click: Duration,
    restore: Option<UiState>,
}

impl Board {
    /// `restore` is the UI state saved by a previous session
    pub fn new(double_click: Duration, restore: Option<UiState>) -> Self {
        Board {
            phase: Phase::Loading,
            failure: None,
            width: 0,
            height: 0,
            columns: Vec::new(),
            focused: 0,
            overlay: OverlayStack::new(),
            spinner: 0,
            double_click,
            restore,
        }
    }

    pub fn init(&self) -> Vec<Effect> {
        vec![Effect::OpenDatabase]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn should_quit(&self) -> bool {
        self.phase == Phase::Quitting
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn take_failure(&mut self) -> Option<Failure> {
        self.failure.take()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn overlay(&self) -> &OverlayStack {
        &self.overlay
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner
    }

    pub fn window_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Current selections, or `None` before the columns exist
    pub fn ui_state(&self) -> Option<UiState> {
        if self.columns.is_empty() {
            return None;
        }
        let mut state = UiState::default();
        for column in &self.columns {
            state.columns.insert(
                column.status(),
                ColumnUiState {
                    selected: column.selected_ticket().map(|t| t.id),
                },
            );
        }
        Some(state)
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.phase == Phase::Loading {
                    self.spinner = self.spinner.wrapping_add(1);
                }
                Vec::new()
            }
            Msg::Resize(width, height) => {
                self.width = width;
                self.height = height;
                self.layout_columns();
                Vec::new()
            }
            Msg::OpenFailed(failure) => self.fail(failure),
            Msg::Store(StoreEvent::Failed(err)) => self.fail(err.into()),
            Msg::Key(key) if self.phase == Phase::Failed => {
                if key.kind == KeyEventKind::Press {
                    tracing::info!("leaving failure view");
                    self.phase = Phase::Quitting;
                }
                Vec::new()
            }
            Msg::DatabaseOpened if self.phase == Phase::Loading => self.build_columns(),
            Msg::Store(StoreEvent::TicketsUpdated(tickets)) if self.is_live() => {
                for column in &mut self.columns {
                    column.set_tickets(&tickets);
                }
                if self.phase == Phase::Loading {
                    self.restore_selections();
                    self.phase = Phase::Ready;
                }
                Vec::new()
            }
            Msg::Key(key) if self.phase == Phase::Ready => self.handle_key(key),
            Msg::Mouse { event, at } if self.phase == Phase::Ready => {
                self.handle_mouse(event, at)
            }
            _ => Vec::new(),
        }
    }

    fn is_live(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::Ready)
    }

    fn fail(&mut self, failure: Failure) -> Vec<Effect> {
        if !self.is_live() {
            tracing::warn!(
                summary = %failure.summary,
                detail = %failure.detail,
                "ignoring failure after shutdown began"
            );
            return Vec::new();
        }
        tracing::error!(
            summary = %failure.summary,
            detail = %failure.detail,
            "board failed"
        );
        self.failure = Some(failure);
        self.phase = Phase::Failed;
        Vec::new()
    }

    fn build_columns(&mut self) -> Vec<Effect> {
        self.columns = Status::ALL
            .iter()
            .map(|&status| Column::new(status, self.double_click))
            .collect();
        self.focused = 0;
        if let Some(column) = self.columns.get_mut(self.focused) {
            column.focus();
        }
        self.layout_columns();
        vec![Effect::Store(StoreCommand::Load)]
    }

    fn restore_selections(&mut self) {
        let Some(state) = self.restore.take() else {
            return;
        };
        for column in &mut self.columns {
            if let Some(id) = state.selected(column.status()) {
                column.select_ticket(id);
            }
        }
    }

    fn column_width(&self) -> u16 {
        match self.columns.len() {
            0 => 0,
            n => self.width / n as u16,
        }
    }

    fn layout_columns(&mut self) {
        let width = self.column_width();
        let height = self.height;
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.set_area(Rect::new(i as u16 * width, 0, width, height));
        }
    }

    fn set_focus(&mut self, index: usize) {
        if let Some(column) = self.columns.get_mut(self.focused) {
            column.blur();
        }
        self.focused = index;
        if let Some(column) = self.columns.get_mut(index) {
            column.focus();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if self.overlay.is_active() {
            let outcome = self.overlay.handle_key(key);
            if outcome.quit {
                self.quit();
            }
            return outcome.store.into_iter().map(Effect::Store).collect();
        }

        let capturing = self
            .columns
            .get(self.focused)
            .is_some_and(Column::is_capturing_input);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let count = self.columns.len();
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.quit();
                Vec::new()
            }
            KeyCode::Char('q') if !capturing && !ctrl => {
                self.quit();
                Vec::new()
            }
            KeyCode::Left | KeyCode::Char('h') if !capturing && count > 0 => {
                self.set_focus((self.focused + count - 1) % count);
                Vec::new()
            }
            KeyCode::Right | KeyCode::Char('l') if !capturing && count > 0 => {
                self.set_focus((self.focused + 1) % count);
                Vec::new()
            }
            _ => {
                let action = self
                    .columns
                    .get_mut(self.focused)
                    .and_then(|column| column.handle_key(key));
                self.apply(action)
            }
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, at: Instant) -> Vec<Effect> {
        if self.overlay.is_active() {
            return Vec::new();
        }
        let width = self.column_width();
        if width == 0 || event.row >= self.height {
            return Vec::new();
        }
        let index = (event.column / width) as usize;
        if index >= self.columns.len() {
            return Vec::new();
        }
        if event.kind == MouseEventKind::Down(MouseButton::Left) {
            self.set_focus(index);
        }
        let action = self.columns[index].handle_mouse(event, at);
        self.apply(action)
    }

    fn apply(&mut self, action: Option<ColumnAction>) -> Vec<Effect> {
        match action {
            Some(ColumnAction::Open(frame)) => {
                self.overlay.push(frame);
                Vec::new()
            }
            Some(ColumnAction::Store(command)) => vec![Effect::Store(command)],
            None => Vec::new(),
        }
    }

    fn quit(&mut self) {
        tracing::info!("quit requested");
        self.phase = Phase::Quitting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::database::GatewayError;
    use crate::model::{Ticket, TicketId};
    use crate::ops::rank::RankError;
    use crate::tui::overlay::OverlayFrame;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ticket(id: i64, status: Status) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            status,
            title: format!("Ticket {id}"),
            description: String::new(),
            rank: id * 1_000_000,
        }
    }

    fn sample() -> Vec<Ticket> {
        vec![
            ticket(1, Status::Todo),
            ticket(2, Status::Todo),
            ticket(3, Status::InProgress),
            ticket(4, Status::Done),
        ]
    }

    fn ready_board() -> Board {
        let mut board = Board::new(Duration::from_millis(500), None);
        board.update(Msg::Resize(90, 30));
        board.update(Msg::DatabaseOpened);
        board.update(Msg::Store(StoreEvent::TicketsUpdated(sample())));
        board
    }

    #[test]
    fn test_loading_sequence() {
        let mut board = Board::new(Duration::from_millis(500), None);
        assert_eq!(board.init(), vec![Effect::OpenDatabase]);
        assert_eq!(board.phase(), Phase::Loading);

        board.update(Msg::Tick);
        board.update(Msg::Tick);
        assert_eq!(board.spinner_frame(), 2);
        assert!(board.update(key(KeyCode::Char('q'))).is_empty());
        assert_eq!(board.phase(), Phase::Loading);

        assert_eq!(
            board.update(Msg::DatabaseOpened),
            vec![Effect::Store(StoreCommand::Load)]
        );
        assert_eq!(board.columns().len(), 3);
        assert!(board.columns()[0].is_focused());
        assert_eq!(board.phase(), Phase::Loading);

        board.update(Msg::Store(StoreEvent::TicketsUpdated(sample())));
        assert_eq!(board.phase(), Phase::Ready);
        assert_eq!(board.columns()[0].list().visible_len(), 2);
        assert_eq!(board.columns()[2].list().visible_len(), 1);
    }

    #[test]
    fn test_resize_splits_width_evenly() {
        let board = ready_board();
        let areas: Vec<Rect> = board.columns().iter().map(Column::area).collect();
        assert_eq!(
            areas,
            vec![
                Rect::new(0, 0, 30, 30),
                Rect::new(30, 0, 30, 30),
                Rect::new(60, 0, 30, 30),
            ]
        );
    }

    #[test]
    fn test_focus_cycles_both_ways() {
        let mut board = ready_board();
        board.update(key(KeyCode::Left));
        assert_eq!(board.focused_index(), 2);
        board.update(key(KeyCode::Char('l')));
        assert_eq!(board.focused_index(), 0);
        board.update(key(KeyCode::Right));
        assert_eq!(board.focused_index(), 1);
        assert!(board.columns()[1].is_focused());
        assert!(!board.columns()[0].is_focused());
    }

    #[test]
    fn test_focus_keys_go_to_filter_while_capturing() {
        let mut board = ready_board();
        board.update(key(KeyCode::Char('/')));
        board.update(key(KeyCode::Char('h')));
        board.update(key(KeyCode::Char('q')));
        assert_eq!(board.focused_index(), 0);
        assert_eq!(board.phase(), Phase::Ready);
        assert_eq!(board.columns()[0].list().filter_text(), "hq");
    }

    #[test]
    fn test_quit_keys() {
        let mut board = ready_board();
        board.update(key(KeyCode::Char('q')));
        assert!(board.should_quit());

        let mut board = ready_board();
        board.update(Msg::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(board.should_quit());
    }

    #[test]
    fn test_column_gesture_becomes_store_effect() {
        let mut board = ready_board();
        assert_eq!(
            board.update(key(KeyCode::Char('n'))),
            vec![Effect::Store(StoreCommand::MoveToNextStatus(TicketId::new(1)))]
        );
    }

    #[test]
    fn test_overlay_owns_input() {
        let mut board = ready_board();
        board.update(key(KeyCode::Char('c')));
        assert!(board.overlay().is_active());

        // 'q' and 'l' are typed into the title, not handled by the board
        board.update(key(KeyCode::Char('q')));
        board.update(key(KeyCode::Char('l')));
        assert_eq!(board.phase(), Phase::Ready);
        assert_eq!(board.focused_index(), 0);
        match board.overlay().top() {
            Some(OverlayFrame::Editor(editor)) => assert_eq!(editor.title().value(), "ql"),
            other => panic!("expected editor, got {other:?}"),
        }

        // mouse is dropped while an overlay is open
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 70,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        board.update(Msg::Mouse {
            event: click,
            at: Instant::now(),
        });
        assert_eq!(board.focused_index(), 0);

        let effects = board.update(Msg::Key(KeyEvent::new(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(
            effects,
            vec![Effect::Store(StoreCommand::Create {
                title: "ql".into(),
                description: String::new(),
            })]
        );
        assert!(!board.overlay().is_active());
    }

    #[test]
    fn test_ctrl_c_in_overlay_quits() {
        let mut board = ready_board();
        board.update(key(KeyCode::Char('e')));
        board.update(Msg::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(board.should_quit());
    }

    #[test]
    fn test_click_focuses_column_under_cursor() {
        let mut board = ready_board();
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 65,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        board.update(Msg::Mouse {
            event: click,
            at: Instant::now(),
        });
        assert_eq!(board.focused_index(), 2);
        assert_eq!(
            board.columns()[2].selected_ticket().map(|t| t.id),
            Some(TicketId::new(4))
        );
    }

    #[test]
    fn test_store_failure_enters_failed_phase() {
        let mut board = ready_board();
        board.update(Msg::Store(StoreEvent::Failed(StoreError::Rank {
            summary: "Failed to update rank",
            source: RankError::InsufficientRankSpace,
        })));
        assert_eq!(board.phase(), Phase::Failed);
        assert_eq!(
            board.failure().map(|f| f.summary.as_str()),
            Some("Failed to update rank")
        );

        // later failures keep the first one
        board.update(Msg::OpenFailed(Failure::new("other", "x")));
        assert_eq!(board.failure().unwrap().summary, "Failed to update rank");

        board.update(key(KeyCode::Char('x')));
        assert!(board.should_quit());
        assert!(board.failure().is_some());
    }

    #[test]
    fn test_open_failure_during_loading() {
        let mut board = Board::new(Duration::from_millis(500), None);
        let failure = Failure::new(
            "Failed to open database",
            GatewayError::UnsupportedSchemaVersion {
                supported: 2,
                found: 9,
            },
        );
        board.update(Msg::OpenFailed(failure.clone()));
        assert_eq!(board.phase(), Phase::Failed);
        assert_eq!(board.failure(), Some(&failure));
        // a late database event cannot revive the board
        board.update(Msg::DatabaseOpened);
        assert!(board.columns().is_empty());
    }

    #[test]
    fn test_restores_selections_and_focuses_first_column() {
        let mut saved = UiState::default();
        saved.columns.insert(
            Status::Todo,
            ColumnUiState {
                selected: Some(TicketId::new(2)),
            },
        );

        let mut board = Board::new(Duration::from_millis(500), Some(saved));
        board.update(Msg::Resize(90, 30));
        board.update(Msg::DatabaseOpened);
        board.update(Msg::Store(StoreEvent::TicketsUpdated(sample())));
        assert_eq!(board.phase(), Phase::Ready);
        assert_eq!(board.focused_index(), 0);
        assert!(board.columns()[0].is_focused());
        assert_eq!(
            board.columns()[0].selected_ticket().map(|t| t.id),
            Some(TicketId::new(2))
        );

        let state = board.ui_state().unwrap();
        assert_eq!(state.selected(Status::Todo), Some(TicketId::new(2)));
        assert_eq!(state.selected(Status::InProgress), Some(TicketId::new(3)));
    }
}
