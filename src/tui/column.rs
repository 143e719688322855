use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::model::{Status, Ticket, TicketId};
use crate::ops::store_service::StoreCommand;

use super::confirm::ConfirmDialog;
use super::editor::TicketEditor;
use super::list::TicketList;
use super::overlay::{OverlayCommand, OverlayFrame};

/// Rows above the first item inside the border: title, filter line
pub const HEADER_HEIGHT: u16 = 2;
/// Rows per item: title, description
pub const ITEM_HEIGHT: u16 = 2;
/// Blank rows between items
pub const ITEM_SPACING: u16 = 1;

const ITEM_STRIDE: u16 = ITEM_HEIGHT + ITEM_SPACING;

/// What the board should do after a column handled input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnAction {
    Open(OverlayFrame),
    Store(StoreCommand),
}

/// One status column: a ticket list plus the gestures that act on it
#[derive(Debug, Clone)]
pub struct Column {
    status: Status,
    list: TicketList,
    focused: bool,
    area: Rect,
    last_click: Option<(TicketId, Instant)>,
    double_click: Duration,
}

impl Column {
    pub fn new(status: Status, double_click: Duration) -> Self {
        Column {
            status,
            list: TicketList::new(),
            focused: false,
            area: Rect::default(),
            last_click: None,
            double_click,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn list(&self) -> &TicketList {
        &self.list
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_capturing_input(&self) -> bool {
        self.list.is_capturing_input()
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.list.selected()
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        let body = area
            .height
            .saturating_sub(2 + HEADER_HEIGHT)
            .saturating_add(ITEM_SPACING);
        self.list.set_page_size((body / ITEM_STRIDE) as usize);
    }

    /// Replace this column's tickets with the ones in `tickets` carrying its
    /// status. The selection follows the previously selected ticket.
    pub fn set_tickets(&mut self, tickets: &[Ticket]) {
        let previous = self.list.selected().map(|t| t.id);
        let mine = tickets
            .iter()
            .filter(|t| t.status == self.status)
            .cloned()
            .collect();
        self.list.set_items(mine);
        if let Some(id) = previous {
            self.select_ticket(id);
        }
    }

    /// Select a ticket by id if it is visible. Returns whether it was.
    pub fn select_ticket(&mut self, id: TicketId) -> bool {
        match self.list.position_of(id) {
            Some(pos) => {
                self.list.select(pos);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ColumnAction> {
        if self.list.is_capturing_input()
            || key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            self.list.handle_key(key);
            return None;
        }
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => {
                if self.list.is_filtered() {
                    self.list.reset_filter();
                }
                None
            }
            KeyCode::Char('c') => Some(ColumnAction::Open(OverlayFrame::Editor(
                TicketEditor::create(),
            ))),
            KeyCode::Char('e') | KeyCode::Char(' ') => {
                let ticket = self.list.selected()?.clone();
                Some(ColumnAction::Open(OverlayFrame::Editor(TicketEditor::edit(
                    ticket,
                ))))
            }
            KeyCode::Char('d') => {
                let id = self.list.selected()?.id;
                Some(ColumnAction::Open(OverlayFrame::Confirm(ConfirmDialog::new(
                    format!("Are you sure you want to delete {id}?"),
                    vec![OverlayCommand::Store(StoreCommand::Delete(id))],
                ))))
            }
            KeyCode::Char('b') => {
                let id = self.list.selected()?.id;
                Some(ColumnAction::Store(StoreCommand::MoveToPreviousStatus(id)))
            }
            KeyCode::Char('n') => {
                let id = self.list.selected()?.id;
                Some(ColumnAction::Store(StoreCommand::MoveToNextStatus(id)))
            }
            KeyCode::Char('K') => self.rank_to(self.list.index().checked_sub(1)),
            KeyCode::Up if shift => self.rank_to(self.list.index().checked_sub(1)),
            KeyCode::Char('J') => self.rank_to(Some(self.list.index() + 1)),
            KeyCode::Down if shift => self.rank_to(Some(self.list.index() + 1)),
            KeyCode::Char('T') => self.rank_to(Some(0)),
            KeyCode::Char('B') => self.rank_to(self.list.visible_len().checked_sub(1)),
            _ => {
                self.list.handle_key(key);
                None
            }
        }
    }

    /// Rank the selection onto visible position `target`: before the ticket
    /// there when moving up, after it when moving down.
    fn rank_to(&self, target: Option<usize>) -> Option<ColumnAction> {
        let target = target?;
        let current = self.list.index();
        let id = self.list.selected()?.id;
        let anchor = self.list.visible_item(target)?.id;
        if target == current {
            return None;
        }
        let command = if target < current {
            StoreCommand::RankBefore { id, before: anchor }
        } else {
            StoreCommand::RankAfter { id, after: anchor }
        };
        Some(ColumnAction::Store(command))
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, at: Instant) -> Option<ColumnAction> {
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.list.cursor_up();
                None
            }
            MouseEventKind::ScrollDown => {
                self.list.cursor_down();
                None
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let index = self.item_at(event.column, event.row)?;
                self.list.select(index);
                let ticket = self.list.selected()?.clone();
                let double = matches!(
                    self.last_click,
                    Some((id, when)) if id == ticket.id
                        && at.saturating_duration_since(when) < self.double_click
                );
                if double {
                    self.last_click = None;
                    Some(ColumnAction::Open(OverlayFrame::Editor(TicketEditor::edit(
                        ticket,
                    ))))
                } else {
                    self.last_click = Some((ticket.id, at));
                    None
                }
            }
            _ => None,
        }
    }

    /// Screen row of the first line of the visible item `index`, if it is
    /// scrolled into view
    pub fn item_row(&self, index: usize) -> Option<u16> {
        let slot = index.checked_sub(self.list.offset())?;
        if slot >= self.list.page_size() {
            return None;
        }
        Some(self.area.y + 1 + HEADER_HEIGHT + slot as u16 * ITEM_STRIDE)
    }

    /// Visible item index under a screen position
    pub fn item_at(&self, x: u16, y: u16) -> Option<usize> {
        let inner_left = self.area.x + 1;
        let inner_right = self.area.right().saturating_sub(1);
        let first_row = self.area.y + 1 + HEADER_HEIGHT;
        if x < inner_left || x >= inner_right || y < first_row {
            return None;
        }
        let rel = y - first_row;
        if rel % ITEM_STRIDE >= ITEM_HEIGHT {
            return None;
        }
        let slot = (rel / ITEM_STRIDE) as usize;
        if slot >= self.list.page_size() {
            return None;
        }
        let index = self.list.offset() + slot;
        (index < self.list.visible_len()).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WINDOW: Duration = Duration::from_millis(500);

    fn ticket(id: i64, status: Status, rank: i64) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            status,
            title: format!("Ticket {id}"),
            description: String::new(),
            rank,
        }
    }

    fn todo_column() -> Column {
        let mut column = Column::new(Status::Todo, WINDOW);
        column.set_area(Rect::new(0, 0, 30, 20));
        column.set_tickets(&[
            ticket(1, Status::Todo, 1_000_000),
            ticket(2, Status::Done, 2_000_000),
            ticket(3, Status::Todo, 3_000_000),
            ticket(4, Status::Todo, 4_000_000),
        ]);
        column
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_only_own_status_is_listed() {
        let column = todo_column();
        let ids: Vec<i64> = column.list().visible().map(|t| t.id.number()).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_selection_follows_ticket_identity() {
        let mut column = todo_column();
        column.handle_key(key(KeyCode::Char('j')));
        assert_eq!(column.selected_ticket().unwrap().id, TicketId::new(3));

        // TK-3 moves to the top of the column
        column.set_tickets(&[
            ticket(3, Status::Todo, 500_000),
            ticket(1, Status::Todo, 1_000_000),
            ticket(4, Status::Todo, 4_000_000),
        ]);
        assert_eq!(column.list().index(), 0);
        assert_eq!(column.selected_ticket().unwrap().id, TicketId::new(3));

        // TK-3 leaves the column: the index is kept and clamped
        column.set_tickets(&[ticket(1, Status::Todo, 1_000_000)]);
        assert_eq!(column.selected_ticket().unwrap().id, TicketId::new(1));
    }

    #[test]
    fn test_rank_gestures() {
        let mut column = todo_column();
        column.handle_key(key(KeyCode::Char('j')));
        assert_eq!(
            column.handle_key(key(KeyCode::Char('K'))),
            Some(ColumnAction::Store(StoreCommand::RankBefore {
                id: TicketId::new(3),
                before: TicketId::new(1),
            }))
        );
        assert_eq!(
            column.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT)),
            Some(ColumnAction::Store(StoreCommand::RankAfter {
                id: TicketId::new(3),
                after: TicketId::new(4),
            }))
        );
        assert_eq!(
            column.handle_key(key(KeyCode::Char('B'))),
            Some(ColumnAction::Store(StoreCommand::RankAfter {
                id: TicketId::new(3),
                after: TicketId::new(4),
            }))
        );
    }

    #[test]
    fn test_rank_gestures_out_of_range_are_noops() {
        let mut column = todo_column();
        assert_eq!(column.handle_key(key(KeyCode::Char('K'))), None);
        assert_eq!(column.handle_key(key(KeyCode::Char('T'))), None);
        column.handle_key(key(KeyCode::Char('G')));
        assert_eq!(column.handle_key(key(KeyCode::Char('J'))), None);
        assert_eq!(column.handle_key(key(KeyCode::Char('B'))), None);
    }

    #[test]
    fn test_status_moves_and_delete_confirmation() {
        let mut column = todo_column();
        assert_eq!(
            column.handle_key(key(KeyCode::Char('n'))),
            Some(ColumnAction::Store(StoreCommand::MoveToNextStatus(
                TicketId::new(1)
            )))
        );
        assert_eq!(
            column.handle_key(key(KeyCode::Char('b'))),
            Some(ColumnAction::Store(StoreCommand::MoveToPreviousStatus(
                TicketId::new(1)
            )))
        );
        match column.handle_key(key(KeyCode::Char('d'))) {
            Some(ColumnAction::Open(OverlayFrame::Confirm(dialog))) => {
                assert_eq!(dialog.question(), "Are you sure you want to delete TK-1?");
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[test]
    fn test_gestures_on_empty_column() {
        let mut column = Column::new(Status::Done, WINDOW);
        assert_eq!(column.handle_key(key(KeyCode::Char('e'))), None);
        assert_eq!(column.handle_key(key(KeyCode::Char('d'))), None);
        assert_eq!(column.handle_key(key(KeyCode::Char('n'))), None);
        assert!(matches!(
            column.handle_key(key(KeyCode::Char('c'))),
            Some(ColumnAction::Open(OverlayFrame::Editor(_)))
        ));
    }

    #[test]
    fn test_filter_captures_gesture_keys() {
        let mut column = todo_column();
        column.handle_key(key(KeyCode::Char('/')));
        assert!(column.is_capturing_input());
        assert_eq!(column.handle_key(key(KeyCode::Char('d'))), None);
        assert_eq!(column.list().filter_text(), "d");
        column.handle_key(key(KeyCode::Enter));
        column.handle_key(key(KeyCode::Esc));
        assert!(!column.list().is_filtered());
    }

    #[test]
    fn test_click_hit_testing() {
        let mut column = todo_column();
        // border row 0, header rows 1-2, first item rows 3-4, gap row 5
        assert_eq!(column.item_at(2, 3), Some(0));
        assert_eq!(column.item_at(2, 4), Some(0));
        assert_eq!(column.item_at(2, 5), None);
        assert_eq!(column.item_at(2, 6), Some(1));
        assert_eq!(column.item_at(0, 6), None);
        assert_eq!(column.item_at(2, 12), None);
        assert_eq!(column.item_row(1), Some(6));

        column.handle_mouse(click(2, 9), Instant::now());
        assert_eq!(column.selected_ticket().unwrap().id, TicketId::new(4));
    }

    #[test]
    fn test_double_click_opens_editor() {
        let mut column = todo_column();
        let t0 = Instant::now();
        assert_eq!(column.handle_mouse(click(2, 3), t0), None);
        match column.handle_mouse(click(2, 4), t0 + Duration::from_millis(200)) {
            Some(ColumnAction::Open(OverlayFrame::Editor(editor))) => {
                assert_eq!(editor.ticket().unwrap().id, TicketId::new(1));
            }
            other => panic!("expected editor, got {other:?}"),
        }
    }

    #[test]
    fn test_slow_or_different_clicks_do_not_open() {
        let mut column = todo_column();
        let t0 = Instant::now();
        column.handle_mouse(click(2, 3), t0);
        assert_eq!(
            column.handle_mouse(click(2, 3), t0 + Duration::from_millis(900)),
            None
        );
        // the window is exclusive
        let t1 = t0 + Duration::from_secs(5);
        column.handle_mouse(click(2, 3), t1);
        assert_eq!(
            column.handle_mouse(click(2, 3), t1 + Duration::from_millis(500)),
            None
        );
        assert_eq!(
            column.handle_mouse(click(2, 6), t0 + Duration::from_millis(950)),
            None
        );
    }

    #[test]
    fn test_wheel_moves_selection() {
        let mut column = todo_column();
        let wheel = |kind| MouseEvent {
            kind,
            column: 2,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        column.handle_mouse(wheel(MouseEventKind::ScrollDown), Instant::now());
        assert_eq!(column.list().index(), 1);
        column.handle_mouse(wheel(MouseEventKind::ScrollUp), Instant::now());
        assert_eq!(column.list().index(), 0);
    }
}
