use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use regex::Regex;

use crate::model::{Ticket, TicketId};

/// Where the list's filter is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unfiltered,
    /// The user is typing a filter; the list captures all keys
    Filtering,
    /// A filter is applied and navigation works on the matches
    Applied,
}

/// Scrollable, filterable list of tickets with a single selection.
///
/// `selected` and `offset` index into the visible (filtered) items.
#[derive(Debug, Clone)]
pub struct TicketList {
    items: Vec<Ticket>,
    visible: Vec<usize>,
    selected: usize,
    offset: usize,
    page_size: usize,
    filter_state: FilterState,
    filter: String,
}

impl Default for TicketList {
    fn default() -> Self {
        TicketList::new()
    }
}

impl TicketList {
    pub fn new() -> Self {
        TicketList {
            items: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            offset: 0,
            page_size: 1,
            filter_state: FilterState::Unfiltered,
            filter: String::new(),
        }
    }

    /// Replace the items, keeping the current filter. Selection is clamped.
    pub fn set_items(&mut self, items: Vec<Ticket>) {
        self.items = items;
        self.refilter(None);
    }

    pub fn items(&self) -> &[Ticket] {
        &self.items
    }

    /// Items passing the filter, in order
    pub fn visible(&self) -> impl Iterator<Item = &Ticket> {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_item(&self, index: usize) -> Option<&Ticket> {
        self.visible.get(index).map(|&i| &self.items[i])
    }

    /// Index of the selection among the visible items
    pub fn index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Ticket> {
        self.visible_item(self.selected)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
        self.scroll_to_selection();
    }

    /// Select a visible index, clamped into range
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.visible.len().saturating_sub(1));
        self.scroll_to_selection();
    }

    /// Visible position of a ticket
    pub fn position_of(&self, id: TicketId) -> Option<usize> {
        self.visible.iter().position(|&i| self.items[i].id == id)
    }

    pub fn cursor_up(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn cursor_down(&mut self) {
        self.select(self.selected + 1);
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    /// True while a filter is being typed
    pub fn is_capturing_input(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    pub fn is_filtered(&self) -> bool {
        self.filter_state == FilterState::Applied
    }

    pub fn reset_filter(&mut self) {
        let keep = self.selected().map(|t| t.id);
        self.filter.clear();
        self.filter_state = FilterState::Unfiltered;
        self.refilter(keep);
    }

    /// Case-insensitive matcher for the current filter. Invalid regex
    /// syntax falls back to a literal match.
    pub fn filter_regex(&self) -> Option<Regex> {
        if self.filter_state == FilterState::Unfiltered || self.filter.is_empty() {
            return None;
        }
        Regex::new(&format!("(?i){}", self.filter))
            .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(&self.filter))))
            .ok()
    }

    /// Returns whether the key was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.filter_state == FilterState::Filtering {
            self.handle_filter_key(key);
            return true;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.cursor_up(),
            KeyCode::Down | KeyCode::Char('j') => self.cursor_down(),
            KeyCode::Home | KeyCode::Char('g') => self.select(0),
            KeyCode::End | KeyCode::Char('G') => self.select(usize::MAX),
            KeyCode::PageUp => self.select(self.selected.saturating_sub(self.page_size)),
            KeyCode::PageDown => self.select(self.selected.saturating_add(self.page_size)),
            KeyCode::Char('/') => self.filter_state = FilterState::Filtering,
            _ => return false,
        }
        true
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        let keep = self.selected().map(|t| t.id);
        match key.code {
            KeyCode::Esc => self.reset_filter(),
            KeyCode::Enter => {
                self.filter_state = if self.filter.is_empty() {
                    FilterState::Unfiltered
                } else {
                    FilterState::Applied
                };
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.refilter(keep);
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.filter.push(c);
                self.refilter(keep);
            }
            _ => {}
        }
    }

    fn refilter(&mut self, keep: Option<TicketId>) {
        let re = self.filter_regex();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, t)| re.as_ref().is_none_or(|re| re.is_match(&t.filter_value())))
            .map(|(i, _)| i)
            .collect();
        match keep.and_then(|id| self.position_of(id)) {
            Some(pos) => self.select(pos),
            None => self.select(self.selected),
        }
    }

    fn scroll_to_selection(&mut self) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + self.page_size {
            self.offset = self.selected + 1 - self.page_size;
        }
        let max_offset = self.visible.len().saturating_sub(self.page_size);
        self.offset = self.offset.min(max_offset);
    }
}
