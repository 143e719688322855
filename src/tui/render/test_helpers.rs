use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::model::{Status, Ticket, TicketId};
use crate::ops::store_service::StoreEvent;
use crate::tui::board::{Board, Msg};

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn ticket(id: i64, status: Status, title: &str, description: &str) -> Ticket {
    Ticket {
        id: TicketId::new(id),
        status,
        title: title.into(),
        description: description.into(),
        rank: id * 1_000_000,
    }
}

/// Two Todo tickets and one in progress; Done is empty.
pub fn sample_tickets() -> Vec<Ticket> {
    vec![
        ticket(1, Status::Todo, "Write docs", "first line\nsecond line"),
        ticket(2, Status::Todo, "Fix login", ""),
        ticket(3, Status::InProgress, "Deploy", "to staging"),
    ]
}

/// A board sized to the test terminal that has loaded `tickets`
pub fn ready_board(tickets: &[Ticket]) -> Board {
    let mut board = Board::new(Duration::from_millis(500), None);
    board.update(Msg::Resize(TERM_W, TERM_H));
    board.update(Msg::DatabaseOpened);
    board.update(Msg::Store(StoreEvent::TicketsUpdated(tickets.to_vec())));
    board
}
