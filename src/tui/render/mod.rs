pub mod column_view;
pub mod overlay_view;
pub mod status_view;

mod helpers;
#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::board::{Board, Phase};
use super::theme::Theme;

/// Main render function — dispatches on the board phase
pub fn render(frame: &mut Frame, board: &Board, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    if let Some(failure) = board.failure() {
        status_view::render_failure(frame, failure, theme, area);
        return;
    }
    match board.phase() {
        Phase::Loading => status_view::render_loading(frame, board, theme, area),
        Phase::Ready | Phase::Failed | Phase::Quitting => {
            for column in board.columns() {
                column_view::render_column(frame, column, theme);
            }
            if board.overlay().is_active() {
                overlay_view::render_overlays(frame, board.overlay(), theme, area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::ops::rank::RankError;
    use crate::ops::store_service::StoreEvent;
    use crate::ops::ticket_store::StoreError;
    use crate::tui::board::Msg;
    use test_helpers::*;

    #[test]
    fn test_board_renders_three_columns() {
        let board = ready_board(&sample_tickets());
        let theme = Theme::default();
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &board, &theme));
        let header = out.lines().nth(1).unwrap_or_default();
        let todo = header.find("TODO").unwrap();
        let progress = header.find("IN PROGRESS").unwrap();
        let done = header.find("DONE").unwrap();
        assert!(todo < progress && progress < done, "{out}");
        assert!(out.contains("Deploy TK-3"), "{out}");
    }

    #[test]
    fn test_failure_replaces_board() {
        let mut board = ready_board(&sample_tickets());
        board.update(Msg::Store(StoreEvent::Failed(StoreError::Rank {
            summary: "Failed to update rank",
            source: RankError::InsufficientRankSpace,
        })));
        let theme = Theme::default();
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &board, &theme));
        assert!(out.contains("Failed to update rank"), "{out}");
        assert!(!out.contains("TODO"), "{out}");
    }

    #[test]
    fn test_filter_line_while_typing() {
        let mut board = ready_board(&sample_tickets());
        for c in ['/', 'f', 'i', 'x'] {
            board.update(Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
        }
        let theme = Theme::default();
        let out = render_to_string(TERM_W, TERM_H, |frame, _| render(frame, &board, &theme));
        assert!(out.contains("/fix"), "{out}");
        assert!(out.contains("TODO  1/2"), "{out}");
        assert!(out.contains("Fix login TK-2"), "{out}");
        assert!(!out.contains("Write docs"), "{out}");
    }
}
