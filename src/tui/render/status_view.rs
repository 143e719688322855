use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

use crate::tui::board::{Board, Failure};
use crate::tui::theme::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render_loading(frame: &mut Frame, board: &Board, theme: &Theme, area: Rect) {
    if area.height == 0 {
        return;
    }
    let glyph = SPINNER[board.spinner_frame() % SPINNER.len()];
    let line = Line::from(vec![
        Span::styled(glyph, Style::default().fg(theme.highlight)),
        Span::styled(" Loading tickets\u{2026}", Style::default().fg(theme.text)),
    ]);
    let row = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
}

/// Full-screen failure: summary as the title, error detail as the body
pub fn render_failure(frame: &mut Frame, failure: &Failure, theme: &Theme, area: Rect) {
    let bg = theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.red).bg(bg))
        .title(Span::styled(
            format!(" {} ", failure.summary),
            Style::default().fg(theme.red).add_modifier(Modifier::BOLD),
        ))
        .padding(Padding::uniform(1))
        .style(Style::default().bg(bg));
    let lines = vec![
        Line::from(Span::styled(
            failure.detail.clone(),
            Style::default().fg(theme.text_bright),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press any key to quit",
            Style::default().fg(theme.dim),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
