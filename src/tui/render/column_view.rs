use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::column::{Column, HEADER_HEIGHT};
use crate::tui::list::FilterState;
use crate::tui::theme::Theme;

use super::helpers::{push_highlighted_spans, truncate_to_width};

/// Render one status column into its own area
pub fn render_column(frame: &mut Frame, column: &Column, theme: &Theme) {
    let area = column.area();
    if area.width < 4 || area.height < 4 {
        return;
    }
    let bg = theme.background;
    let border_color = if column.is_focused() {
        theme.highlight
    } else {
        theme.dim
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    render_header(frame, column, theme, inner);
    if inner.height > 1 {
        render_filter_line(frame, column, theme, Rect::new(inner.x, inner.y + 1, inner.width, 1));
    }
    render_items(frame, column, theme, inner);
}

fn render_header(frame: &mut Frame, column: &Column, theme: &Theme, inner: Rect) {
    let status = column.status();
    let title_style = Style::default()
        .fg(theme.text_bright)
        .bg(theme.status_color(status))
        .add_modifier(Modifier::BOLD);
    let list = column.list();
    let count = if list.filter_state() == FilterState::Unfiltered {
        format!(" {}", list.items().len())
    } else {
        format!(" {}/{}", list.visible_len(), list.items().len())
    };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", status.column_title()), title_style),
        Span::styled(count, Style::default().fg(theme.dim).bg(theme.background)),
    ]);
    frame.render_widget(Paragraph::new(line), Rect::new(inner.x, inner.y, inner.width, 1));
}

fn render_filter_line(frame: &mut Frame, column: &Column, theme: &Theme, row: Rect) {
    let list = column.list();
    let bg = theme.background;
    let width = row.width as usize;
    let line = match list.filter_state() {
        FilterState::Unfiltered => return,
        FilterState::Filtering => {
            let text = truncate_to_width(list.filter_text(), width.saturating_sub(2));
            if column.is_focused() {
                let x = row.x + 1 + text.width() as u16;
                frame.set_cursor_position((x.min(row.right().saturating_sub(1)), row.y));
            }
            Line::from(vec![
                Span::styled("/", Style::default().fg(theme.highlight).bg(bg)),
                Span::styled(text, Style::default().fg(theme.text_bright).bg(bg)),
            ])
        }
        FilterState::Applied => Line::from(Span::styled(
            truncate_to_width(&format!("filter: {}", list.filter_text()), width),
            Style::default().fg(theme.dim).bg(bg),
        )),
    };
    frame.render_widget(Paragraph::new(line), row);
}

fn render_items(frame: &mut Frame, column: &Column, theme: &Theme, inner: Rect) {
    let list = column.list();
    let bg = theme.background;
    let width = inner.width as usize;

    if list.visible_len() == 0 {
        let text = if list.items().is_empty() {
            "No tickets"
        } else {
            "No matches"
        };
        let y = inner.y + HEADER_HEIGHT;
        if y < inner.bottom() {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(theme.dim).bg(bg))),
                Rect::new(inner.x + 2, y, inner.width.saturating_sub(2), 1),
            );
        }
        return;
    }

    let filter_re = list.filter_regex();
    let text_style = Style::default().fg(theme.text).bg(bg);
    let match_style = Style::default()
        .fg(theme.filter_match_fg)
        .bg(theme.filter_match_bg);

    for index in list.offset()..list.visible_len() {
        let Some(row) = column.item_row(index) else {
            break;
        };
        let Some(ticket) = list.visible_item(index) else {
            break;
        };
        if row + 1 >= inner.bottom() {
            break;
        }
        let selected = index == list.index();
        let marker_color = if column.is_focused() {
            theme.highlight
        } else {
            theme.dim
        };
        let marker = if selected {
            Span::styled("\u{2502} ", Style::default().fg(marker_color).bg(bg))
        } else {
            Span::styled("  ", Style::default().bg(bg))
        };

        let id = ticket.id.to_string();
        let title_budget = width.saturating_sub(2 + id.width() + 1);
        let title = truncate_to_width(&ticket.title, title_budget);
        let title_style = if selected {
            text_style.fg(theme.text_bright).add_modifier(Modifier::BOLD)
        } else {
            text_style
        };
        let mut spans = vec![marker.clone()];
        push_highlighted_spans(&mut spans, &title, title_style, match_style, filter_re.as_ref());
        spans.push(Span::styled(" ", text_style));
        spans.push(Span::styled(id, Style::default().fg(theme.selection_id).bg(bg)));
        frame.render_widget(
            Paragraph::new(Line::from(spans)),
            Rect::new(inner.x, row, inner.width, 1),
        );

        let description = ticket.description.lines().next().unwrap_or("");
        let description = truncate_to_width(description, width.saturating_sub(2));
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                marker,
                Span::styled(description, Style::default().fg(theme.dim).bg(bg)),
            ])),
            Rect::new(inner.x, row + 1, inner.width, 1),
        );
    }
}
