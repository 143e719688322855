use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph};

use crate::tui::confirm::{CONFIRM_SUFFIX, ConfirmDialog};
use crate::tui::editor::{EditorField, TicketEditor};
use crate::tui::overlay::{OverlayFrame, OverlayStack};
use crate::tui::text_field::TextField;
use crate::tui::theme::Theme;

use super::helpers::{centered_rect_fixed, truncate_to_width};

const EDITOR_HINT: &str = "ctrl+s save \u{00b7} esc close \u{00b7} tab switch field";

/// Render every frame bottom to top, dimming what lies beneath each one
pub fn render_overlays(frame: &mut Frame, overlay: &OverlayStack, theme: &Theme, area: Rect) {
    let count = overlay.len();
    for (i, overlay_frame) in overlay.frames().iter().enumerate() {
        frame.buffer_mut().set_style(
            area,
            Style::default().fg(theme.dim).add_modifier(Modifier::DIM),
        );
        let (w, h) = overlay_frame.required_size((area.width, area.height));
        let rect = centered_rect_fixed(w, h, area);
        frame.render_widget(Clear, rect);
        let top = i + 1 == count;
        match overlay_frame {
            OverlayFrame::Editor(editor) => render_editor(frame, editor, theme, rect, top),
            OverlayFrame::Confirm(dialog) => render_confirm(frame, dialog, theme, rect),
        }
    }
}

fn render_editor(frame: &mut Frame, editor: &TicketEditor, theme: &Theme, rect: Rect, top: bool) {
    let bg = theme.background;
    let title = match editor.ticket() {
        Some(ticket) => format!(" Edit {} ", ticket.id),
        None => " New ticket ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_bright)
                .add_modifier(Modifier::BOLD),
        ))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(bg));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    // label, title, gap, label, at least one description row, hint
    if inner.height < 6 || inner.width < 2 {
        return;
    }

    let label = |text: &'static str, focused: bool| {
        let color = if focused { theme.highlight } else { theme.dim };
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    };
    let row = |offset: u16, height: u16| Rect::new(inner.x, inner.y + offset, inner.width, height);

    let title_focused = editor.focus() == EditorField::Title;
    frame.render_widget(label("Title", title_focused), row(0, 1));
    render_field(frame, editor.title(), theme, row(1, 1), top);
    frame.render_widget(label("Description", !title_focused), row(3, 1));
    render_field(frame, editor.description(), theme, row(4, inner.height - 5), top);
    frame.render_widget(
        Paragraph::new(Span::styled(
            truncate_to_width(EDITOR_HINT, inner.width as usize),
            Style::default().fg(theme.dim),
        )),
        row(inner.height - 1, 1),
    );
}

/// Draw a text field, scrolled vertically so the cursor line is visible
fn render_field(frame: &mut Frame, field: &TextField, theme: &Theme, area: Rect, top: bool) {
    let width = area.width as usize;
    if field.value().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                field.placeholder(),
                Style::default().fg(theme.dim).add_modifier(Modifier::ITALIC),
            )),
            area,
        );
    } else {
        let (cursor_line, _) = field.cursor_position();
        let scroll = if field.is_focused() {
            cursor_line.saturating_sub(area.height.saturating_sub(1) as usize)
        } else {
            0
        };
        let lines: Vec<Line> = field
            .value()
            .split('\n')
            .skip(scroll)
            .take(area.height as usize)
            .map(|line| {
                Line::from(Span::styled(
                    truncate_to_width(line, width),
                    Style::default().fg(theme.text_bright),
                ))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    if top && field.is_focused() {
        let (line, col) = field.cursor_position();
        let visible_line = line.min(area.height.saturating_sub(1) as usize) as u16;
        let x = area.x + (col as u16).min(area.width.saturating_sub(1));
        frame.set_cursor_position((x, area.y + visible_line));
    }
}

fn render_confirm(frame: &mut Frame, dialog: &ConfirmDialog, theme: &Theme, rect: Rect) {
    let bg = theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .padding(Padding::new(2, 2, 1, 1))
        .style(Style::default().bg(bg));
    let line = Line::from(vec![
        Span::styled(
            dialog.question().to_string(),
            Style::default().fg(theme.text_bright).bg(bg),
        ),
        Span::styled(CONFIRM_SUFFIX, Style::default().fg(theme.dim).bg(bg)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), rect);
}
