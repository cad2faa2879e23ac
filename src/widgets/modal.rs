//! Centered blocking error dialog.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::config::Theme;
use crate::notify::ErrorModal;

pub fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Render the blocking error dialog over whatever is beneath it.
pub fn render_error_modal(area: Rect, buf: &mut Buffer, modal: &ErrorModal, theme: &Theme) {
    if !modal.active {
        return;
    }

    let popup_area = centered_rect(area, 70, 40);
    Clear.render(popup_area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", modal.title))
        .border_style(Style::default().fg(theme.get("modal_border_error")));
    let inner_area = block.inner(popup_area);
    block.render(popup_area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Message (takes available space)
            Constraint::Length(3), // OK button
        ])
        .split(inner_area);

    Paragraph::new(modal.content.as_str())
        .style(Style::default().fg(theme.get("error")))
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);

    let ok_style = Style::default().fg(theme.get("modal_border"));
    Paragraph::new(format!("[ {} (Enter) ]  [ Close (Esc) ]", modal.ok_label))
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ok_style),
        )
        .render(chunks[1], buf);
}
