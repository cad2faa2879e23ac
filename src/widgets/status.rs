//! Bottom status line for non-blocking notifications.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::config::Theme;
use crate::notify::{Notification, NotifyLevel};

pub struct StatusLine<'a> {
    pub notification: Option<&'a Notification>,
    pub theme: &'a Theme,
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = self.theme.get("controls_bg");
        let line = match self.notification {
            Some(note) => {
                let color = match note.level {
                    NotifyLevel::Success => self.theme.get("success"),
                    NotifyLevel::Error => self.theme.get("error"),
                };
                let mut spans = vec![Span::styled(
                    note.message.clone(),
                    Style::default().fg(color),
                )];
                if let Some(desc) = &note.description {
                    spans.push(Span::styled(
                        format!(": {}", desc),
                        Style::default().fg(self.theme.get("text_secondary")),
                    ));
                }
                Line::from(spans)
            }
            None => Line::from(""),
        };
        Paragraph::new(line)
            .style(Style::default().bg(bg))
            .render(area, buf);
    }
}
