use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, name: &str, today: NaiveDate, level: u32, unread: usize) {
    let title_line = Line::from(vec![
        Span::styled("改善 ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled("kaizen", theme::accent()),
    ]);

    let mut info = vec![
        Span::styled(format!("Hi, {}", name), theme::bold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(today.format("%A, %b %d, %Y").to_string(), theme::dim()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(format!("Lv {}", level), theme::amber()),
    ];
    if unread > 0 {
        info.push(Span::styled("  ·  ", theme::dim()));
        info.push(Span::styled(format!("🔔 {}", unread), theme::amber().add_modifier(Modifier::BOLD)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, Line::from(info)])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
