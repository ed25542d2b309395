use chrono::Local;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::models::{NotificationKind, NotificationLog};
use crate::tui::theme;

/// Inbox overlay; newest first.
pub fn render(frame: &mut Frame, area: Rect, log: &NotificationLog) {
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    if log.items.is_empty() {
        lines.push(Line::from(Span::styled("  Nothing here yet", theme::dim())));
    }
    for n in &log.items {
        let style = match n.kind {
            NotificationKind::Info => theme::accent(),
            NotificationKind::Success => theme::green(),
            NotificationKind::Warning => theme::amber(),
            NotificationKind::Error => theme::red(),
        };
        let title_style = if n.is_read { style } else { style.add_modifier(Modifier::BOLD) };
        lines.push(Line::from(vec![
            Span::styled(if n.is_read { "   " } else { " • " }, theme::amber()),
            Span::styled(n.title.clone(), title_style),
            Span::styled(
                format!("  {}", n.timestamp.with_timezone(&Local).format("%b %d %H:%M")),
                theme::dim(),
            ),
        ]));
        lines.push(Line::from(Span::styled(format!("   {}", n.message), theme::dim())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [r] mark all read  ·  [c] clear  ·  [Esc] close",
        theme::dim(),
    )));

    let block = Block::default()
        .title(Span::styled(
            format!(" Notifications ({} unread) ", log.unread_count()),
            theme::accent(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::amber())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
