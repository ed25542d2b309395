use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::engine::coach::{Advice, Tone};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, advice: &Advice) {
    let tone_style = match advice.tone() {
        Tone::Motivation => theme::green(),
        Tone::Correction => theme::amber(),
        Tone::Insight => theme::accent(),
    };

    let block = Block::default()
        .title(Span::styled(" Coach ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let text = vec![
        Line::from(Span::styled(
            advice.tone().as_str(),
            tone_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(advice.message(), theme::bold())),
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
