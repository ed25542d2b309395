use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

const HINTS: &[(&str, &str)] = &[
    ("[↵]", " toggle  "),
    ("[a]", " add  "),
    ("[A]", " archive  "),
    ("[J/K]", " move  "),
    ("[n]", " inbox  "),
    ("[s]", " stats  "),
    ("[?]", " help  "),
    ("[q]", " quit"),
];

/// Key hints, or a transient message after an action.
pub fn render(frame: &mut Frame, area: Rect, message: Option<&str>) {
    let line = match message {
        Some(msg) => Line::from(Span::styled(msg, theme::amber())),
        None => Line::from(
            HINTS
                .iter()
                .flat_map(|(key, label)| {
                    [Span::styled(*key, theme::accent()), Span::styled(*label, theme::dim())]
                })
                .collect::<Vec<_>>(),
        ),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
