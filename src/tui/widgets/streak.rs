use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{Overview, WeeklyGrid};
use crate::tui::theme;
use crate::utils::format::percent_bar;

/// Streak headline plus one dot per day of the trailing week.
pub fn render(frame: &mut Frame, area: Rect, overview: &Overview, week: &WeeklyGrid) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let ratio = (overview.longest_streak as f64 / 30.0).min(1.0);
    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(percent_bar(ratio * 100.0, 12), theme::green()),
        Span::styled(
            format!("  {} days", overview.longest_streak),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut dots = vec![Span::styled("  ", theme::dim())];
    for day in &week.days {
        let (dot, style) = match day.percent() {
            100 => ("●", theme::green().add_modifier(Modifier::BOLD)),
            50..=99 => ("●", theme::amber()),
            1..=49 => ("◑", theme::amber()),
            _ => ("○", theme::dim()),
        };
        dots.push(Span::styled(dot, style));
        dots.push(Span::styled(" ", theme::dim()));
    }

    let meta_line = Line::from(Span::styled(
        format!(
            "  Best: {}  ·  Perfect days: {}/{}  ·  30d: {}%",
            overview.best_ever_streak,
            week.perfect_days(),
            week.days.len(),
            overview.completion_rate_30d
        ),
        theme::dim(),
    ));

    let paragraph = Paragraph::new(vec![streak_line, Line::from(dots), meta_line]).block(block);
    frame.render_widget(paragraph, area);
}
