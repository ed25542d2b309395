use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::engine::LevelProgress;
use crate::models::gamification::BADGES;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, progress: &LevelProgress, badges: &[String]) {
    let block = Block::default()
        .title(Span::styled(format!(" Level {} ", progress.level), theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(theme::amber().bg(theme::SURFACE))
        .ratio((progress.percent / 100.0).clamp(0.0, 1.0))
        .label(Span::styled(
            format!("{} / {} XP", progress.xp, progress.next_floor),
            theme::bold(),
        ));
    frame.render_widget(gauge, rows[0]);

    let icons: String = BADGES
        .iter()
        .map(|b| if badges.iter().any(|id| id == b.id) { b.icon } else { "·" })
        .collect::<Vec<_>>()
        .join(" ");
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} XP to Level {}", progress.xp_to_next, progress.level + 1),
            theme::dim(),
        )),
        Line::from(vec![
            Span::styled(" ", theme::dim()),
            Span::styled(icons, theme::bold().add_modifier(Modifier::DIM)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), rows[1].union(rows[2]));
}
