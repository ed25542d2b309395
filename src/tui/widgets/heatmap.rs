use chrono::Datelike;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::HeatmapCell;
use crate::tui::theme;

const ROW_LABELS: [&str; 7] = ["Sun ", "    ", "Tue ", "    ", "Thu ", "    ", "Sat "];

/// Week columns, Sunday-first rows. Only the most recent weeks that fit are drawn.
pub fn render(frame: &mut Frame, area: Rect, cells: &[HeatmapCell]) {
    let block = Block::default()
        .title(Span::styled(" Consistency ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let max_weeks = (area.width.saturating_sub(2 + 4) / 2) as usize;
    let lead = cells
        .first()
        .map(|c| c.date.weekday().num_days_from_sunday() as usize)
        .unwrap_or(0);
    let weeks = (lead + cells.len()).div_ceil(7);
    let skip_weeks = weeks.saturating_sub(max_weeks);

    let mut rows: Vec<Vec<Span>> = ROW_LABELS
        .iter()
        .map(|l| vec![Span::styled(*l, theme::dim())])
        .collect();
    for slot in (skip_weeks * 7)..(weeks * 7) {
        let span = match slot.checked_sub(lead).and_then(|i| cells.get(i)) {
            Some(cell) => Span::styled("■ ", theme::heat(cell.intensity)),
            None => Span::raw("  "),
        };
        rows[slot % 7].push(span);
    }

    let mut lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
    lines.push(Line::from(""));
    let mut legend = vec![Span::styled("    Less ", theme::dim())];
    for i in 0..=4u8 {
        legend.push(Span::styled("■ ", theme::heat(i)));
    }
    legend.push(Span::styled("More", theme::dim()));
    lines.push(Line::from(legend));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
