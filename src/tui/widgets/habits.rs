use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::models::{Habit, HabitStatus};
use crate::tui::theme;
use crate::utils::format::{pad_display, truncate_display};

pub fn render(frame: &mut Frame, area: Rect, habits: &[&Habit], today: NaiveDate, selected: usize) {
    let done = habits.iter().filter(|h| h.is_completed_on(today)).count();
    let block = Block::default()
        .title(Span::styled(format!(" Today {}/{} ", done, habits.len()), theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(true))
        .style(theme::surface());

    if habits.is_empty() {
        let empty = List::new([ListItem::new(Line::from(Span::styled(
            "  No habits yet. Press [a] to add one.",
            theme::dim(),
        )))])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let title_width = (area.width as usize).saturating_sub(28).clamp(8, 32);
    let items: Vec<ListItem> = habits
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let (icon, icon_style) = match h.status_on(today) {
                HabitStatus::Completed => ("●", theme::green()),
                HabitStatus::NotStarted => ("○", theme::dim()),
            };
            let name_style = if i == selected {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let streak_style = if h.streak > 0 { theme::amber() } else { theme::dim() };

            ListItem::new(Line::from(vec![
                Span::styled("  ", theme::dim()),
                Span::styled(icon, icon_style),
                Span::styled(" ", theme::dim()),
                Span::styled(
                    pad_display(&truncate_display(&h.label(), title_width), title_width),
                    name_style,
                ),
                Span::styled(format!("  {:<6}", h.difficulty.as_str()), theme::dim()),
                Span::styled(format!(" 🔥{:>3}", h.streak), streak_style),
            ]))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(selected));
    let list = List::new(items)
        .block(block)
        .highlight_symbol("›")
        .highlight_style(theme::accent());
    frame.render_stateful_widget(list, area, &mut state);
}
