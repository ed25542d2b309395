use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};
use rusqlite::Connection;
use std::time::Duration;

use crate::config::AppConfig;
use crate::engine::{analytics, reminders};
use crate::models::gamification::BADGES;
use crate::models::{Difficulty, Habit};
use crate::session::{NewHabit, Session, ToggleOutcome};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{coach, habits, header, heatmap, level, notifications, statusbar, streak};
use crate::utils::format::weekday_name;

const TICK_RATE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    AddHabit,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub session: Session,
    pub today: NaiveDate,
    pub selected: usize,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_difficulty: Difficulty,
    pub input_error: Option<String>,
    pub show_notifications: bool,
    /// One-shot feedback shown in the status bar until the next key press.
    pub message: Option<String>,
    /// Minute of the last reminder scan.
    last_scan: Option<NaiveDateTime>,
}

impl App {
    pub fn new(config: AppConfig, session: Session, today: NaiveDate) -> Self {
        App {
            view: View::Dashboard,
            config,
            session,
            today,
            selected: 0,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_difficulty: Difficulty::default(),
            input_error: None,
            show_notifications: false,
            message: None,
            last_scan: None,
        }
    }

    /// Habits shown on the dashboard, in stored order.
    pub fn visible(&self) -> Vec<&Habit> {
        if self.config.display.show_archived {
            self.session.habits.iter().collect()
        } else {
            self.session.active_habits()
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.visible().get(self.selected).map(|h| h.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn persist(&mut self, conn: &Connection) {
        if let Err(e) = self.session.save(conn) {
            log::error!("saving session failed: {:#}", e);
            self.message = Some(format!("✗ Save failed: {}", e));
        }
    }

    pub fn tick(&mut self, conn: &Connection) {
        self.tick_at(conn, Local::now().naive_local());
    }

    /// Rolls the date over at midnight and scans reminders once per minute.
    /// The scan starts from freshly loaded state so edits made by other
    /// kaizen processes since the last scan are picked up, not overwritten.
    pub fn tick_at(&mut self, conn: &Connection, now: NaiveDateTime) {
        if now.date() != self.today {
            self.today = now.date();
            self.session.refresh_streaks(self.today);
        }

        if !self.config.reminders.enabled {
            return;
        }
        let minute = reminders::truncate_to_minute(now);
        if self.last_scan == Some(minute) {
            return;
        }
        self.last_scan = Some(minute);

        let email = self.session.namespace().email().to_string();
        match Session::remind(conn, &email, now, self.config.profile.seed_examples) {
            Ok((session, fired)) => {
                self.session = session;
                self.clamp_selection();
                if fired > 0 {
                    if let Some(n) = self.session.notifications.items.first() {
                        self.message = Some(format!("⏰ {}", n.title));
                    }
                }
            }
            Err(e) => {
                log::error!("reminder scan failed: {:#}", e);
                self.message = Some(format!("✗ Reminder scan failed: {}", e));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.message = None;
        match self.input_mode {
            InputMode::AddHabit => self.handle_add_input(key, conn),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key, conn),
                View::Stats => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q')) {
                        self.view = View::Dashboard;
                    }
                }
                View::Help => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                        self.view = View::Dashboard;
                    }
                }
            },
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        if self.show_notifications {
            self.handle_inbox_key(key, conn);
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.view = View::Help,
            KeyCode::Char('s') => self.view = View::Stats,
            KeyCode::Char('n') => self.show_notifications = true,
            KeyCode::Char('a') => {
                self.input_mode = InputMode::AddHabit;
                self.input_buffer.clear();
                self.input_difficulty = Difficulty::default();
                self.input_error = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(conn),
            KeyCode::Char('A') => self.archive_selected(conn),
            KeyCode::Char('K') => self.move_selected(conn, false),
            KeyCode::Char('J') => self.move_selected(conn, true),
            _ => {}
        }
    }

    fn handle_inbox_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Char('r') => {
                self.session.notifications.mark_all_as_read();
                self.persist(conn);
            }
            KeyCode::Char('c') => {
                self.session.notifications.clear_all();
                self.persist(conn);
            }
            _ => self.show_notifications = false,
        }
    }

    fn handle_add_input(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Tab => {
                let all = Difficulty::all();
                let pos = all.iter().position(|d| *d == self.input_difficulty).unwrap_or(0);
                self.input_difficulty = all[(pos + 1) % all.len()];
            }
            KeyCode::Enter => {
                let new = NewHabit {
                    title: self.input_buffer.trim().to_string(),
                    category: "General".to_string(),
                    difficulty: self.input_difficulty,
                    ..Default::default()
                };
                match self.session.add_habit(new) {
                    Ok(h) => {
                        self.message = Some(format!("✓ Added {}", h.label()));
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.input_error = None;
                        self.selected = self.visible().len().saturating_sub(1);
                        self.persist(conn);
                    }
                    Err(e) => self.input_error = Some(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn toggle_selected(&mut self, conn: &Connection) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.session.toggle_habit(&id, self.today, self.today) {
            Ok(outcome) => {
                self.message = Some(toggle_message(&outcome));
                self.persist(conn);
            }
            Err(e) => self.message = Some(format!("✗ {}", e)),
        }
    }

    fn archive_selected(&mut self, conn: &Connection) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let archived = self.session.habit(&id).is_some_and(|h| h.archived);
        if let Err(e) = self.session.set_archived(&id, !archived) {
            self.message = Some(format!("✗ {}", e));
            return;
        }
        self.message = Some(if archived { "Restored".into() } else { "Archived".into() });
        self.clamp_selection();
        self.persist(conn);
    }

    /// Swaps the selected habit with its visible neighbour.
    fn move_selected(&mut self, conn: &Connection, down: bool) {
        let visible: Vec<String> = self.visible().iter().map(|h| h.id.clone()).collect();
        let target = if down {
            self.selected + 1
        } else {
            match self.selected.checked_sub(1) {
                Some(t) => t,
                None => return,
            }
        };
        let (Some(id), Some(neighbour)) = (visible.get(self.selected), visible.get(target)) else {
            return;
        };
        let Some(to) = self.session.habits.iter().position(|h| &h.id == neighbour) else {
            return;
        };
        if let Err(e) = self.session.move_habit(id, to + 1) {
            self.message = Some(format!("✗ {}", e));
            return;
        }
        self.selected = target;
        self.persist(conn);
    }

    // ─── Drawing ─────────────────────────────────────────────────────────────

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::AddHabit {
            self.draw_add_input(frame);
        }
        if self.show_notifications {
            notifications::render(frame, popup(frame.area(), 60, 70), &self.session.notifications);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let progress = self.session.level_progress();
        header::render(
            frame,
            outer[0],
            &self.config.profile.name,
            self.today,
            progress.level,
            self.session.notifications.unread_count(),
        );
        statusbar::render(frame, outer[2], self.message.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer[1]);

        let visible = self.visible();
        habits::render(frame, columns[0], &visible, self.today, self.selected);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Length(5), Constraint::Min(4)])
            .split(columns[1]);

        let active = self.session.active_habits();
        let overview = analytics::overview(&active, self.today);
        let week = analytics::trend(&active, self.today, self.config.display.week_days as u64);
        let advice = self.session.coach(self.today, Local::now().hour());

        level::render(frame, right[0], &progress, &self.session.gamification.badges);
        streak::render(frame, right[1], &overview, &week);
        coach::render(frame, right[2], &advice);
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(11),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let active = self.session.active_habits();
        heatmap::render(frame, chunks[1], &analytics::heatmap(&active, self.today));

        let o = analytics::overview(&active, self.today);
        let progress = self.session.level_progress();
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("  {:<20}", label), theme::dim()),
                Span::styled(value, theme::bold()),
            ])
        };

        let mut lines = vec![
            Line::from(""),
            row("Level", format!("{} ({} XP)", progress.level, progress.xp)),
            row("Active habits", o.active_habits.to_string()),
            row("Longest streak", format!("{} days", o.longest_streak)),
            row("Average streak", format!("{:.1} days", o.average_streak)),
            row("Best ever streak", format!("{} days", o.best_ever_streak)),
            row("Completion (30d)", format!("{}%", o.completion_rate_30d)),
            row("Best habit", o.best_habit.clone().unwrap_or_else(|| "—".into())),
            row(
                "Best day",
                o.best_weekday.map(weekday_name).unwrap_or("—").to_string(),
            ),
            Line::from(""),
            Line::from(Span::styled("  Badges", theme::accent())),
        ];
        for b in BADGES {
            let unlocked = self.session.gamification.has_badge(b.id);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {} ", if unlocked { b.icon } else { "🔒" }),
                    theme::dim(),
                ),
                Span::styled(
                    format!("{:<18}", b.title),
                    if unlocked { theme::green() } else { theme::dim() },
                ),
                Span::styled(b.description, theme::dim()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), chunks[2]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = popup(frame.area(), 50, 60);
        frame.render_widget(Clear, area);

        let keys = [
            ("[↵] / Space", "Toggle today's completion"),
            ("[↑ ↓] / j k", "Select habit"),
            ("[J] / [K]", "Move habit down / up"),
            ("[a]", "Add a habit"),
            ("[A]", "Archive or restore"),
            ("[n]", "Notifications"),
            ("[s]", "Stats and heatmap"),
            ("[?]", "Toggle help"),
            ("[q] / Esc", "Quit"),
        ];
        let mut text = vec![
            Line::from(Span::styled("  Keybindings", theme::accent().add_modifier(Modifier::BOLD))),
            Line::from(""),
        ];
        text.extend(keys.iter().map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!("  {:<14}", k), theme::accent()),
                Span::styled(*v, theme::dim()),
            ])
        }));

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn draw_add_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 8 } else { 6 };
        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height: height.min(area.height),
        };
        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Title: ", theme::dim()),
                Span::styled(self.input_buffer.as_str(), theme::accent().add_modifier(Modifier::BOLD)),
                Span::styled("█", theme::amber()),
            ]),
            Line::from(vec![
                Span::styled("  Difficulty: ", theme::dim()),
                Span::styled(
                    format!(
                        "{} (+{} XP)",
                        self.input_difficulty.display_name(),
                        self.input_difficulty.xp_reward()
                    ),
                    theme::amber(),
                ),
            ]),
            Line::from(Span::styled(
                "  [Tab] difficulty  ·  [Enter] save  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];
        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let block = Block::default()
            .title(Span::styled(" New Habit ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.input_error.is_some() { theme::red() } else { theme::amber() })
            .style(theme::surface());
        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

fn toggle_message(outcome: &ToggleOutcome) -> String {
    let Some(award) = &outcome.award else {
        return "○ Unmarked for today".to_string();
    };
    let mut msg = format!("✓ +{} XP  ·  {} day streak", award.amount, outcome.streak);
    if let Some(level) = award.level_up {
        msg.push_str(&format!("  ·  ★ Level {}", level));
    }
    let badges = award.unlocked.iter().chain(outcome.badges.iter());
    for b in badges {
        msg.push_str(&format!("  ·  {} {}", b.icon, b.title));
    }
    msg
}

/// Centered rectangle taking the given percentages of `area`.
fn popup(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let width = area.width * width_pct / 100;
    let height = area.height * height_pct / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Runs the dashboard until the user quits.
pub fn run(conn: Connection, config: AppConfig, email: String) -> Result<()> {
    let today = Local::now().date_naive();
    let session = Session::load(&conn, &email, today, config.profile.seed_examples)?;
    let mut app = App::new(config, session, today);
    // Pin freshly seeded samples so per-minute reloads see the same ids.
    app.persist(&conn);
    app.tick(&conn);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app, &conn);
    ratatui::restore();

    app.persist(&conn);
    result
}

fn event_loop(terminal: &mut DefaultTerminal, app: &mut App, conn: &Connection) -> Result<()> {
    let events = EventHandler::new(TICK_RATE);
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, conn);
                if app.should_quit {
                    return Ok(());
                }
            }
            Event::Resize => {}
            Event::Tick => app.tick(conn),
        }
    }
}
