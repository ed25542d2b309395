use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate, Timelike};
use rusqlite::Connection;
use serde_json::Value;

use crate::cli::args::NotificationCommands;
use crate::config::AppConfig;
use crate::db::repository::{SnapshotRepo, MetaRepo};
use crate::engine::{analytics, coach::Tone, reminders, streak};
use crate::models::gamification::BADGES;
use crate::models::habit::{format_date, parse_date};
use crate::models::{Difficulty, Habit, HabitStatus, NotificationKind};
use crate::session::{HabitUpdate, NewHabit, Session, ToggleOutcome};
use crate::utils::format::{
    heat_glyph, pad_display, percent_bar, plural, progress_bar, truncate_display, weekday_name,
};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const ACCENT: &str = "\x1b[38;2;120;170;210m";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => Ok(parse_date(s)?),
        None => Ok(today()),
    }
}

fn kind_color(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => ACCENT,
        NotificationKind::Success => GREEN,
        NotificationKind::Warning => AMBER,
        NotificationKind::Error => RED,
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_add(
    conn: &Connection,
    session: &mut Session,
    title: &str,
    category: &str,
    difficulty: &str,
    reminders: &[String],
    emoji: Option<String>,
) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse()?;
    let habit = session.add_habit(NewHabit {
        title: title.to_string(),
        category: category.to_string(),
        difficulty,
        reminders: reminders.to_vec(),
        emoji,
    })?;
    println_colored!(
        GREEN,
        "  ✓ Added {} ({}, {} XP per day)",
        habit.label(),
        habit.difficulty,
        habit.difficulty.xp_reward()
    );
    if !habit.reminders.is_empty() {
        println_colored!(DIM, "    Reminders: {}", habit.reminders.join(", "));
    }
    session.save(conn)
}

pub fn handle_list(session: &Session, config: &AppConfig, all: bool) -> Result<()> {
    let today = today();
    let show_archived = all || config.display.show_archived;

    println!();
    println_colored!(ACCENT, "  Habits — {}", format_date(today));
    println!();

    let mut shown = 0;
    for (i, h) in session.habits.iter().enumerate() {
        if h.archived && !show_archived {
            continue;
        }
        shown += 1;
        let (icon, color) = match session.habit_status(&h.id, today) {
            HabitStatus::Completed => ("●", GREEN),
            HabitStatus::NotStarted => ("○", DIM),
        };
        let archived = if h.archived { "  (archived)" } else { "" };
        print!("  {:>2}. ", i + 1);
        print!("{}{}\x1b[0m  ", DIM, h.short_id());
        print!("{}{}\x1b[0m ", color, icon);
        print!("{}", pad_display(&truncate_display(&h.label(), 28), 28));
        print!("  {:<10}", truncate_display(&h.category, 10));
        print!("  {:<6}", h.difficulty.as_str());
        println_colored!(
            if h.streak > 0 { AMBER } else { DIM },
            "  {}{}",
            plural(h.streak as u64, "day"),
            archived
        );
    }

    if shown == 0 {
        println_colored!(DIM, "  No habits yet. Add one with `kaizen add \"Drink water\"`");
    }
    println!();
    Ok(())
}

pub fn handle_done(
    conn: &Connection,
    session: &mut Session,
    query: &str,
    date: Option<&str>,
) -> Result<()> {
    let date = date_or_today(date)?;
    let id = session.resolve(query)?;
    let outcome = session.toggle_habit(&id, date, today())?;
    let title = session
        .habit(&id)
        .map(Habit::label)
        .unwrap_or_default();
    print_toggle(&title, date, &outcome);
    session.save(conn)
}

fn print_toggle(title: &str, date: NaiveDate, outcome: &ToggleOutcome) {
    if !outcome.completed {
        println_colored!(DIM, "  ○ {} — unmarked for {}", title, format_date(date));
        return;
    }
    println_colored!(
        GREEN,
        "  ✓ {} — done for {}  ({} streak)",
        title,
        format_date(date),
        plural(outcome.streak as u64, "day")
    );
    if let Some(award) = &outcome.award {
        println_colored!(AMBER, "    +{} XP  (total {})", award.amount, award.total);
        if let Some(level) = award.level_up {
            println_colored!(BOLD, "    ★ Level up! You reached Level {}", level);
        }
        for b in &award.unlocked {
            println_colored!(ACCENT, "    {} Badge unlocked: {}", b.icon, b.title);
        }
    }
    for b in &outcome.badges {
        println_colored!(ACCENT, "    {} Badge unlocked: {}", b.icon, b.title);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_edit(
    conn: &Connection,
    session: &mut Session,
    query: &str,
    title: Option<String>,
    category: Option<String>,
    difficulty: Option<&str>,
    reminders: &[String],
    clear_reminders: bool,
    freezes: Option<u32>,
    goal: Option<u32>,
    emoji: Option<String>,
) -> Result<()> {
    let id = session.resolve(query)?;
    let difficulty = difficulty.map(str::parse::<Difficulty>).transpose()?;
    let reminders = if clear_reminders {
        Some(Vec::new())
    } else if reminders.is_empty() {
        None
    } else {
        Some(reminders.to_vec())
    };

    let habit = session.update_habit(
        &id,
        HabitUpdate {
            title,
            category,
            emoji,
            difficulty,
            reminders,
            streak_freeze: freezes,
            goal,
        },
    )?;
    println_colored!(GREEN, "  ✓ Updated {}", habit.label());
    println_colored!(
        DIM,
        "    {} · {} · reminders: {} · freezes: {}",
        habit.category,
        habit.difficulty,
        if habit.reminders.is_empty() {
            "none".to_string()
        } else {
            habit.reminders.join(", ")
        },
        habit.streak_freeze
    );
    session.save(conn)
}

pub fn handle_note(
    conn: &Connection,
    session: &mut Session,
    query: &str,
    text: &str,
    date: Option<&str>,
) -> Result<()> {
    let date = date_or_today(date)?;
    let id = session.resolve(query)?;
    session.add_note(&id, date, text)?;
    if text.trim().is_empty() {
        println_colored!(DIM, "  Note for {} removed", format_date(date));
    } else {
        println_colored!(GREEN, "  ✓ Note saved for {}", format_date(date));
    }
    session.save(conn)
}

pub fn handle_archive(conn: &Connection, session: &mut Session, query: &str, undo: bool) -> Result<()> {
    let id = session.resolve(query)?;
    session.set_archived(&id, !undo)?;
    let title = session.habit(&id).map(Habit::label).unwrap_or_default();
    if undo {
        println_colored!(GREEN, "  ✓ {} restored", title);
    } else {
        println_colored!(DIM, "  {} archived", title);
    }
    session.save(conn)
}

pub fn handle_delete(conn: &Connection, session: &mut Session, query: &str) -> Result<()> {
    let id = session.resolve(query)?;
    let removed = session.delete_habit(&id)?;
    println_colored!(
        RED,
        "  ✗ Deleted {} ({} completions)",
        removed.label(),
        removed.completed_dates.len()
    );
    session.save(conn)
}

pub fn handle_move(conn: &Connection, session: &mut Session, query: &str, position: usize) -> Result<()> {
    let id = session.resolve(query)?;
    session.move_habit(&id, position)?;
    let pos = session
        .habits
        .iter()
        .position(|h| h.id == id)
        .map(|p| p + 1)
        .unwrap_or(position);
    println_colored!(GREEN, "  ✓ Moved to position {}", pos);
    session.save(conn)
}

pub fn handle_reorder(conn: &Connection, session: &mut Session, queries: &[String]) -> Result<()> {
    let ids = queries
        .iter()
        .map(|q| session.resolve(q))
        .collect::<Result<Vec<_>, _>>()?;
    session.reorder(&ids)?;
    for (i, h) in session.habits.iter().enumerate() {
        println_colored!(DIM, "  {:>2}. {}", i + 1, h.label());
    }
    println_colored!(GREEN, "  ✓ Order saved");
    session.save(conn)
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(session: &Session, config: &AppConfig, week: bool) -> Result<()> {
    let today = today();
    let active = session.active_habits();
    let overview = analytics::overview(&active, today);
    let level = session.level_progress();

    println!();
    println_colored!(ACCENT, "  Statistics");
    println!();
    println_colored!(
        BOLD,
        "  Level {}      {} XP  ({} to next)",
        level.level,
        level.xp,
        level.xp_to_next
    );
    println!("  Active habits:       {}", overview.active_habits);
    println!(
        "  Longest streak:      {}",
        plural(overview.longest_streak as u64, "day")
    );
    println!("  Average streak:      {:.1} days", overview.average_streak);
    println!(
        "  Best ever streak:    {}",
        plural(overview.best_ever_streak as u64, "day")
    );
    println!("  Completion (30d):    {}%", overview.completion_rate_30d);
    if let Some(best) = &overview.best_habit {
        println!("  Best habit:          {}", best);
    }
    if let Some(day) = overview.best_weekday {
        println!("  Best day:            {}", weekday_name(day));
    }

    if week {
        println!();
        let grid = analytics::trend(&active, today, config.display.week_days as u64);
        println_colored!(DIM, "  Last {} days", config.display.week_days);
        println!();
        for day in &grid.days {
            let color = match day.percent() {
                100 => GREEN,
                0 => DIM,
                _ => AMBER,
            };
            print!("  {}  ", day.date.format("%a %d"));
            println_colored!(
                color,
                "{}  {:>3}%  {}/{}",
                progress_bar(day.habits_done, day.habits_total, 12),
                day.percent(),
                day.habits_done,
                day.habits_total
            );
        }
        println!();
        println_colored!(
            DIM,
            "  {} completions · {} perfect days",
            grid.total_done(),
            grid.perfect_days()
        );
    }

    println!();
    Ok(())
}

pub fn handle_heatmap(session: &Session) -> Result<()> {
    let today = today();
    let active = session.active_habits();
    let cells = analytics::heatmap(&active, today);

    println!();
    println_colored!(ACCENT, "  Consistency — last {} days", cells.len());
    println!();

    // Columns are weeks, rows are weekdays starting on Sunday.
    let lead = cells
        .first()
        .map(|c| c.date.weekday().num_days_from_sunday() as usize)
        .unwrap_or(0);
    let mut rows: Vec<String> = vec![String::from("  "); 7];
    for row in rows.iter_mut().take(lead) {
        row.push(' ');
    }
    for (i, cell) in cells.iter().enumerate() {
        let row = (lead + i) % 7;
        rows[row].push_str(heat_glyph(cell.intensity));
    }
    for row in rows {
        println_colored!(GREEN, "{}", row);
    }

    println!();
    let total: u32 = cells.iter().map(|c| c.count).sum();
    let active_days = cells.iter().filter(|c| c.count > 0).count();
    println_colored!(
        DIM,
        "  Less · ░ ▒ ▓ █ More    {} completions on {} days",
        total,
        active_days
    );
    println!();
    Ok(())
}

// ─── Gamification ────────────────────────────────────────────────────────────

pub fn handle_level(session: &Session) -> Result<()> {
    let p = session.level_progress();
    println!();
    println_colored!(BOLD, "  Level {}", p.level);
    println_colored!(
        AMBER,
        "  {}  {:.0}%",
        percent_bar(p.percent, 24),
        p.percent.round()
    );
    println_colored!(
        DIM,
        "  {} XP total · {} XP to Level {}",
        p.xp,
        p.xp_to_next,
        p.level + 1
    );
    println!();
    Ok(())
}

pub fn handle_badges(session: &Session) -> Result<()> {
    let unlocked = session.gamification.badges.len();
    println!();
    println_colored!(ACCENT, "  Achievements  ({}/{})", unlocked, BADGES.len());
    println!();
    for b in BADGES {
        if session.gamification.has_badge(b.id) {
            println_colored!(GREEN, "  {} {:<20} {}", b.icon, b.title, b.description);
        } else {
            println_colored!(DIM, "  🔒 {:<20} {}", b.title, b.description);
        }
    }
    println!();
    Ok(())
}

pub fn handle_coach(session: &Session) -> Result<()> {
    let now = Local::now();
    let advice = session.coach(now.date_naive(), now.hour());
    let color = match advice.tone() {
        Tone::Motivation => GREEN,
        Tone::Correction => AMBER,
        Tone::Insight => ACCENT,
    };
    println!();
    println_colored!(DIM, "  Coach · {}", advice.tone().as_str());
    println_colored!(color, "  \"{}\"", advice.message());
    println!();
    Ok(())
}

pub fn handle_reset_xp(conn: &Connection, session: &mut Session, yes: bool) -> Result<()> {
    if !yes {
        return Err(anyhow!("This wipes all XP and badges. Re-run with --yes to confirm."));
    }
    session.reset_gamification();
    println_colored!(AMBER, "  XP and badges reset");
    session.save(conn)
}

// ─── Notifications & reminders ───────────────────────────────────────────────

pub fn handle_notifications(
    conn: &Connection,
    session: &mut Session,
    action: Option<&NotificationCommands>,
) -> Result<()> {
    match action {
        None | Some(NotificationCommands::List) => {
            let inbox = &session.notifications;
            println!();
            println_colored!(ACCENT, "  Notifications  ({} unread)", inbox.unread_count());
            println!();
            if inbox.items.is_empty() {
                println_colored!(DIM, "  Nothing here yet");
            }
            for n in &inbox.items {
                let marker = if n.is_read { " " } else { "•" };
                let when = n.timestamp.with_timezone(&Local).format("%b %d %H:%M");
                print!("  {} {}  ", marker, n.short_id());
                println_colored!(kind_color(n.kind), "{}", n.title);
                println_colored!(DIM, "              {} · {}", n.message, when);
            }
            println!();
            return Ok(());
        }
        Some(NotificationCommands::Read { id }) => {
            if !session.notifications.mark_as_read(id) {
                return Err(anyhow!("No notification matches '{}'", id));
            }
            println_colored!(GREEN, "  ✓ Marked as read");
        }
        Some(NotificationCommands::ReadAll) => {
            session.notifications.mark_all_as_read();
            println_colored!(GREEN, "  ✓ All notifications marked as read");
        }
        Some(NotificationCommands::Clear) => {
            session.notifications.clear_all();
            println_colored!(DIM, "  Inbox cleared");
        }
    }
    session.save(conn)
}

pub fn handle_remind(
    conn: &Connection,
    session: &mut Session,
    config: &AppConfig,
    watch: bool,
) -> Result<()> {
    if !config.reminders.enabled {
        println_colored!(DIM, "  Reminders are disabled in config.toml");
        return Ok(());
    }
    let email = session.namespace().email().to_string();

    loop {
        let now = Local::now().naive_local();
        let (fresh, fired) = Session::remind(conn, &email, now, config.profile.seed_examples)?;
        *session = fresh;
        for n in session.notifications.items.iter().take(fired) {
            println_colored!(AMBER, "  ⏰ {} — {}", n.title, n.message);
        }
        if !watch {
            if fired == 0 {
                println_colored!(DIM, "  No reminders due at {}", now.format("%H:%M"));
            }
            return Ok(());
        }
        std::thread::sleep(reminders::until_next_minute(Local::now().naive_local()));
    }
}

// ─── Export & data ───────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, session: &Session, config: &AppConfig, json: bool) -> Result<()> {
    if json {
        return export_json(conn, session);
    }

    let today = today();
    let active = session.active_habits();
    let overview = analytics::overview(&active, today);
    let grid = analytics::trend(&active, today, 7);
    let level = session.level_progress();

    println!("# kaizen — Weekly Summary");
    println!("# {}", format_date(today));
    println!();
    println!("Profile: {} <{}>", config.profile.name, session.namespace().email());
    println!();
    println!("## Completion (last 7 days)");
    for day in &grid.days {
        println!(
            "  {}  {:>3}%  {}",
            format_date(day.date),
            day.percent(),
            progress_bar(day.habits_done, day.habits_total, 5)
        );
    }
    println!();
    println!("## Habits");
    for h in &active {
        let s = streak::streak_summary(&h.completed_dates, today);
        println!(
            "  {}  {:<11}  streak {}  best {}  last {}",
            pad_display(&h.label(), 24),
            h.status_on(today).as_str(),
            s.current,
            s.best,
            h.last_completed()
                .map(format_date)
                .unwrap_or_else(|| "never".to_string())
        );
    }
    println!();
    println!("## Summary");
    println!("  Level:       {} ({} XP)", level.level, level.xp);
    println!("  Badges:      {}/{}", session.gamification.badges.len(), BADGES.len());
    println!("  Completion:  {}% (30d)", overview.completion_rate_30d);
    println!("  Longest:     {}", plural(overview.longest_streak as u64, "day"));
    Ok(())
}

fn export_json(conn: &Connection, session: &Session) -> Result<()> {
    let ns = session.namespace();
    let read = |key: String| -> Result<Value> {
        Ok(match SnapshotRepo::get(conn, &key)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
            None => Value::Null,
        })
    };
    let out = serde_json::json!({
        "user": ns.email(),
        "habits": read(ns.habits_key())?,
        "gamification": read(ns.gamification_key())?,
        "notifications": read(ns.notifications_key())?,
        "reminders": read(ns.reminders_key())?,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

pub fn handle_users(conn: &Connection, current: &str) -> Result<()> {
    let keys = SnapshotRepo::keys_with_prefix(conn, "habits_")?;
    println!();
    if keys.is_empty() {
        println_colored!(DIM, "  No stored data yet");
    }
    for key in keys {
        let email = key.trim_start_matches("habits_");
        if email == current {
            println_colored!(GREEN, "  ● {}", email);
        } else {
            println!("  ○ {}", email);
        }
    }
    println!();
    Ok(())
}

pub fn handle_clear_data(conn: &Connection, session: &Session, yes: bool) -> Result<()> {
    if !yes {
        return Err(anyhow!(
            "This deletes every habit, badge and notification for {}. Re-run with --yes to confirm.",
            session.namespace().email()
        ));
    }
    let ns = session.namespace();
    for key in [
        ns.habits_key(),
        ns.gamification_key(),
        ns.notifications_key(),
        ns.reminders_key(),
    ] {
        SnapshotRepo::delete(conn, &key)?;
    }
    log::warn!("cleared all data for {}", ns.email());
    println_colored!(RED, "  ✗ All data for {} deleted", ns.email());
    Ok(())
}

pub fn handle_config(conn: &Connection, config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            println_colored!(DIM, "  Config already exists at {:?}", path);
        } else {
            config.save()?;
            println_colored!(GREEN, "  ✓ Wrote default config to {:?}", path);
        }
        return Ok(());
    }
    println!();
    println!("  Config:    {:?}", path);
    println!("  Database:  {:?}", AppConfig::db_path()?);
    println!("  Profile:   {} <{}>", config.profile.name, config.profile.email);
    if let Some(last) = MetaRepo::get(conn, "last_user")? {
        println!("  Last used: {}", last);
    }
    println!(
        "  Reminders: {}",
        if config.reminders.enabled { "on (checked every minute)" } else { "off" }
    );
    println!();
    Ok(())
}
