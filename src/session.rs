//! One user's habits, XP, badges and inbox, loaded from and saved to the
//! snapshot store. Constructed once per run and passed by reference.

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};

use crate::db::repository::{GamificationRepo, HabitRepo, Namespace, NotificationRepo, ReminderRepo};
use crate::engine::{self, ledger, streak, Advice, CoachInput, LevelProgress, ReminderState, XpAward};
use crate::error::TrackerError;
use crate::models::habit::parse_reminders;
use crate::models::{
    Badge, Difficulty, GamificationState, Habit, HabitStatus, NotificationKind, NotificationLog,
};

#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub reminders: Vec<String>,
    pub emoji: Option<String>,
}

/// Partial edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    /// An empty string clears the emoji.
    pub emoji: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub reminders: Option<Vec<String>>,
    pub streak_freeze: Option<u32>,
    pub goal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleOutcome {
    pub completed: bool,
    pub streak: u32,
    /// Only present when the toggle marked the habit complete.
    pub award: Option<XpAward>,
    /// Difficulty and streak badges earned by this completion.
    pub badges: Vec<&'static Badge>,
}

pub struct Session {
    ns: Namespace,
    pub habits: Vec<Habit>,
    pub gamification: GamificationState,
    pub notifications: NotificationLog,
    pub reminders: ReminderState,
}

impl Session {
    pub fn empty(email: &str) -> Self {
        Self {
            ns: Namespace::new(email),
            habits: Vec::new(),
            gamification: GamificationState::default(),
            notifications: NotificationLog::default(),
            reminders: ReminderState::default(),
        }
    }

    /// Loads every snapshot for `email`. A namespace that never saved habits
    /// gets the sample habits when `seed_examples` is set.
    pub fn load(conn: &Connection, email: &str, today: NaiveDate, seed_examples: bool) -> Result<Self> {
        let mut session = Self::empty(email);
        let ns = &session.ns;
        session.habits = match HabitRepo::load(conn, ns)? {
            Some(h) => h,
            None if seed_examples => {
                log::info!("seeding sample habits for {}", ns.email());
                sample_habits(today)
            }
            None => Vec::new(),
        };
        session.gamification = GamificationRepo::load(conn, &session.ns)?;
        session.notifications = NotificationRepo::load(conn, &session.ns)?;
        session.reminders = ReminderRepo::load(conn, &session.ns)?;
        session.refresh_streaks(today);
        Ok(session)
    }

    pub fn save(&self, conn: &Connection) -> Result<()> {
        HabitRepo::save(conn, &self.ns, &self.habits)?;
        GamificationRepo::save(conn, &self.ns, &self.gamification)?;
        NotificationRepo::save(conn, &self.ns, &self.notifications)?;
        ReminderRepo::save(conn, &self.ns, &self.reminders)?;
        log::debug!("saved session for {}", self.ns.email());
        Ok(())
    }

    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// Re-derives every cached streak as of `today`.
    pub fn refresh_streaks(&mut self, today: NaiveDate) {
        for h in &mut self.habits {
            h.streak = streak::current_streak(&h.completed_dates, today);
        }
    }

    pub fn active_habits(&self) -> Vec<&Habit> {
        self.habits.iter().filter(|h| !h.archived).collect()
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    fn index_of(&self, id: &str) -> Result<usize, TrackerError> {
        self.habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| TrackerError::HabitNotFound(id.to_string()))
    }

    /// Resolves user input to a habit id: full id, 1-based position, id prefix
    /// or case-insensitive title.
    pub fn resolve(&self, query: &str) -> Result<String, TrackerError> {
        let q = query.trim();
        if let Some(h) = self.habits.iter().find(|h| h.id == q) {
            return Ok(h.id.clone());
        }
        if let Ok(pos) = q.parse::<usize>() {
            if let Some(h) = pos.checked_sub(1).and_then(|i| self.habits.get(i)) {
                return Ok(h.id.clone());
            }
        }

        let lower = q.to_lowercase();
        let mut matches: Vec<&Habit> = self
            .habits
            .iter()
            .filter(|h| h.title.to_lowercase() == lower)
            .collect();
        if matches.is_empty() && q.len() >= 4 {
            matches = self.habits.iter().filter(|h| h.id.starts_with(q)).collect();
        }

        match matches.as_slice() {
            [] => Err(TrackerError::HabitNotFound(q.to_string())),
            [h] => Ok(h.id.clone()),
            many => Err(TrackerError::AmbiguousHabit {
                query: q.to_string(),
                count: many.len(),
            }),
        }
    }

    // ─── Habit CRUD ──────────────────────────────────────────────────────────

    pub fn add_habit(&mut self, new: NewHabit) -> Result<&Habit, TrackerError> {
        if new.title.trim().is_empty() {
            return Err(TrackerError::EmptyTitle);
        }
        let category = if new.category.trim().is_empty() {
            "General"
        } else {
            new.category.as_str()
        };
        let mut habit = Habit::new(&new.title, category, new.difficulty);
        habit.reminders = parse_reminders(&new.reminders)?;
        habit.emoji = new.emoji.filter(|e| !e.trim().is_empty());

        log::info!("added habit '{}' ({})", habit.title, habit.id);
        self.habits.push(habit);
        Ok(&self.habits[self.habits.len() - 1])
    }

    pub fn update_habit(&mut self, id: &str, update: HabitUpdate) -> Result<&Habit, TrackerError> {
        let idx = self.index_of(id)?;
        let reminders = update
            .reminders
            .as_deref()
            .map(parse_reminders)
            .transpose()?;
        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TrackerError::EmptyTitle);
        }

        let h = &mut self.habits[idx];
        if let Some(title) = update.title {
            h.title = title.trim().to_string();
        }
        if let Some(category) = update.category {
            h.category = category.trim().to_string();
        }
        if let Some(emoji) = update.emoji {
            h.emoji = (!emoji.trim().is_empty()).then_some(emoji);
        }
        if let Some(difficulty) = update.difficulty {
            h.difficulty = difficulty;
        }
        if let Some(reminders) = reminders {
            h.reminders = reminders;
        }
        if let Some(freezes) = update.streak_freeze {
            h.streak_freeze = freezes;
        }
        if let Some(goal) = update.goal {
            h.goal = goal.max(1);
        }
        Ok(&self.habits[idx])
    }

    /// Replaces the order with `ids`, which must name every habit exactly once.
    pub fn reorder(&mut self, ids: &[String]) -> Result<(), TrackerError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let complete = ids.len() == self.habits.len()
            && wanted.len() == ids.len()
            && self.habits.iter().all(|h| wanted.contains(h.id.as_str()));
        if !complete {
            return Err(TrackerError::InvalidOrder {
                expected: self.habits.len(),
                got: ids.len(),
            });
        }

        let mut by_id: HashMap<String, Habit> = std::mem::take(&mut self.habits)
            .into_iter()
            .map(|h| (h.id.clone(), h))
            .collect();
        self.habits = ids.iter().filter_map(|id| by_id.remove(id)).collect();
        Ok(())
    }

    /// Moves a habit to a 1-based position, clamped to the list bounds.
    pub fn move_habit(&mut self, id: &str, position: usize) -> Result<(), TrackerError> {
        let from = self.index_of(id)?;
        let habit = self.habits.remove(from);
        let to = position.saturating_sub(1).min(self.habits.len());
        self.habits.insert(to, habit);
        Ok(())
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<Habit, TrackerError> {
        let idx = self.index_of(id)?;
        let removed = self.habits.remove(idx);
        self.reminders.retain_habits(&self.habits);
        log::info!("deleted habit '{}' ({})", removed.title, removed.id);
        Ok(removed)
    }

    pub fn set_archived(&mut self, id: &str, archived: bool) -> Result<(), TrackerError> {
        let idx = self.index_of(id)?;
        self.habits[idx].archived = archived;
        Ok(())
    }

    /// Sets the note for `date`; empty text removes it.
    pub fn add_note(&mut self, id: &str, date: NaiveDate, text: &str) -> Result<(), TrackerError> {
        let idx = self.index_of(id)?;
        let notes = &mut self.habits[idx].notes;
        let text = text.trim();
        if text.is_empty() {
            notes.remove(&date);
        } else {
            notes.insert(date, text.to_string());
        }
        Ok(())
    }

    /// Unknown habits report `NotStarted`.
    pub fn habit_status(&self, id: &str, date: NaiveDate) -> HabitStatus {
        self.habit(id)
            .map(|h| h.status_on(date))
            .unwrap_or(HabitStatus::NotStarted)
    }

    // ─── Completion & gamification ──────────────────────────────────────────

    /// Flips completion of `date`. Completing awards XP and badges; un-completing
    /// never takes XP away.
    pub fn toggle_habit(
        &mut self,
        id: &str,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<ToggleOutcome, TrackerError> {
        let idx = self.index_of(id)?;
        let h = &mut self.habits[idx];

        let completed = if h.completed_dates.remove(&date) {
            false
        } else {
            h.completed_dates.insert(date);
            true
        };
        h.streak = streak::current_streak(&h.completed_dates, today);
        let streak = h.streak;
        let difficulty = h.difficulty;
        log::debug!("toggled '{}' on {}: completed={}", h.title, date, completed);

        if !completed {
            return Ok(ToggleOutcome {
                completed,
                streak,
                award: None,
                badges: Vec::new(),
            });
        }

        let award = self.add_xp(difficulty.xp_reward());
        let badges = ledger::completion_badge_ids(difficulty, streak)
            .into_iter()
            .filter_map(|id| self.unlock_badge(id))
            .collect();

        Ok(ToggleOutcome {
            completed,
            streak,
            award: Some(award),
            badges,
        })
    }

    pub fn add_xp(&mut self, amount: u64) -> XpAward {
        let award = ledger::add_xp(&mut self.gamification, amount);
        if let Some(level) = award.level_up {
            self.notifications.add(
                "Level Up!",
                format!("Congratulations! You reached Level {}.", level),
                NotificationKind::Success,
            );
        }
        for b in &award.unlocked {
            self.notify_badge(b);
        }
        award
    }

    /// Unlocks a catalog badge and announces it. `None` when the badge was
    /// already held or the id is unknown.
    pub fn unlock_badge(&mut self, id: &str) -> Option<&'static Badge> {
        let badge = ledger::unlock_badge(&mut self.gamification, id)?;
        self.notify_badge(badge);
        Some(badge)
    }

    fn notify_badge(&mut self, badge: &Badge) {
        self.notifications.add(
            "Badge Unlocked!",
            format!("You earned: {} {}", badge.title, badge.icon),
            NotificationKind::Success,
        );
    }

    pub fn reset_gamification(&mut self) {
        ledger::reset(&mut self.gamification);
    }

    pub fn level_progress(&self) -> LevelProgress {
        engine::progress(self.gamification.xp)
    }

    pub fn coach(&self, today: NaiveDate, hour: u32) -> Advice {
        let active = self.active_habits();
        engine::advise(&CoachInput {
            habits: &active,
            xp: self.gamification.xp,
            today,
            hour,
        })
    }

    /// Loads the stored state afresh, runs one reminder scan and saves when
    /// anything fired. Long-running callers use this instead of holding a
    /// session, so completions saved by other processes are never overwritten.
    pub fn remind(
        conn: &Connection,
        email: &str,
        now: NaiveDateTime,
        seed_examples: bool,
    ) -> Result<(Self, usize)> {
        let mut session = Self::load(conn, email, now.date(), seed_examples)?;
        let fired = session.scan_reminders(now);
        if fired > 0 {
            session.save(conn)?;
        }
        Ok((session, fired))
    }

    /// Runs one reminder scan, pushing due reminders into the inbox.
    pub fn scan_reminders(&mut self, now: NaiveDateTime) -> usize {
        let fired = self.reminders.scan(&self.habits, now);
        let count = fired.len();
        for n in fired {
            self.notifications.push(n);
        }
        count
    }
}

fn sample_habits(today: NaiveDate) -> Vec<Habit> {
    let mut run = Habit::new("Morning Run", "Health", Difficulty::Hard);
    run.completed_dates.insert(today);
    run.reminders = vec!["07:00".to_string()];

    let mut read = Habit::new("Read 30 mins", "Mind", Difficulty::Medium);
    read.streak_freeze = 2;

    vec![run, read]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::repository::SnapshotRepo;
    use crate::models::gamification::{FIRST_STEP, HARD_WORKER, STREAK_3, XP_100};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn new_habit(title: &str, difficulty: Difficulty) -> NewHabit {
        NewHabit {
            title: title.to_string(),
            category: "Test".to_string(),
            difficulty,
            ..Default::default()
        }
    }

    fn add(session: &mut Session, title: &str, difficulty: Difficulty) -> String {
        session.add_habit(new_habit(title, difficulty)).unwrap().id.clone()
    }

    #[test]
    fn fresh_namespace_is_seeded_once() {
        let conn = db();
        let today = d("2024-05-01");
        let s = Session::load(&conn, "a@b.c", today, true).unwrap();
        assert_eq!(s.habits.len(), 2);
        assert_eq!(s.habits[0].streak, 1);
        s.save(&conn).unwrap();

        let mut s = Session::load(&conn, "a@b.c", today, true).unwrap();
        let ids: Vec<String> = s.habits.iter().map(|h| h.id.clone()).collect();
        for id in &ids {
            s.delete_habit(id).unwrap();
        }
        s.save(&conn).unwrap();
        let s = Session::load(&conn, "a@b.c", today, true).unwrap();
        assert!(s.habits.is_empty());
    }

    #[test]
    fn streaks_are_refreshed_on_load() {
        let conn = db();
        let mut s = Session::load(&conn, "a@b.c", d("2024-01-03"), false).unwrap();
        let id = add(&mut s, "Run", Difficulty::Medium);
        for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            s.toggle_habit(&id, d(day), d("2024-01-03")).unwrap();
        }
        assert_eq!(s.habit(&id).unwrap().streak, 3);
        s.save(&conn).unwrap();

        let later = Session::load(&conn, "a@b.c", d("2024-01-05"), false).unwrap();
        assert_eq!(later.habit(&id).unwrap().streak, 0);
    }

    #[test]
    fn toggling_awards_xp_once_and_never_takes_it_back() {
        let mut s = Session::empty("a@b.c");
        let today = d("2024-01-01");
        let id = add(&mut s, "Lift", Difficulty::Hard);

        let on = s.toggle_habit(&id, today, today).unwrap();
        assert!(on.completed);
        assert_eq!(on.streak, 1);
        assert_eq!(on.award.as_ref().unwrap().amount, 20);
        assert_eq!(on.badges.iter().map(|b| b.id).collect::<Vec<_>>(), vec![HARD_WORKER]);
        assert_eq!(s.gamification.xp, 20);
        assert!(s.gamification.has_badge(FIRST_STEP));

        let off = s.toggle_habit(&id, today, today).unwrap();
        assert!(!off.completed);
        assert_eq!(off.streak, 0);
        assert!(off.award.is_none());
        assert_eq!(s.gamification.xp, 20);
        assert_eq!(s.habit_status(&id, today), HabitStatus::NotStarted);

        let again = s.toggle_habit(&id, today, today).unwrap();
        assert!(again.badges.is_empty());
        assert_eq!(s.gamification.xp, 40);
    }

    #[test]
    fn level_up_and_badges_land_in_the_inbox() {
        let mut s = Session::empty("a@b.c");
        let award = s.add_xp(100);
        assert_eq!(award.level_up, Some(2));
        let titles: Vec<&str> = s.notifications.items.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Badge Unlocked!", "Badge Unlocked!", "Level Up!"]);
        assert!(s.gamification.has_badge(XP_100));

        s.add_xp(0);
        assert_eq!(s.notifications.items.len(), 3);
    }

    #[test]
    fn streak_badge_unlocks_on_third_day() {
        let mut s = Session::empty("a@b.c");
        let id = add(&mut s, "Walk", Difficulty::Easy);
        let today = d("2024-01-03");
        s.toggle_habit(&id, d("2024-01-01"), today).unwrap();
        s.toggle_habit(&id, d("2024-01-02"), today).unwrap();
        let third = s.toggle_habit(&id, today, today).unwrap();
        assert_eq!(third.streak, 3);
        assert_eq!(third.badges.iter().map(|b| b.id).collect::<Vec<_>>(), vec![STREAK_3]);
        assert_eq!(s.gamification.xp, 15);
    }

    #[test]
    fn resolve_by_position_title_and_prefix() {
        let mut s = Session::empty("a@b.c");
        let run = add(&mut s, "Run", Difficulty::Medium);
        let read = add(&mut s, "Read", Difficulty::Medium);
        add(&mut s, "Read", Difficulty::Easy);

        assert_eq!(s.resolve("1").unwrap(), run);
        assert_eq!(s.resolve("run").unwrap(), run);
        assert_eq!(s.resolve(&read[..8]).unwrap(), read);
        assert!(matches!(s.resolve("read"), Err(TrackerError::AmbiguousHabit { count: 2, .. })));
        assert!(matches!(s.resolve("swim"), Err(TrackerError::HabitNotFound(_))));
        assert!(matches!(s.resolve("9"), Err(TrackerError::HabitNotFound(_))));
    }

    #[test]
    fn update_validates_before_mutating() {
        let mut s = Session::empty("a@b.c");
        let id = add(&mut s, "Run", Difficulty::Medium);

        let bad = HabitUpdate {
            title: Some("Jog".into()),
            reminders: Some(vec!["99:99".into()]),
            ..Default::default()
        };
        assert!(s.update_habit(&id, bad).is_err());
        assert_eq!(s.habit(&id).unwrap().title, "Run");

        let good = HabitUpdate {
            title: Some("Jog".into()),
            difficulty: Some(Difficulty::Hard),
            reminders: Some(vec!["6:30".into()]),
            streak_freeze: Some(3),
            emoji: Some("🏃".into()),
            ..Default::default()
        };
        let h = s.update_habit(&id, good).unwrap();
        assert_eq!(h.title, "Jog");
        assert_eq!(h.reminders, vec!["06:30".to_string()]);
        assert_eq!(h.streak_freeze, 3);
        assert_eq!(h.label(), "🏃 Jog");

        let cleared = s
            .update_habit(&id, HabitUpdate { emoji: Some(String::new()), ..Default::default() })
            .unwrap();
        assert_eq!(cleared.emoji, None);
    }

    #[test]
    fn add_rejects_blank_titles_and_bad_reminders() {
        let mut s = Session::empty("a@b.c");
        assert_eq!(s.add_habit(new_habit("  ", Difficulty::Easy)).err(), Some(TrackerError::EmptyTitle));
        let bad = NewHabit {
            reminders: vec!["noon".into()],
            ..new_habit("Nap", Difficulty::Easy)
        };
        assert!(matches!(s.add_habit(bad), Err(TrackerError::InvalidReminder(_))));
        let blank_category = NewHabit {
            category: String::new(),
            ..new_habit("Nap", Difficulty::Easy)
        };
        assert_eq!(s.add_habit(blank_category).unwrap().category, "General");
    }

    #[test]
    fn reorder_and_move() {
        let mut s = Session::empty("a@b.c");
        let a = add(&mut s, "A", Difficulty::Easy);
        let b = add(&mut s, "B", Difficulty::Easy);
        let c = add(&mut s, "C", Difficulty::Easy);

        s.reorder(&[c.clone(), a.clone(), b.clone()]).unwrap();
        let titles: Vec<&str> = s.habits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);

        assert!(s.reorder(&[a.clone(), b.clone()]).is_err());
        assert!(s.reorder(&[a.clone(), b.clone(), "zzz".to_string()]).is_err());
        assert_eq!(s.habits.len(), 3);

        s.move_habit(&a, 99).unwrap();
        assert_eq!(s.habits.last().unwrap().id, a);
        s.move_habit(&a, 1).unwrap();
        assert_eq!(s.habits[0].id, a);
    }

    #[test]
    fn notes_and_archiving() {
        let mut s = Session::empty("a@b.c");
        let id = add(&mut s, "Journal", Difficulty::Easy);
        let day = d("2024-02-02");
        s.add_note(&id, day, "felt great").unwrap();
        assert_eq!(s.habit(&id).unwrap().notes.get(&day).map(String::as_str), Some("felt great"));
        s.add_note(&id, day, "").unwrap();
        assert!(s.habit(&id).unwrap().notes.is_empty());

        s.set_archived(&id, true).unwrap();
        assert!(s.active_habits().is_empty());
        assert_eq!(s.coach(day, 12), Advice::Onboarding);
        assert!(s.set_archived("missing", true).is_err());
    }

    #[test]
    fn coach_celebrates_when_everything_is_done() {
        let mut s = Session::empty("a@b.c");
        let today = d("2024-01-03");
        for t in ["A", "B", "C"] {
            let id = add(&mut s, t, Difficulty::Medium);
            s.toggle_habit(&id, today, today).unwrap();
        }
        assert_eq!(s.coach(today, 15), Advice::Celebration);
    }

    #[test]
    fn reminders_fire_into_inbox_once() {
        let mut s = Session::empty("a@b.c");
        let id = add(&mut s, "Water", Difficulty::Easy);
        s.update_habit(&id, HabitUpdate { reminders: Some(vec!["09:15".into()]), ..Default::default() })
            .unwrap();
        let now = d("2024-01-01").and_hms_opt(9, 15, 10).unwrap();
        assert_eq!(s.scan_reminders(now), 1);
        assert_eq!(s.scan_reminders(now), 0);
        assert_eq!(s.notifications.unread_count(), 1);
        assert_eq!(s.notifications.items[0].kind, NotificationKind::Warning);
    }

    #[test]
    fn reminder_scan_keeps_changes_saved_by_another_session() {
        let conn = db();
        let today = d("2024-01-01");
        let mut watcher = Session::load(&conn, "a@b.c", today, false).unwrap();
        let mut add_with_reminder = |title: &str| {
            let habit = NewHabit {
                reminders: vec!["09:15".into()],
                ..new_habit(title, Difficulty::Easy)
            };
            watcher.add_habit(habit).unwrap().id.clone()
        };
        let water = add_with_reminder("Water");
        add_with_reminder("Walk");
        watcher.save(&conn).unwrap();

        let mut other = Session::load(&conn, "a@b.c", today, false).unwrap();
        other.toggle_habit(&water, today, today).unwrap();
        other.save(&conn).unwrap();

        let now = today.and_hms_opt(9, 15, 20).unwrap();
        let (fresh, fired) = Session::remind(&conn, "a@b.c", now, false).unwrap();
        assert_eq!(fired, 1);
        assert_eq!(fresh.notifications.items[0].title, "Reminder: Walk");

        let stored = Session::load(&conn, "a@b.c", today, false).unwrap();
        assert!(stored.habit(&water).unwrap().is_completed_on(today));
        assert_eq!(stored.gamification.xp, 5);
        assert_eq!(Session::remind(&conn, "a@b.c", now, false).unwrap().1, 0);
    }

    #[test]
    fn newer_snapshot_blocks_load_and_is_left_untouched() {
        let conn = db();
        let key = Namespace::new("a@b.c").habits_key();
        let newer = r#"{"schemaVersion":2,"habits":[{"id":"1","title":"Run"}]}"#;
        SnapshotRepo::put(&conn, &key, newer).unwrap();

        assert!(Session::load(&conn, "a@b.c", d("2024-01-01"), true).is_err());
        let now = d("2024-01-01").and_hms_opt(9, 0, 0).unwrap();
        assert!(Session::remind(&conn, "a@b.c", now, true).is_err());
        assert_eq!(SnapshotRepo::get(&conn, &key).unwrap().as_deref(), Some(newer));
    }

    #[test]
    fn gamification_survives_save_and_reset_is_explicit() {
        let conn = db();
        let today = d("2024-01-01");
        let mut s = Session::load(&conn, "a@b.c", today, false).unwrap();
        s.add_xp(150);
        s.save(&conn).unwrap();

        let mut s = Session::load(&conn, "A@B.C", today, false).unwrap();
        assert_eq!(s.gamification.xp, 150);
        assert_eq!(s.level_progress().level, 2);
        assert_eq!(s.notifications.items.len(), 3);

        s.reset_gamification();
        assert_eq!(s.gamification.xp, 0);
        assert_eq!(s.unlock_badge(FIRST_STEP).map(|b| b.id), Some(FIRST_STEP));
        assert!(s.unlock_badge(FIRST_STEP).is_none());
        assert!(s.unlock_badge("made_up").is_none());
    }
}
