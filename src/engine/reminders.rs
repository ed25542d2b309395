use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::models::habit::REMINDER_FORMAT;
use crate::models::{Habit, Notification, NotificationKind};

/// Last minute a reminder fired for each habit, keyed by habit id.
///
/// Persisted alongside the habits so that a scan repeated within the same
/// minute (another CLI run, a TUI redraw) never notifies twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderState {
    #[serde(default)]
    pub last_fired: HashMap<String, NaiveDateTime>,
}

pub fn truncate_to_minute(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Time left until the next wall-clock minute starts.
pub fn until_next_minute(now: NaiveDateTime) -> Duration {
    let elapsed_ms = (now.second() as u64) * 1000 + (now.nanosecond() as u64 / 1_000_000).min(999);
    Duration::from_millis(60_000u64.saturating_sub(elapsed_ms).max(1))
}

impl ReminderState {
    /// Returns one notification per habit due at `now`'s minute.
    pub fn scan(&mut self, habits: &[Habit], now: NaiveDateTime) -> Vec<Notification> {
        let minute = truncate_to_minute(now);
        let today = now.date();
        let hhmm = now.format(REMINDER_FORMAT).to_string();

        let mut fired = Vec::new();
        for habit in habits {
            if habit.archived || habit.is_completed_on(today) {
                continue;
            }
            if !habit.reminders.iter().any(|r| *r == hhmm) {
                continue;
            }
            if self.last_fired.get(&habit.id) == Some(&minute) {
                continue;
            }
            self.last_fired.insert(habit.id.clone(), minute);
            log::info!("reminder fired for '{}' at {}", habit.title, hhmm);
            fired.push(Notification::new(
                format!("Reminder: {}", habit.title),
                "It's time to work on your habit!",
                NotificationKind::Warning,
            ));
        }
        fired
    }

    /// Drops entries for habits that no longer exist.
    pub fn retain_habits(&mut self, habits: &[Habit]) {
        self.last_fired
            .retain(|id, _| habits.iter().any(|h| &h.id == id));
    }
}
