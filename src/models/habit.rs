use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::error::TrackerError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const REMINDER_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// XP awarded for one completion at this difficulty.
    pub fn xp_reward(&self) -> u64 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 20,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Difficulty {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "med" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            _ => Err(TrackerError::UnknownDifficulty(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HabitStatus {
    Completed,
    NotStarted,
}

impl HabitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitStatus::Completed => "completed",
            HabitStatus::NotStarted => "not-started",
        }
    }
}

fn default_goal() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default)]
    pub completed_dates: BTreeSet<NaiveDate>,
    /// Cached; always recomputed from `completed_dates` on load and mutation.
    #[serde(default)]
    pub streak: u32,
    #[serde(default = "default_goal")]
    pub goal: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub reminders: Vec<String>,
    #[serde(default)]
    pub streak_freeze: u32,
    #[serde(default)]
    pub notes: BTreeMap<NaiveDate, String>,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(title: &str, category: &str, difficulty: Difficulty) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            category: category.trim().to_string(),
            emoji: None,
            completed_dates: BTreeSet::new(),
            streak: 0,
            goal: default_goal(),
            difficulty,
            reminders: Vec::new(),
            streak_freeze: 0,
            notes: BTreeMap::new(),
            archived: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    pub fn status_on(&self, date: NaiveDate) -> HabitStatus {
        if self.is_completed_on(date) {
            HabitStatus::Completed
        } else {
            HabitStatus::NotStarted
        }
    }

    pub fn last_completed(&self) -> Option<NaiveDate> {
        self.completed_dates.iter().next_back().copied()
    }

    /// Short id shown in listings.
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(8)
            .map_or(self.id.as_str(), |(end, _)| &self.id[..end])
    }

    pub fn label(&self) -> String {
        match &self.emoji {
            Some(e) if !e.is_empty() => format!("{} {}", e, self.title),
            _ => self.title.clone(),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| TrackerError::InvalidDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Normalise a reminder to zero-padded `HH:MM`.
pub fn parse_reminder(s: &str) -> Result<String, TrackerError> {
    NaiveTime::parse_from_str(s.trim(), REMINDER_FORMAT)
        .map(|t| t.format(REMINDER_FORMAT).to_string())
        .map_err(|_| TrackerError::InvalidReminder(s.to_string()))
}

/// Parse, normalise and dedupe a list of reminder times, keeping first-seen order.
pub fn parse_reminders<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, TrackerError> {
    let mut out: Vec<String> = Vec::new();
    for r in raw {
        let t = parse_reminder(r.as_ref())?;
        if !out.contains(&t) {
            out.push(t);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_aliases_and_rejects_unknown() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("m".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(
            "brutal".parse::<Difficulty>(),
            Err(TrackerError::UnknownDifficulty("brutal".to_string()))
        );
    }

    #[test]
    fn rewards_follow_difficulty() {
        let rewards: Vec<u64> = Difficulty::all().iter().map(|d| d.xp_reward()).collect();
        assert_eq!(rewards, vec![5, 10, 20]);
    }

    #[test]
    fn reminders_are_normalised_and_deduped() {
        let parsed = parse_reminders(&["7:05", "07:05", "21:30"]).unwrap();
        assert_eq!(parsed, vec!["07:05".to_string(), "21:30".to_string()]);
        assert!(parse_reminders(&["25:00"]).is_err());
    }

    #[test]
    fn serializes_with_camel_case_and_plain_dates() {
        let mut h = Habit::new("Read", "Mind", Difficulty::Easy);
        h.completed_dates.insert(parse_date("2024-01-02").unwrap());
        h.streak_freeze = 2;
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["completedDates"][0], "2024-01-02");
        assert_eq!(json["streakFreeze"], 2);
        assert_eq!(json["difficulty"], "easy");
        assert!(json.get("emoji").is_none());
    }

    #[test]
    fn duplicate_dates_collapse_on_deserialize() {
        let json = serde_json::json!({
            "id": "x", "title": "Run", "category": "Health",
            "completedDates": ["2024-01-01", "2024-01-01"],
            "createdAt": "2024-01-01T00:00:00Z"
        });
        let h: Habit = serde_json::from_value(json).unwrap();
        assert_eq!(h.completed_dates.len(), 1);
        assert_eq!(h.goal, 1);
        assert_eq!(h.difficulty, Difficulty::Medium);
    }

    #[test]
    fn short_id_cuts_on_char_boundaries() {
        let mut h = Habit::new("Run", "Health", Difficulty::Easy);
        assert_eq!(h.short_id().len(), 8);
        h.id = "ß".repeat(9);
        assert_eq!(h.short_id(), "ß".repeat(8));
    }
}
