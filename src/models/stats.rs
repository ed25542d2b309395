use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Completion summary for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub habits_done: u32,
    pub habits_total: u32,
}

impl DailyStats {
    pub fn completion_ratio(&self) -> f64 {
        if self.habits_total == 0 {
            0.0
        } else {
            self.habits_done as f64 / self.habits_total as f64
        }
    }

    /// Rounded completion percentage, 0 when there are no habits.
    pub fn percent(&self) -> u32 {
        (self.completion_ratio() * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyGrid {
    pub days: Vec<DailyStats>,
}

impl WeeklyGrid {
    pub fn new(days: Vec<DailyStats>) -> Self {
        Self { days }
    }

    pub fn total_done(&self) -> u32 {
        self.days.iter().map(|d| d.habits_done).sum()
    }

    pub fn perfect_days(&self) -> u32 {
        self.days
            .iter()
            .filter(|d| d.habits_total > 0 && d.habits_done >= d.habits_total)
            .count() as u32
    }
}

/// One cell of the year heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
    /// 0 = nothing done, 4 = more than three quarters of habits done.
    pub intensity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub active_habits: usize,
    pub longest_streak: u32,
    pub average_streak: f64,
    pub best_ever_streak: u32,
    pub completion_rate_30d: u32,
    pub best_habit: Option<String>,
    pub best_weekday: Option<Weekday>,
}
