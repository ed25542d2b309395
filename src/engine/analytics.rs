//! Aggregates over the habit list: weekly trend, year heatmap and headline numbers.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashMap;

use crate::engine::streak::best_streak;
use crate::models::{DailyStats, Habit, HeatmapCell, Overview, WeeklyGrid};

pub const HEATMAP_DAYS: u64 = 365;
const COMPLETION_WINDOW_DAYS: u64 = 30;

const WEEKDAYS_SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// `days` consecutive dates ending at `end`, oldest first.
pub fn window(end: NaiveDate, days: u64) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .filter_map(|i| end.checked_sub_days(Days::new(i)))
        .collect()
}

pub fn daily_stats(habits: &[&Habit], date: NaiveDate) -> DailyStats {
    DailyStats {
        date,
        habits_done: habits.iter().filter(|h| h.is_completed_on(date)).count() as u32,
        habits_total: habits.len() as u32,
    }
}

/// Daily completion for the `days` days ending today.
pub fn trend(habits: &[&Habit], today: NaiveDate, days: u64) -> WeeklyGrid {
    WeeklyGrid::new(
        window(today, days.max(1))
            .into_iter()
            .map(|d| daily_stats(habits, d))
            .collect(),
    )
}

pub fn intensity(count: u32, total: usize) -> u8 {
    if count == 0 || total == 0 {
        return 0;
    }
    let ratio = count as f64 / total as f64;
    if ratio <= 0.25 {
        1
    } else if ratio <= 0.50 {
        2
    } else if ratio <= 0.75 {
        3
    } else {
        4
    }
}

/// Rolling year of completion counts, oldest first.
pub fn heatmap(habits: &[&Habit], today: NaiveDate) -> Vec<HeatmapCell> {
    let mut counts: HashMap<NaiveDate, u32> = HashMap::new();
    for h in habits {
        for d in &h.completed_dates {
            *counts.entry(*d).or_insert(0) += 1;
        }
    }

    window(today, HEATMAP_DAYS)
        .into_iter()
        .map(|date| {
            let count = counts.get(&date).copied().unwrap_or(0);
            HeatmapCell {
                date,
                count,
                intensity: intensity(count, habits.len()),
            }
        })
        .collect()
}

pub fn completion_rate(habits: &[&Habit], today: NaiveDate, days: u64) -> u32 {
    let possible = habits.len() as u64 * days;
    if possible == 0 {
        return 0;
    }
    let Some(start) = today.checked_sub_days(Days::new(days.saturating_sub(1))) else {
        return 0;
    };
    let actual: u64 = habits
        .iter()
        .map(|h| h.completed_dates.range(start..=today).count() as u64)
        .sum();
    (actual as f64 / possible as f64 * 100.0).round() as u32
}

/// Weekday with the most completions; ties go to the earliest day from Sunday.
pub fn best_weekday(habits: &[&Habit]) -> Option<Weekday> {
    let mut freq = [0u32; 7];
    for h in habits {
        for d in &h.completed_dates {
            freq[d.weekday().num_days_from_sunday() as usize] += 1;
        }
    }
    let mut best = 0usize;
    for i in 1..7 {
        if freq[i] > freq[best] {
            best = i;
        }
    }
    (freq[best] > 0).then(|| WEEKDAYS_SUNDAY_FIRST[best])
}

pub fn overview(habits: &[&Habit], today: NaiveDate) -> Overview {
    let longest_streak = habits.iter().map(|h| h.streak).max().unwrap_or(0);
    let average_streak = if habits.is_empty() {
        0.0
    } else {
        let sum: u32 = habits.iter().map(|h| h.streak).sum();
        (sum as f64 / habits.len() as f64 * 10.0).round() / 10.0
    };

    let mut best_habit: Option<&Habit> = None;
    for h in habits {
        if best_habit.is_none_or(|b| h.streak > b.streak) {
            best_habit = Some(h);
        }
    }

    Overview {
        active_habits: habits.len(),
        longest_streak,
        average_streak,
        best_ever_streak: habits
            .iter()
            .map(|h| best_streak(&h.completed_dates))
            .max()
            .unwrap_or(0),
        completion_rate_30d: completion_rate(habits, today, COMPLETION_WINDOW_DAYS),
        best_habit: best_habit.map(|h| h.title.clone()),
        best_weekday: best_weekday(habits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::streak::current_streak;
    use crate::models::Difficulty;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn habit(title: &str, dates: &[&str], today: NaiveDate) -> Habit {
        let mut h = Habit::new(title, "General", Difficulty::Medium);
        h.completed_dates = dates.iter().map(|s| d(s)).collect();
        h.streak = current_streak(&h.completed_dates, today);
        h
    }

    #[test]
    fn weekly_trend_reports_percent_per_day() {
        let today = d("2024-01-07");
        let habits = vec![
            habit("Run", &["2024-01-07", "2024-01-06"], today),
            habit("Read", &["2024-01-07"], today),
        ];
        let refs: Vec<&Habit> = habits.iter().collect();
        let grid = trend(&refs, today, 7);
        assert_eq!(grid.days.len(), 7);
        assert_eq!(grid.days[0].date, d("2024-01-01"));
        let percents: Vec<u32> = grid.days.iter().map(|s| s.percent()).collect();
        assert_eq!(percents, vec![0, 0, 0, 0, 0, 50, 100]);
        assert_eq!(grid.total_done(), 3);
        assert_eq!(grid.perfect_days(), 1);
    }

    #[test]
    fn trend_length_follows_request() {
        let today = d("2024-01-07");
        let habits = vec![habit("Run", &["2024-01-07"], today)];
        let refs: Vec<&Habit> = habits.iter().collect();
        assert_eq!(trend(&refs, today, 14).days.len(), 14);
        assert_eq!(trend(&refs, today, 0).days.len(), 1);
    }

    #[test]
    fn weekly_trend_without_habits_is_all_zero() {
        let grid = trend(&[], d("2024-01-07"), 7);
        assert!(grid.days.iter().all(|s| s.percent() == 0));
    }

    #[test]
    fn heatmap_covers_a_year_with_intensity_buckets() {
        let today = d("2024-06-30");
        let habits = vec![
            habit("A", &["2024-06-30", "2024-06-29"], today),
            habit("B", &["2024-06-30"], today),
            habit("C", &["2024-06-30"], today),
            habit("D", &["2023-01-01"], today),
        ];
        let refs: Vec<&Habit> = habits.iter().collect();
        let cells = heatmap(&refs, today);
        assert_eq!(cells.len(), 365);
        let last = cells.last().unwrap();
        assert_eq!((last.count, last.intensity), (3, 3));
        let prev = &cells[cells.len() - 2];
        assert_eq!((prev.count, prev.intensity), (1, 1));
        assert!(cells.iter().all(|c| c.date > d("2023-06-30")));
        assert_eq!(intensity(4, 4), 4);
        assert_eq!(intensity(2, 4), 2);
        assert_eq!(intensity(3, 0), 0);
    }

    #[test]
    fn overview_numbers() {
        let today = d("2024-01-10");
        let habits = vec![
            habit("Run", &["2024-01-08", "2024-01-09", "2024-01-10"], today),
            habit("Read", &["2024-01-10"], today),
            habit("Old", &["2023-11-01", "2023-11-02", "2023-11-03", "2023-11-04"], today),
        ];
        let refs: Vec<&Habit> = habits.iter().collect();
        let o = overview(&refs, today);
        assert_eq!(o.active_habits, 3);
        assert_eq!(o.longest_streak, 3);
        assert!((o.average_streak - 1.3).abs() < 1e-9);
        assert_eq!(o.best_ever_streak, 4);
        // 4 completions in window / 90 possible
        assert_eq!(o.completion_rate_30d, 4);
        assert_eq!(o.best_habit.as_deref(), Some("Run"));
    }

    #[test]
    fn best_weekday_prefers_sunday_on_ties() {
        let today = d("2024-01-10");
        // 2024-01-07 is a Sunday, 2024-01-08 a Monday
        let habits = vec![habit("Run", &["2024-01-07", "2024-01-08"], today)];
        let refs: Vec<&Habit> = habits.iter().collect();
        assert_eq!(best_weekday(&refs), Some(Weekday::Sun));
        assert_eq!(best_weekday(&[]), None);
    }
}
