//! Rule-based coach: a fixed, priority-ordered table over the current state.

use chrono::{Days, NaiveDate};

use crate::models::Habit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Motivation,
    Correction,
    Insight,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Motivation => "motivation",
            Tone::Correction => "correction",
            Tone::Insight => "insight",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    Onboarding,
    Celebration,
    DontBreakTheChain { habit: String },
    NearMilestone,
    Morning,
    LateEvening,
    Consistency,
}

impl Advice {
    pub fn tone(&self) -> Tone {
        match self {
            Advice::Onboarding | Advice::Morning | Advice::Consistency => Tone::Insight,
            Advice::Celebration | Advice::NearMilestone | Advice::LateEvening => Tone::Motivation,
            Advice::DontBreakTheChain { .. } => Tone::Correction,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Advice::Onboarding => {
                "Welcome! Start by adding a small habit you can do today. Maybe 'Drink Water'?"
                    .to_string()
            }
            Advice::Celebration => "All habits crushed today! You're unstoppable. 🚀".to_string(),
            Advice::DontBreakTheChain { habit } => format!(
                "Don't let {} fade away! One checkmark today can restart your momentum.",
                habit
            ),
            Advice::NearMilestone => {
                "You're close to the next big milestone! Keep going for that next Level."
                    .to_string()
            }
            Advice::Morning => {
                "Good morning! Tackling the hardest habit first creates a productivity snowball."
                    .to_string()
            }
            Advice::LateEvening => "It's late, but not too late. Just 5 minutes on a remaining habit keeps the streak alive.".to_string(),
            Advice::Consistency => "Consistency eats intensity for breakfast. Just show up.".to_string(),
        }
    }
}

/// Everything the coach looks at. Streaks on `habits` must already be fresh.
#[derive(Debug, Clone, Copy)]
pub struct CoachInput<'a> {
    pub habits: &'a [&'a Habit],
    pub xp: u64,
    pub today: NaiveDate,
    /// Local hour of day, 0..=23.
    pub hour: u32,
}

pub fn advise(input: &CoachInput<'_>) -> Advice {
    let habits = input.habits;
    if habits.is_empty() {
        return Advice::Onboarding;
    }

    let total = habits.len();
    let done_today = habits.iter().filter(|h| h.is_completed_on(input.today)).count();
    if done_today == total {
        return Advice::Celebration;
    }

    let yesterday = input.today.checked_sub_days(Days::new(1));
    let fading = habits.iter().find(|h| {
        h.streak == 0
            && !h.completed_dates.is_empty()
            && !h.is_completed_on(input.today)
            && !yesterday.is_some_and(|y| h.is_completed_on(y))
    });
    if let Some(h) = fading {
        return Advice::DontBreakTheChain {
            habit: h.title.clone(),
        };
    }

    if input.xp > 0 && input.xp % 100 < 20 {
        return Advice::NearMilestone;
    }
    if input.hour < 10 && done_today == 0 {
        return Advice::Morning;
    }
    if input.hour > 20 && done_today < total {
        return Advice::LateEvening;
    }
    Advice::Consistency
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

    fn run(habits: &[Habit], xp: u64, today: NaiveDate, hour: u32) -> Advice {
        let refs: Vec<&Habit> = habits.iter().collect();
        advise(&CoachInput {
            habits: &refs,
            xp,
            today,
            hour,
        })
    }

    #[test]
    fn no_habits_means_onboarding() {
        assert_eq!(run(&[], 500, d("2024-01-03"), 12), Advice::Onboarding);
    }

    #[test]
    fn everything_done_today_is_celebrated() {
        let today = d("2024-01-03");
        let habits = vec![
            habit("Run", &["2024-01-03"], today),
            habit("Read", &["2024-01-03"], today),
            habit("Stretch", &["2024-01-01", "2024-01-03"], today),
        ];
        let advice = run(&habits, 10, today, 22);
        assert_eq!(advice, Advice::Celebration);
        assert_eq!(advice.tone(), Tone::Motivation);
    }

    #[test]
    fn faded_habit_is_named_first_in_order() {
        let today = d("2024-01-10");
        let habits = vec![
            habit("Run", &["2024-01-09"], today),
            habit("Read", &["2024-01-01"], today),
            habit("Stretch", &["2024-01-02"], today),
        ];
        let advice = run(&habits, 15, today, 12);
        assert_eq!(
            advice,
            Advice::DontBreakTheChain {
                habit: "Read".to_string()
            }
        );
        assert!(advice.message().contains("Don't let Read fade away"));
    }

    #[test]
    fn never_started_habits_do_not_count_as_fading() {
        let today = d("2024-01-10");
        let habits = vec![habit("Fresh", &[], today)];
        assert_eq!(run(&habits, 110, today, 12), Advice::NearMilestone);
    }

    #[test]
    fn milestone_window_is_first_twenty_xp_of_each_hundred() {
        let today = d("2024-01-10");
        let habits = vec![habit("Run", &["2024-01-09"], today)];
        assert_eq!(run(&habits, 119, today, 12), Advice::NearMilestone);
        assert_eq!(run(&habits, 120, today, 12), Advice::Consistency);
        assert_eq!(run(&habits, 0, today, 12), Advice::Consistency);
    }

    #[test]
    fn time_of_day_rules() {
        let today = d("2024-01-10");
        let habits = vec![
            habit("Run", &["2024-01-09"], today),
            habit("Read", &["2024-01-10"], today),
        ];
        assert_eq!(run(&habits[..1], 50, today, 7), Advice::Morning);
        // something already done this morning
        assert_eq!(run(&habits, 50, today, 7), Advice::Consistency);
        assert_eq!(run(&habits, 50, today, 21), Advice::LateEvening);
        assert_eq!(run(&habits, 50, today, 20), Advice::Consistency);
    }
}
