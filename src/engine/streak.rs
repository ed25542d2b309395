use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::Streak;

/// Consecutive-day streak ending at the most recent completion.
///
/// The streak survives one day without a completion (today is not over yet);
/// once the last completion is more than one calendar day before `today` it is 0.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&last) = dates.iter().next_back() else {
        return 0;
    };
    if (today - last).num_days() > 1 {
        return 0;
    }

    let mut count = 0u32;
    let mut check = Some(last);
    for d in dates.iter().rev() {
        match check {
            Some(c) if *d == c => {
                count += 1;
                check = c.pred_opt();
            }
            _ => break,
        }
    }
    count
}

/// Longest run of consecutive days anywhere in the set.
pub fn best_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &d in dates {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(next) if next == d => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(d);
    }
    best
}

pub fn streak_summary(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Streak {
    Streak {
        current: current_streak(dates, today),
        best: best_streak(dates),
    }
}
