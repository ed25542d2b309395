//! XP, levels and badge unlocks.
//!
//! `level(xp) = floor(0.1 * sqrt(xp)) + 1` and the XP floor of a level is
//! `100 * (level - 1)^2`. The XP badge thresholds (100/500/1000) are
//! independent of the level curve.

use crate::models::gamification::{
    find_badge, Badge, GamificationState, FIRST_STEP, HARD_WORKER, STREAK_3, STREAK_30, STREAK_7,
    XP_100, XP_1000, XP_500,
};
use crate::models::Difficulty;

const XP_BADGES: &[(&str, u64)] = &[(XP_100, 100), (XP_500, 500), (XP_1000, 1000)];
const STREAK_BADGES: &[(&str, u32)] = &[(STREAK_3, 3), (STREAK_7, 7), (STREAK_30, 30)];

pub fn level(xp: u64) -> u32 {
    (xp.isqrt() / 10 + 1) as u32
}

pub fn xp_floor(level: u32) -> u64 {
    let steps = level.saturating_sub(1) as u64;
    100u64.saturating_mul(steps.saturating_mul(steps))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u64,
    pub current_floor: u64,
    pub next_floor: u64,
    pub xp_to_next: u64,
    /// Percent of the way from `current_floor` to `next_floor`, clamped to 0..=100.
    pub percent: f64,
}

pub fn progress(xp: u64) -> LevelProgress {
    let level = level(xp);
    let current_floor = xp_floor(level);
    let next_floor = xp_floor(level + 1);
    let span = next_floor.saturating_sub(current_floor);
    let into = xp.saturating_sub(current_floor);
    let percent = if span == 0 {
        0.0
    } else {
        (into as f64 / span as f64 * 100.0).clamp(0.0, 100.0)
    };

    LevelProgress {
        level,
        xp,
        current_floor,
        next_floor,
        xp_to_next: next_floor.saturating_sub(xp),
        percent,
    }
}

/// Result of crediting XP.
#[derive(Debug, Clone, PartialEq)]
pub struct XpAward {
    pub amount: u64,
    pub total: u64,
    /// New level when this award crossed a level boundary.
    pub level_up: Option<u32>,
    pub unlocked: Vec<&'static Badge>,
}

/// Credits `amount` XP and unlocks any XP badges reached for the first time.
pub fn add_xp(state: &mut GamificationState, amount: u64) -> XpAward {
    let old = state.xp;
    let new = old.saturating_add(amount);
    state.xp = new;

    let level_up = (level(new) > level(old)).then(|| level(new));

    let mut unlocked = Vec::new();
    for &(id, threshold) in XP_BADGES {
        if new >= threshold {
            unlocked.extend(unlock_badge(state, id));
        }
    }
    if new > 0 {
        unlocked.extend(unlock_badge(state, FIRST_STEP));
    }

    XpAward {
        amount,
        total: new,
        level_up,
        unlocked,
    }
}

/// Unlocks a catalog badge. Returns it only on the first unlock.
pub fn unlock_badge(state: &mut GamificationState, id: &str) -> Option<&'static Badge> {
    let Some(badge) = find_badge(id) else {
        log::warn!("ignoring unknown badge id '{}'", id);
        return None;
    };
    if state.has_badge(id) {
        return None;
    }
    state.badges.push(badge.id.to_string());
    log::info!("badge unlocked: {}", badge.id);
    Some(badge)
}

/// Badges a single completion qualifies for, in unlock order. Already-held
/// badges are included; unlocking them again is a no-op.
pub fn completion_badge_ids(difficulty: Difficulty, streak: u32) -> Vec<&'static str> {
    let mut ids = Vec::new();
    if difficulty == Difficulty::Hard {
        ids.push(HARD_WORKER);
    }
    ids.extend(
        STREAK_BADGES
            .iter()
            .filter(|&&(_, threshold)| streak >= threshold)
            .map(|&(id, _)| id),
    );
    ids
}

pub fn reset(state: &mut GamificationState) {
    log::warn!("resetting gamification state (xp was {})", state.xp);
    *state = GamificationState::default();
}
