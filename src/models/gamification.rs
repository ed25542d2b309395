use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const FIRST_STEP: &str = "first_step";
pub const STREAK_3: &str = "streak_3";
pub const STREAK_7: &str = "streak_7";
pub const STREAK_30: &str = "streak_30";
pub const XP_100: &str = "xp_100";
pub const XP_500: &str = "xp_500";
pub const XP_1000: &str = "xp_1000";
pub const HARD_WORKER: &str = "hard_worker";

/// Every badge that can be unlocked, in display order.
pub static BADGES: &[Badge] = &[
    Badge {
        id: FIRST_STEP,
        title: "First Step",
        description: "Completed your first habit",
        icon: "🌱",
    },
    Badge {
        id: STREAK_3,
        title: "Consistency is Key",
        description: "Reached a 3-day streak",
        icon: "✨",
    },
    Badge {
        id: STREAK_7,
        title: "Week Warrior",
        description: "Reached a 7-day streak",
        icon: "🔥",
    },
    Badge {
        id: STREAK_30,
        title: "Unstoppable",
        description: "Reached a 30-day streak",
        icon: "🚀",
    },
    Badge {
        id: XP_100,
        title: "Novice",
        description: "Earned 100 XP",
        icon: "🥉",
    },
    Badge {
        id: XP_500,
        title: "Apprentice",
        description: "Earned 500 XP",
        icon: "🥈",
    },
    Badge {
        id: XP_1000,
        title: "Master",
        description: "Earned 1000 XP",
        icon: "🥇",
    },
    Badge {
        id: HARD_WORKER,
        title: "Hard Worker",
        description: "Completed a Hard difficulty habit",
        icon: "💪",
    },
];

pub fn find_badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

/// Persisted XP and unlocked badges for one user. Level is derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationState {
    #[serde(default)]
    pub xp: u64,
    /// Unlock order is preserved; ids are never removed except by an explicit reset.
    #[serde(default)]
    pub badges: Vec<String>,
}

impl GamificationState {
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b == id)
    }
}
