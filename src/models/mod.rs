pub mod gamification;
pub mod habit;
pub mod notification;
pub mod stats;

pub use gamification::{Badge, GamificationState};
pub use habit::{Difficulty, Habit, HabitStatus};
pub use notification::{Notification, NotificationKind, NotificationLog};
pub use stats::{DailyStats, HeatmapCell, Overview, Streak, WeeklyGrid};
