pub mod analytics;
pub mod coach;
pub mod ledger;
pub mod reminders;
pub mod streak;

pub use coach::{advise, Advice, CoachInput};
pub use ledger::{progress, LevelProgress, XpAward};
pub use reminders::ReminderState;
