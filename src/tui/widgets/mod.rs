pub mod coach;
pub mod habits;
pub mod header;
pub mod heatmap;
pub mod level;
pub mod notifications;
pub mod statusbar;
pub mod streak;
