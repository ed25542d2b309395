use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kaizen", version, author, about = "A calm terminal companion for building daily habits")]
pub struct Cli {
    /// Storage namespace (email) to use instead of the configured profile
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new habit
    Add {
        /// Habit title
        title: String,
        #[arg(long, short, default_value = "General")]
        category: String,
        /// easy, medium or hard
        #[arg(long, short, default_value = "medium")]
        difficulty: String,
        /// Reminder time (HH:MM, 24h); repeatable
        #[arg(long = "remind", short = 'r')]
        reminders: Vec<String>,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// List habits with today's status
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Toggle a habit's completion (today unless --date is given)
    Done {
        /// Habit position, title or id prefix
        habit: String,
        /// Date to toggle (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Edit a habit
    Edit {
        habit: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        /// Replace reminder times; repeatable
        #[arg(long = "remind")]
        reminders: Vec<String>,
        /// Remove all reminders
        #[arg(long, conflicts_with = "reminders")]
        clear_reminders: bool,
        /// Number of streak freezes available
        #[arg(long)]
        freezes: Option<u32>,
        /// Daily goal
        #[arg(long)]
        goal: Option<u32>,
        /// Emoji; pass an empty string to remove it
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Attach a note to a day (empty text removes it)
    Note {
        habit: String,
        text: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Archive a habit (hidden from lists, coach and stats)
    Archive {
        habit: String,
        /// Restore an archived habit
        #[arg(long)]
        undo: bool,
    },
    /// Delete a habit permanently
    Delete { habit: String },
    /// Move a habit to a new position (1-based)
    Move { habit: String, position: usize },
    /// Set the full habit order; every habit must be named exactly once
    Reorder {
        /// Habits in their new order (positions, titles or id prefixes)
        #[arg(required = true)]
        habits: Vec<String>,
    },
    /// Show statistics
    Stats {
        /// Show the daily trend for the last week
        #[arg(long)]
        week: bool,
    },
    /// Year-long completion heatmap
    Heatmap,
    /// Ask the coach for today's advice
    Coach,
    /// Show level and XP progress
    Level,
    /// Show unlocked and locked badges
    Badges,
    /// Notification inbox
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationCommands>,
    },
    /// Check habit reminders now
    Remind {
        /// Keep checking on the configured interval
        #[arg(long)]
        watch: bool,
    },
    /// Export a weekly text summary to stdout
    Export {
        /// Dump the raw stored snapshots as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// List namespaces that have stored data
    Users,
    /// Reset XP and badges to zero
    ResetXp {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Delete all stored data for the current namespace
    ClearData {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Show the config file location, or write a default one
    Config {
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommands {
    /// Show notifications (default)
    List,
    /// Mark one notification as read
    Read {
        /// Notification id or prefix
        id: String,
    },
    /// Mark everything as read
    ReadAll,
    /// Remove all notifications
    Clear,
}
