use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            kind,
            is_read: false,
            timestamp: Utc::now(),
        }
    }

    /// Id prefix shown in listings. Ids read from storage need not be ASCII.
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(8)
            .map_or(self.id.as_str(), |(end, _)| &self.id[..end])
    }
}

/// Oldest entries are dropped once the inbox holds this many.
pub const MAX_NOTIFICATIONS: usize = 200;

/// Newest-first inbox of notifications for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationLog {
    #[serde(default)]
    pub items: Vec<Notification>,
}

impl NotificationLog {
    pub fn push(&mut self, notification: Notification) {
        log::debug!("notification: {} ({})", notification.title, notification.kind.as_str());
        self.items.insert(0, notification);
        self.items.truncate(MAX_NOTIFICATIONS);
    }

    pub fn add(&mut self, title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) {
        self.push(Notification::new(title, message, kind));
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Marks the notification whose id starts with `id` as read.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id.starts_with(id)) {
            Some(n) => {
                n.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for n in &mut self.items {
            n.is_read = true;
        }
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_unread_tracking() {
        let mut inbox = NotificationLog::default();
        inbox.add("One", "first", NotificationKind::Info);
        inbox.add("Two", "second", NotificationKind::Success);
        assert_eq!(inbox.items[0].title, "Two");
        assert_eq!(inbox.unread_count(), 2);

        let id = inbox.items[1].id.clone();
        assert!(inbox.mark_as_read(&id[..8]));
        assert_eq!(inbox.unread_count(), 1);
        assert!(!inbox.mark_as_read("no-such-id"));

        inbox.mark_all_as_read();
        assert_eq!(inbox.unread_count(), 0);
        inbox.clear_all();
        assert!(inbox.items.is_empty());
    }

    #[test]
    fn inbox_is_capped_and_drops_the_oldest() {
        let mut inbox = NotificationLog::default();
        for i in 0..MAX_NOTIFICATIONS + 5 {
            inbox.add(format!("n{}", i), "", NotificationKind::Info);
        }
        assert_eq!(inbox.items.len(), MAX_NOTIFICATIONS);
        assert_eq!(inbox.items[0].title, format!("n{}", MAX_NOTIFICATIONS + 4));
        assert_eq!(inbox.items.last().unwrap().title, "n5");
    }

    #[test]
    fn short_id_respects_char_boundaries() {
        let mut n = Notification::new("t", "m", NotificationKind::Info);
        assert_eq!(n.short_id().len(), 8);
        n.id = "ééééééééé".to_string();
        assert_eq!(n.short_id(), "éééééééé");
        n.id = "abc".to_string();
        assert_eq!(n.short_id(), "abc");
    }

    #[test]
    fn kind_serializes_under_type_key() {
        let n = Notification::new("Level Up!", "Level 2", NotificationKind::Success);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "success");
        assert_eq!(json["isRead"], false);
    }
}
