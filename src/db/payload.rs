//! Versioned JSON payloads stored in the `snapshots` table.
//!
//! Every payload is an object carrying `schemaVersion`. Payloads written before
//! versioning existed (a bare habit array, a bare `{xp, badges}` object) are
//! version 0 and are upgraded one step at a time by the `v0_to_v1` functions.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::engine::ReminderState;
use crate::models::habit::{parse_reminder, DATE_FORMAT};
use crate::models::notification::MAX_NOTIFICATIONS;
use crate::models::{GamificationState, Habit, NotificationLog};

pub const HABITS_VERSION: u64 = 1;
pub const GAMIFICATION_VERSION: u64 = 1;
pub const NOTIFICATIONS_VERSION: u64 = 1;
pub const REMINDERS_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u64 },

    #[error("unexpected payload shape: {0}")]
    Shape(&'static str),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HabitsEnvelope {
    schema_version: u64,
    habits: Vec<Habit>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GamificationEnvelope {
    schema_version: u64,
    #[serde(flatten)]
    state: GamificationState,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationsEnvelope {
    schema_version: u64,
    #[serde(flatten)]
    log: NotificationLog,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemindersEnvelope {
    schema_version: u64,
    #[serde(flatten)]
    state: ReminderState,
}

fn stored_version(value: &Value) -> u64 {
    value
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn check_supported(found: u64, supported: u64) -> Result<(), PayloadError> {
    if found > supported {
        return Err(PayloadError::UnsupportedVersion { found, supported });
    }
    Ok(())
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn encode_habits(habits: &[Habit]) -> Result<String, PayloadError> {
    let envelope = HabitsEnvelope {
        schema_version: HABITS_VERSION,
        habits: habits.to_vec(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode_habits(raw: &str) -> Result<Vec<Habit>, PayloadError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let version = if value.is_array() { 0 } else { stored_version(&value) };
    check_supported(version, HABITS_VERSION)?;

    if version < 1 {
        value = habits_v0_to_v1(value)?;
    }

    let envelope: HabitsEnvelope = serde_json::from_value(value)?;
    Ok(envelope.habits)
}

fn is_valid_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

/// Bare habit array → versioned envelope, filling fields older builds did not write.
fn habits_v0_to_v1(value: Value) -> Result<Value, PayloadError> {
    let Value::Array(items) = value else {
        return Err(PayloadError::Shape("version 0 habits must be an array"));
    };

    let now = Utc::now().to_rfc3339();
    let mut habits = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(mut h) = item else {
            log::warn!("dropping non-object habit entry during migration");
            continue;
        };
        if !h.get("id").is_some_and(Value::is_string) || !h.get("title").is_some_and(Value::is_string) {
            log::warn!("dropping habit without id/title during migration");
            continue;
        }

        let dates: Vec<Value> = h
            .get("completedDates")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter(|d| d.as_str().is_some_and(is_valid_date))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        h.insert("completedDates".into(), Value::Array(dates));

        let reminders: Vec<Value> = h
            .get("reminders")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(|r| r.as_str().and_then(|s| parse_reminder(s).ok()))
                    .map(Value::String)
                    .collect()
            })
            .unwrap_or_default();
        h.insert("reminders".into(), Value::Array(reminders));

        let notes: Map<String, Value> = h
            .get("notes")
            .and_then(Value::as_object)
            .map(|m| {
                m.iter()
                    .filter(|(k, v)| is_valid_date(k) && v.is_string())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        h.insert("notes".into(), Value::Object(notes));

        fill_default(&mut h, "category", json!("General"), Value::is_string);
        fill_default(&mut h, "difficulty", json!("medium"), |v| {
            matches!(v.as_str(), Some("easy" | "medium" | "hard"))
        });
        fill_default(&mut h, "streakFreeze", json!(0), Value::is_u64);
        fill_default(&mut h, "streak", json!(0), Value::is_u64);
        fill_default(&mut h, "goal", json!(1), Value::is_u64);
        fill_default(&mut h, "archived", json!(false), Value::is_boolean);
        fill_default(&mut h, "createdAt", json!(now), Value::is_string);
        if h.get("emoji").is_some_and(|v| !v.is_string()) {
            h.remove("emoji");
        }

        habits.push(Value::Object(h));
    }

    Ok(json!({ "schemaVersion": 1, "habits": habits }))
}

fn fill_default(h: &mut Map<String, Value>, key: &str, default: Value, valid: impl Fn(&Value) -> bool) {
    if !h.get(key).is_some_and(&valid) {
        h.insert(key.to_string(), default);
    }
}

// ─── Gamification ────────────────────────────────────────────────────────────

pub fn encode_gamification(state: &GamificationState) -> Result<String, PayloadError> {
    let envelope = GamificationEnvelope {
        schema_version: GAMIFICATION_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode_gamification(raw: &str) -> Result<GamificationState, PayloadError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let version = stored_version(&value);
    check_supported(version, GAMIFICATION_VERSION)?;

    if version < 1 {
        value = gamification_v0_to_v1(value)?;
    }

    let envelope: GamificationEnvelope = serde_json::from_value(value)?;
    Ok(envelope.state)
}

/// `{xp, badges}` with loose types → versioned envelope with a whole, non-negative XP.
fn gamification_v0_to_v1(value: Value) -> Result<Value, PayloadError> {
    let Value::Object(obj) = value else {
        return Err(PayloadError::Shape("version 0 gamification must be an object"));
    };

    let xp = obj
        .get("xp")
        .and_then(Value::as_f64)
        .filter(|x| x.is_finite() && *x > 0.0)
        .map(|x| x.floor() as u64)
        .unwrap_or(0);

    let mut badges: Vec<String> = Vec::new();
    if let Some(list) = obj.get("badges").and_then(Value::as_array) {
        for b in list.iter().filter_map(Value::as_str) {
            if !badges.iter().any(|x| x == b) {
                badges.push(b.to_string());
            }
        }
    }

    Ok(json!({ "schemaVersion": 1, "xp": xp, "badges": badges }))
}

// ─── Notifications & reminder state ─────────────────────────────────────────

pub fn encode_notifications(log: &NotificationLog) -> Result<String, PayloadError> {
    let envelope = NotificationsEnvelope {
        schema_version: NOTIFICATIONS_VERSION,
        log: log.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode_notifications(raw: &str) -> Result<NotificationLog, PayloadError> {
    let value: Value = serde_json::from_str(raw)?;
    check_supported(stored_version(&value), NOTIFICATIONS_VERSION)?;
    let mut envelope: NotificationsEnvelope = serde_json::from_value(value)?;
    envelope.log.items.truncate(MAX_NOTIFICATIONS);
    Ok(envelope.log)
}

pub fn encode_reminders(state: &ReminderState) -> Result<String, PayloadError> {
    let envelope = RemindersEnvelope {
        schema_version: REMINDERS_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode_reminders(raw: &str) -> Result<ReminderState, PayloadError> {
    let value: Value = serde_json::from_str(raw)?;
    check_supported(stored_version(&value), REMINDERS_VERSION)?;
    let envelope: RemindersEnvelope = serde_json::from_value(value)?;
    Ok(envelope.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[test]
    fn legacy_habit_array_gets_defaults() {
        let raw = r#"[
            {"id": "1", "title": "Morning Run", "category": "Health",
             "completedDates": ["2024-01-01", "not-a-date", "2024-01-02"],
             "streak": 2, "goal": 1},
            {"id": "2", "title": "Read", "completedDates": [],
             "difficulty": "extreme", "reminders": ["7:30", "bogus"],
             "notes": {"2024-01-01": "good", "yesterday": "lost"}},
            "garbage",
            {"title": "No id"}
        ]"#;

        let habits = decode_habits(raw).unwrap();
        assert_eq!(habits.len(), 2);

        let run = &habits[0];
        assert_eq!(run.completed_dates.len(), 2);
        assert_eq!(run.difficulty, Difficulty::Medium);
        assert_eq!(run.streak_freeze, 0);
        assert!(!run.archived);
        assert!(run.notes.is_empty());

        let read = &habits[1];
        assert_eq!(read.category, "General");
        assert_eq!(read.difficulty, Difficulty::Medium);
        assert_eq!(read.reminders, vec!["07:30".to_string()]);
        assert_eq!(read.notes.len(), 1);
    }

    #[test]
    fn current_habits_round_trip_through_envelope() {
        let mut h = Habit::new("Stretch", "Body", Difficulty::Hard);
        h.reminders.push("06:45".into());
        let raw = encode_habits(&[h.clone()]).unwrap();
        assert!(raw.contains("\"schemaVersion\":1"));
        assert_eq!(decode_habits(&raw).unwrap(), vec![h]);
    }

    #[test]
    fn rejects_future_and_malformed_payloads() {
        assert!(matches!(
            decode_habits(r#"{"schemaVersion": 9, "habits": []}"#),
            Err(PayloadError::UnsupportedVersion { found: 9, .. })
        ));
        assert!(matches!(decode_habits("{not json"), Err(PayloadError::Json(_))));
        assert!(matches!(decode_gamification("[1,2]"), Err(PayloadError::Shape(_))));
    }

    #[test]
    fn legacy_gamification_is_normalised() {
        let state = decode_gamification(r#"{"xp": 42.7, "badges": ["first_step", "first_step", 3]}"#)
            .unwrap();
        assert_eq!(state.xp, 42);
        assert_eq!(state.badges, vec!["first_step".to_string()]);

        let negative = decode_gamification(r#"{"xp": -5}"#).unwrap();
        assert_eq!(negative, GamificationState::default());
    }

    #[test]
    fn gamification_envelope_is_flat() {
        let state = GamificationState {
            xp: 120,
            badges: vec!["xp_100".into()],
        };
        let raw = encode_gamification(&state).unwrap();
        let v: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["xp"], 120);
        assert_eq!(v["schemaVersion"], 1);
        assert_eq!(decode_gamification(&raw).unwrap(), state);
    }
}
