use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::payload::{self, PayloadError};
use crate::engine::ReminderState;
use crate::models::{GamificationState, Habit, NotificationLog};

// ─── Raw snapshots ───────────────────────────────────────────────────────────

pub struct SnapshotRepo;

impl SnapshotRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM snapshots WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    /// Overwrites the whole snapshot; last write wins.
    pub fn put(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO snapshots (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM snapshots WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn keys_with_prefix(conn: &Connection, prefix: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT key FROM snapshots WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

/// Storage keys for one user namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    email: String,
}

impl Namespace {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.trim().to_lowercase(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn habits_key(&self) -> String {
        format!("habits_{}", self.email)
    }

    pub fn gamification_key(&self) -> String {
        format!("habit_gamification_{}", self.email)
    }

    pub fn notifications_key(&self) -> String {
        format!("notifications_{}", self.email)
    }

    pub fn reminders_key(&self) -> String {
        format!("reminders_{}", self.email)
    }
}

/// Decode a stored payload, treating corruption as an empty state.
///
/// A payload from a newer schema is an error: resetting it would let the
/// next save overwrite data this build cannot read.
fn load_or_reset<T: Default>(
    conn: &Connection,
    key: &str,
    decode: impl Fn(&str) -> Result<T, PayloadError>,
) -> Result<Option<T>> {
    let Some(raw) = SnapshotRepo::get(conn, key)? else {
        return Ok(None);
    };
    match decode(&raw) {
        Ok(v) => Ok(Some(v)),
        Err(e @ PayloadError::UnsupportedVersion { .. }) => Err(anyhow::Error::new(e)
            .context(format!("Snapshot '{}' was written by a newer kaizen; upgrade to read it", key))),
        Err(e) => {
            log::error!("snapshot '{}' is unreadable, resetting: {}", key, e);
            Ok(Some(T::default()))
        }
    }
}

// ─── Typed repos ─────────────────────────────────────────────────────────────

pub struct HabitRepo;

impl HabitRepo {
    /// `None` when nothing was ever saved for this namespace.
    pub fn load(conn: &Connection, ns: &Namespace) -> Result<Option<Vec<Habit>>> {
        load_or_reset(conn, &ns.habits_key(), payload::decode_habits)
    }

    pub fn save(conn: &Connection, ns: &Namespace, habits: &[Habit]) -> Result<()> {
        let raw = payload::encode_habits(habits).context("Encoding habits")?;
        SnapshotRepo::put(conn, &ns.habits_key(), &raw)
    }
}

pub struct GamificationRepo;

impl GamificationRepo {
    pub fn load(conn: &Connection, ns: &Namespace) -> Result<GamificationState> {
        Ok(load_or_reset(conn, &ns.gamification_key(), payload::decode_gamification)?
            .unwrap_or_default())
    }

    pub fn save(conn: &Connection, ns: &Namespace, state: &GamificationState) -> Result<()> {
        let raw = payload::encode_gamification(state).context("Encoding gamification state")?;
        SnapshotRepo::put(conn, &ns.gamification_key(), &raw)
    }
}

pub struct NotificationRepo;

impl NotificationRepo {
    pub fn load(conn: &Connection, ns: &Namespace) -> Result<NotificationLog> {
        Ok(load_or_reset(conn, &ns.notifications_key(), payload::decode_notifications)?
            .unwrap_or_default())
    }

    pub fn save(conn: &Connection, ns: &Namespace, log: &NotificationLog) -> Result<()> {
        let raw = payload::encode_notifications(log).context("Encoding notifications")?;
        SnapshotRepo::put(conn, &ns.notifications_key(), &raw)
    }
}

pub struct ReminderRepo;

impl ReminderRepo {
    pub fn load(conn: &Connection, ns: &Namespace) -> Result<ReminderState> {
        Ok(load_or_reset(conn, &ns.reminders_key(), payload::decode_reminders)?
            .unwrap_or_default())
    }

    pub fn save(conn: &Connection, ns: &Namespace, state: &ReminderState) -> Result<()> {
        let raw = payload::encode_reminders(state).context("Encoding reminder state")?;
        SnapshotRepo::put(conn, &ns.reminders_key(), &raw)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::Difficulty;

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn namespace_keys_are_per_user() {
        let ns = Namespace::new("  Ada@Example.com ");
        assert_eq!(ns.email(), "ada@example.com");
        assert_eq!(ns.habits_key(), "habits_ada@example.com");
        assert_eq!(ns.gamification_key(), "habit_gamification_ada@example.com");
    }

    #[test]
    fn habits_missing_then_saved_then_loaded() {
        let conn = db();
        let ns = Namespace::new("a@b.c");
        assert!(HabitRepo::load(&conn, &ns).unwrap().is_none());

        let habits = vec![Habit::new("Run", "Health", Difficulty::Hard)];
        HabitRepo::save(&conn, &ns, &habits).unwrap();
        assert_eq!(HabitRepo::load(&conn, &ns).unwrap(), Some(habits));

        let other = Namespace::new("x@y.z");
        assert!(HabitRepo::load(&conn, &other).unwrap().is_none());
    }

    #[test]
    fn corrupt_snapshots_reset_to_empty() {
        let conn = db();
        let ns = Namespace::new("a@b.c");
        SnapshotRepo::put(&conn, &ns.habits_key(), "{{{{").unwrap();
        SnapshotRepo::put(&conn, &ns.gamification_key(), "nope").unwrap();

        assert_eq!(HabitRepo::load(&conn, &ns).unwrap(), Some(vec![]));
        assert_eq!(GamificationRepo::load(&conn, &ns).unwrap(), GamificationState::default());
    }

    #[test]
    fn newer_snapshots_refuse_to_load_and_stay_intact() {
        let conn = db();
        let ns = Namespace::new("a@b.c");
        let newer = r#"{"schemaVersion":2,"habits":[{"id":"1","title":"Run"}]}"#;
        SnapshotRepo::put(&conn, &ns.habits_key(), newer).unwrap();
        SnapshotRepo::put(&conn, &ns.gamification_key(), r#"{"schemaVersion":9,"xp":5}"#).unwrap();

        let err = HabitRepo::load(&conn, &ns).unwrap_err();
        assert!(format!("{:#}", err).contains("newer"));
        assert!(GamificationRepo::load(&conn, &ns).is_err());
        assert_eq!(SnapshotRepo::get(&conn, &ns.habits_key()).unwrap().as_deref(), Some(newer));
    }

    #[test]
    fn legacy_snapshots_are_migrated_on_load() {
        let conn = db();
        let ns = Namespace::new("a@b.c");
        SnapshotRepo::put(
            &conn,
            &ns.habits_key(),
            r#"[{"id":"1","title":"Run","category":"Health","completedDates":["2024-01-01"]}]"#,
        )
        .unwrap();
        SnapshotRepo::put(&conn, &ns.gamification_key(), r#"{"xp":30,"badges":["first_step"]}"#)
            .unwrap();

        let habits = HabitRepo::load(&conn, &ns).unwrap().unwrap();
        assert_eq!(habits[0].difficulty, Difficulty::Medium);
        let g = GamificationRepo::load(&conn, &ns).unwrap();
        assert_eq!(g.xp, 30);
    }

    #[test]
    fn snapshot_overwrite_and_prefix_listing() {
        let conn = db();
        SnapshotRepo::put(&conn, "habits_a", "1").unwrap();
        SnapshotRepo::put(&conn, "habits_a", "2").unwrap();
        SnapshotRepo::put(&conn, "habits_b", "3").unwrap();
        SnapshotRepo::put(&conn, "habitsXc", "4").unwrap();
        SnapshotRepo::put(&conn, "habit_gamification_a", "5").unwrap();
        assert_eq!(SnapshotRepo::get(&conn, "habits_a").unwrap().as_deref(), Some("2"));
        assert_eq!(
            SnapshotRepo::keys_with_prefix(&conn, "habits_").unwrap(),
            vec!["habits_a".to_string(), "habits_b".to_string()]
        );
        SnapshotRepo::delete(&conn, "habits_a").unwrap();
        assert!(SnapshotRepo::get(&conn, "habits_a").unwrap().is_none());
    }

    #[test]
    fn meta_round_trip() {
        let conn = db();
        assert!(MetaRepo::get(&conn, "last_user").unwrap().is_none());
        MetaRepo::set(&conn, "last_user", "a@b.c").unwrap();
        MetaRepo::set(&conn, "last_user", "x@y.z").unwrap();
        assert_eq!(MetaRepo::get(&conn, "last_user").unwrap().as_deref(), Some("x@y.z"));
    }
}
