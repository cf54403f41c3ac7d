//! Persistent key-value store for learner progress
//!
//! Progress is stored as JSON documents in a single SQLite `app_state` table.
//! Two logical keys hold the flashcard store and the topic store; a third holds
//! the simulated current date used to step through scheduling day by day.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::models::{FlashcardProgressStore, TopicProgressStore};

pub const FLASHCARD_PROGRESS_KEY: &str = "flashcard-progress";
pub const TOPIC_PROGRESS_KEY: &str = "finance-exam-progress";
pub const CURRENT_DATE_KEY: &str = "current-date";

/// Load/save of opaque JSON values by key. Failures are surfaced unchanged.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Value>>;
    fn save(&self, key: &str, value: &Value) -> Result<()>;
}

impl KeyValueStore for Connection {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, text],
        )?;
        debug!("[DB] Saved {} ({} bytes)", key, text.len());
        Ok(())
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    // Initialize current date if not exists
    let now = serde_json::to_string(&Utc::now())?;
    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES (?1, ?2)",
        params![CURRENT_DATE_KEY, now],
    )?;
    Ok(())
}

/// Opens (or creates) the SQLite database at `path` and ensures the schema exists.
pub fn init_database(path: &Path) -> Result<Connection> {
    info!("Opening progress database at {:?}", path);
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

pub fn init_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn load_typed<T: DeserializeOwned + Default>(store: &impl KeyValueStore, key: &str) -> Result<T> {
    match store.load(key)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}

fn save_typed<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    store.save(key, &serde_json::to_value(value)?)
}

/// Absent key yields an empty store.
pub fn load_flashcard_store(store: &impl KeyValueStore) -> Result<FlashcardProgressStore> {
    load_typed(store, FLASHCARD_PROGRESS_KEY)
}

pub fn save_flashcard_store(
    store: &impl KeyValueStore,
    flashcards: &FlashcardProgressStore,
) -> Result<()> {
    save_typed(store, FLASHCARD_PROGRESS_KEY, flashcards)
}

pub fn load_topic_store(store: &impl KeyValueStore) -> Result<TopicProgressStore> {
    load_typed(store, TOPIC_PROGRESS_KEY)
}

pub fn save_topic_store(store: &impl KeyValueStore, topics: &TopicProgressStore) -> Result<()> {
    save_typed(store, TOPIC_PROGRESS_KEY, topics)
}

/// Retrieves the simulated current date, falling back to the real clock.
pub fn get_current_date(store: &impl KeyValueStore) -> Result<DateTime<Utc>> {
    match store.load(CURRENT_DATE_KEY)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(Utc::now()),
    }
}

/// Advances the simulated date by 24 hours (for stepping through review intervals)
pub fn advance_day(store: &impl KeyValueStore) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(store)? + Duration::days(1);
    store.save(CURRENT_DATE_KEY, &serde_json::to_value(next_day)?)?;
    info!("Simulated date advanced to {}", next_day.format("%Y-%m-%d"));
    Ok(next_day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_load_missing_key() {
        let conn = init_in_memory().unwrap();
        assert!(conn.load("nothing-here").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_replaces_value() {
        let conn = init_in_memory().unwrap();
        conn.save("k", &json!({"a": 1})).unwrap();
        conn.save("k", &json!({"a": 2})).unwrap();
        assert_eq!(conn.load("k").unwrap(), Some(json!({"a": 2})));
    }

    #[test]
    fn test_empty_stores_when_nothing_saved() {
        let conn = init_in_memory().unwrap();
        assert_eq!(load_flashcard_store(&conn).unwrap(), FlashcardProgressStore::default());
        assert_eq!(load_topic_store(&conn).unwrap(), TopicProgressStore::default());
    }

    #[test]
    fn test_flashcard_store_round_trips() {
        let conn = init_in_memory().unwrap();
        let mut flashcards = FlashcardProgressStore::default();
        flashcards.start_session(vec!["bond-basics".to_string()], date());
        flashcards.record_review("fc025", 4, date()).unwrap();
        flashcards.record_review("fc025", 5, date()).unwrap();
        flashcards.record_review("fc026", 1, date()).unwrap();

        save_flashcard_store(&conn, &flashcards).unwrap();
        let loaded = load_flashcard_store(&conn).unwrap();
        assert_eq!(loaded, flashcards);

        let raw = conn.load(FLASHCARD_PROGRESS_KEY).unwrap().unwrap();
        assert_eq!(raw["progress"]["fc025"]["nextReview"], "2026-09-07T08:00:00Z");
        assert_eq!(raw["currentSession"]["flashcardsReviewed"], 3);
    }

    #[test]
    fn test_topic_store_round_trips() {
        let conn = init_in_memory().unwrap();
        let mut topics = TopicProgressStore::default();
        topics.update_practice_score("bond-yields", 55, date()).unwrap();
        topics.add_unlock_override("growth-analysis");

        save_topic_store(&conn, &topics).unwrap();
        assert_eq!(load_topic_store(&conn).unwrap(), topics);
    }

    #[test]
    fn test_corrupt_value_is_serialization_error() {
        let conn = init_in_memory().unwrap();
        conn.save(TOPIC_PROGRESS_KEY, &json!({"completedTopics": 5})).unwrap();
        let err = load_topic_store(&conn).unwrap_err();
        assert!(matches!(err, crate::error::StudyError::Serialization(_)));
    }

    #[test]
    fn test_advance_day() {
        let conn = init_in_memory().unwrap();
        conn.save(CURRENT_DATE_KEY, &serde_json::to_value(date()).unwrap()).unwrap();

        let next = advance_day(&conn).unwrap();
        assert_eq!(next, date() + Duration::days(1));
        assert_eq!(get_current_date(&conn).unwrap(), next);
    }
}
