//! Flashcard progress map together with review-session history.
//!
//! This is the value persisted under the flashcard-progress key. It owns every
//! `CardProgress` record and is the only place records are replaced or removed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};

use super::sm2;
use super::{CardProgress, Flashcard, MasteryLevel, Quality, ReviewSession};
use crate::error::Result;

/// Counts of reviewed cards per mastery level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlashcardStatistics {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub mastered: usize,
    pub due_today: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardProgressStore {
    #[serde(default, deserialize_with = "deserialize_progress")]
    progress: BTreeMap<String, CardProgress>,
    #[serde(default)]
    sessions: Vec<ReviewSession>,
    #[serde(default)]
    current_session: Option<ReviewSession>,
}

/// Stored and imported records pass through `CardProgress::normalized`.
fn deserialize_progress<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, CardProgress>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, CardProgress>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(card_id, progress)| {
            let fixed = progress.clone().normalized();
            if fixed != progress {
                warn!("Corrected inconsistent progress record for card {}", card_id);
            }
            (card_id, fixed)
        })
        .collect())
}

impl FlashcardProgressStore {
    pub fn progress(&self, card_id: &str) -> Option<&CardProgress> {
        self.progress.get(card_id)
    }

    pub fn all_progress(&self) -> &BTreeMap<String, CardProgress> {
        &self.progress
    }

    pub fn sessions(&self) -> &[ReviewSession] {
        &self.sessions
    }

    pub fn current_session(&self) -> Option<&ReviewSession> {
        self.current_session.as_ref()
    }

    /// Validates the grade, then replaces the card's record with the scheduled one.
    pub fn record_review(
        &mut self,
        card_id: &str,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<&CardProgress> {
        let quality = Quality::try_from(quality)?;
        let next = sm2::record_review(self.progress.get(card_id), card_id, quality, now);

        if let Some(session) = self.current_session.as_mut() {
            session.flashcards_reviewed += 1;
            session.correct_count += u32::from(quality.is_correct());
        }

        self.progress.insert(card_id.to_string(), next);
        Ok(&self.progress[card_id])
    }

    pub fn due_cards<'a>(&self, candidates: &'a [Flashcard], now: DateTime<Utc>) -> Vec<&'a Flashcard> {
        sm2::select_due(candidates, &self.progress, now)
    }

    pub fn start_session(&mut self, topic_ids: Vec<String>, now: DateTime<Utc>) {
        if self.current_session.is_some() {
            warn!("Starting a review session while another is open; closing the old one");
            self.end_session(now);
        }
        let session = ReviewSession::new(topic_ids, now);
        info!("Review session {} started", session.id);
        self.current_session = Some(session);
    }

    pub fn end_session(&mut self, now: DateTime<Utc>) {
        if let Some(mut session) = self.current_session.take() {
            session.end_time = Some(now);
            info!(
                "Review session {} ended: {}/{} correct",
                session.id, session.correct_count, session.flashcards_reviewed
            );
            self.sessions.push(session);
        }
    }

    /// Removes one card's record; the card becomes new again.
    pub fn reset_one(&mut self, card_id: &str) {
        if self.progress.remove(card_id).is_some() {
            info!("Reset progress for card {}", card_id);
        }
    }

    /// Clears every record, the session history and any in-flight session.
    pub fn reset_all(&mut self) {
        info!("Reset all flashcard progress ({} records)", self.progress.len());
        self.progress.clear();
        self.sessions.clear();
        self.current_session = None;
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> FlashcardStatistics {
        let mut stats = FlashcardStatistics {
            total: self.progress.len(),
            ..Default::default()
        };
        for p in self.progress.values() {
            match p.mastery_level() {
                MasteryLevel::New => stats.new += 1,
                MasteryLevel::Learning => stats.learning += 1,
                MasteryLevel::Review => stats.review += 1,
                MasteryLevel::Mastered => stats.mastered += 1,
            }
            if p.is_due(now) {
                stats.due_today += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudyError;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 20, 12, 0, 0).unwrap()
    }

    fn card(id: &str) -> Flashcard {
        Flashcard {
            id: id.to_string(),
            topic_id: "npv-decision-rule".to_string(),
            front: String::new(),
            back: String::new(),
        }
    }

    #[test]
    fn test_record_review_creates_and_replaces() {
        let mut store = FlashcardProgressStore::default();
        store.record_review("fc019", 5, now()).unwrap();
        let p = store.record_review("fc019", 4, now()).unwrap();

        assert_eq!(p.total_reviews(), 2);
        assert_eq!(p.interval(), 6);
        assert_eq!(store.all_progress().len(), 1);
    }

    #[test]
    fn test_deserialize_corrects_tampered_record() {
        let json = r#"{
            "progress": {
                "fc019": {
                    "flashcardId": "fc019",
                    "lastReviewed": "2026-04-19T12:00:00Z",
                    "nextReview": "2026-04-20T12:00:00Z",
                    "easeFactor": 9.0,
                    "interval": 1,
                    "repetitions": 0,
                    "masteryLevel": "mastered",
                    "correctStreak": 0,
                    "totalReviews": 0,
                    "correctReviews": 7
                }
            }
        }"#;

        let store: FlashcardProgressStore = serde_json::from_str(json).unwrap();
        let p = store.progress("fc019").unwrap();
        assert_eq!(p.ease_factor(), 2.5);
        assert_eq!(p.mastery_level(), MasteryLevel::New);
        assert_eq!(p.correct_reviews(), 0);
        assert_eq!(store.statistics(now()).mastered, 0);
    }

    #[test]
    fn test_invalid_grade_rejected_before_mutation() {
        let mut store = FlashcardProgressStore::default();
        store.start_session(Vec::new(), now());

        let err = store.record_review("fc019", 6, now()).unwrap_err();
        assert!(matches!(err, StudyError::InvalidGrade(6)));
        assert!(store.progress("fc019").is_none());
        assert_eq!(store.current_session().map(|s| s.flashcards_reviewed), Some(0));
    }

    #[test]
    fn test_session_counters() {
        let mut store = FlashcardProgressStore::default();
        store.start_session(vec!["npv-decision-rule".to_string()], now());
        store.record_review("fc019", 5, now()).unwrap();
        store.record_review("fc020", 0, now()).unwrap();
        store.end_session(now() + Duration::minutes(5));

        assert!(store.current_session().is_none());
        let session = &store.sessions()[0];
        assert_eq!(session.flashcards_reviewed, 2);
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.end_time, Some(now() + Duration::minutes(5)));
    }

    #[test]
    fn test_end_session_without_open_session_is_noop() {
        let mut store = FlashcardProgressStore::default();
        store.end_session(now());
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_resets() {
        let mut store = FlashcardProgressStore::default();
        store.record_review("fc001", 5, now()).unwrap();
        store.record_review("fc002", 5, now()).unwrap();
        store.start_session(Vec::new(), now());

        store.reset_one("fc001");
        assert!(store.progress("fc001").is_none());
        assert!(store.progress("fc002").is_some());

        store.reset_all();
        assert!(store.all_progress().is_empty());
        assert!(store.current_session().is_none());
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_due_cards_after_reset() {
        let mut store = FlashcardProgressStore::default();
        let cards = vec![card("fc001")];
        store.record_review("fc001", 5, now()).unwrap();
        assert!(store.due_cards(&cards, now()).is_empty());

        store.reset_one("fc001");
        assert_eq!(store.due_cards(&cards, now()).len(), 1);
    }

    #[test]
    fn test_statistics() {
        let mut store = FlashcardProgressStore::default();
        store.record_review("fc001", 5, now()).unwrap();
        store.record_review("fc002", 0, now()).unwrap();
        for _ in 0..3 {
            store.record_review("fc003", 5, now()).unwrap();
        }

        let stats = store.statistics(now());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.learning, 1);
        assert_eq!(stats.review, 1);
        assert_eq!(stats.mastered, 0);
        assert_eq!(stats.due_today, 1);
    }
}
