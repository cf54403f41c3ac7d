//! Per-topic learn/practice/master progress and topic unlocking.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyError};

pub const MAX_SCORE: u8 = 100;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgress {
    pub learn_completed: bool,
    pub practice_score: u8,
    pub master_score: u8,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_date: Option<DateTime<Utc>>,
}

/// Topic progress map plus the topics the learner chose to unlock early.
/// An entry exists once any of the three update actions has fired for that topic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProgressStore {
    #[serde(default)]
    pub completed_topics: BTreeMap<String, TopicProgress>,
    #[serde(default)]
    pub unlock_override: Vec<String>,
}

fn check_score(score: u8) -> Result<u8> {
    if score > MAX_SCORE {
        return Err(StudyError::InvalidScore(score));
    }
    Ok(score)
}

impl TopicProgressStore {
    pub fn get(&self, topic_id: &str) -> Option<&TopicProgress> {
        self.completed_topics.get(topic_id)
    }

    pub fn mark_learn_complete(&mut self, topic_id: &str, now: DateTime<Utc>) {
        let entry = self.completed_topics.entry(topic_id.to_string()).or_default();
        entry.learn_completed = true;
        entry.last_attempt_date = Some(now);
        info!("Topic {} learn content completed", topic_id);
    }

    /// Overwrites the practice score (not averaged) and counts the attempt.
    pub fn update_practice_score(
        &mut self,
        topic_id: &str,
        score: u8,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let score = check_score(score)?;
        let entry = self.completed_topics.entry(topic_id.to_string()).or_default();
        entry.practice_score = score;
        entry.attempts += 1;
        entry.last_attempt_date = Some(now);
        info!("Topic {} practice score {} (attempt {})", topic_id, score, entry.attempts);
        Ok(())
    }

    pub fn update_master_score(
        &mut self,
        topic_id: &str,
        score: u8,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let score = check_score(score)?;
        let entry = self.completed_topics.entry(topic_id.to_string()).or_default();
        entry.master_score = score;
        entry.attempts += 1;
        entry.last_attempt_date = Some(now);
        info!("Topic {} master score {} (attempt {})", topic_id, score, entry.attempts);
        Ok(())
    }

    pub fn add_unlock_override(&mut self, topic_id: &str) {
        if !self.unlock_override.iter().any(|id| id == topic_id) {
            self.unlock_override.push(topic_id.to_string());
        }
    }

    pub fn remove_unlock_override(&mut self, topic_id: &str) {
        self.unlock_override.retain(|id| id != topic_id);
    }

    /// Unlocked when overridden, when there are no prerequisites,
    /// or when every prerequisite has its learn content completed.
    pub fn is_topic_unlocked(&self, topic_id: &str, prerequisites: &[String]) -> bool {
        if self.unlock_override.iter().any(|id| id == topic_id) {
            return true;
        }
        prerequisites.iter().all(|prereq| {
            self.completed_topics
                .get(prereq)
                .map(|p| p.learn_completed)
                .unwrap_or(false)
        })
    }

    pub fn reset(&mut self) {
        info!("Reset all topic progress");
        self.completed_topics.clear();
        self.unlock_override.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_practice_score_overwrites_and_counts_attempts() {
        let mut store = TopicProgressStore::default();
        store.update_practice_score("liquidity-ratios", 40, now()).unwrap();
        store.update_practice_score("liquidity-ratios", 85, now()).unwrap();
        store.update_master_score("liquidity-ratios", 70, now()).unwrap();

        let p = store.get("liquidity-ratios").unwrap();
        assert_eq!(p.practice_score, 85);
        assert_eq!(p.master_score, 70);
        assert_eq!(p.attempts, 3);
        assert!(!p.learn_completed);
        assert_eq!(p.last_attempt_date, Some(now()));
    }

    #[test]
    fn test_learn_complete_keeps_scores() {
        let mut store = TopicProgressStore::default();
        store.update_practice_score("bond-basics", 60, now()).unwrap();
        store.mark_learn_complete("bond-basics", now());

        let p = store.get("bond-basics").unwrap();
        assert!(p.learn_completed);
        assert_eq!(p.practice_score, 60);
        assert_eq!(p.attempts, 1);
    }

    #[test]
    fn test_score_above_100_rejected() {
        let mut store = TopicProgressStore::default();
        let err = store.update_practice_score("bond-basics", 101, now()).unwrap_err();
        assert!(matches!(err, StudyError::InvalidScore(101)));
        assert!(store.get("bond-basics").is_none());
    }

    #[test]
    fn test_unlocking() {
        let mut store = TopicProgressStore::default();
        let prereqs = vec!["time-value-basics".to_string()];

        assert!(store.is_topic_unlocked("time-value-basics", &[]));
        assert!(!store.is_topic_unlocked("npv-decision-rule", &prereqs));

        // A practice score alone does not unlock dependants
        store.update_practice_score("time-value-basics", 90, now()).unwrap();
        assert!(!store.is_topic_unlocked("npv-decision-rule", &prereqs));

        store.mark_learn_complete("time-value-basics", now());
        assert!(store.is_topic_unlocked("npv-decision-rule", &prereqs));
    }

    #[test]
    fn test_unlock_override() {
        let mut store = TopicProgressStore::default();
        let prereqs = vec!["bond-valuation".to_string()];

        store.add_unlock_override("bond-yields");
        store.add_unlock_override("bond-yields");
        assert_eq!(store.unlock_override.len(), 1);
        assert!(store.is_topic_unlocked("bond-yields", &prereqs));

        store.remove_unlock_override("bond-yields");
        assert!(!store.is_topic_unlocked("bond-yields", &prereqs));
    }

    #[test]
    fn test_reset() {
        let mut store = TopicProgressStore::default();
        store.mark_learn_complete("bond-basics", now());
        store.add_unlock_override("bond-yields");
        store.reset();
        assert_eq!(store, TopicProgressStore::default());
    }
}
