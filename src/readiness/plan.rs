//! Rolling three-day study plan: weak areas first, then unfinished topics.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;

use super::metrics::WeakArea;
use crate::models::{Catalog, Topic, TopicDifficulty, TopicProgress};

pub const PLAN_DAYS: usize = 3;
/// Unfinished topics added after the weak areas.
pub const MAX_INCOMPLETE_TOPICS: usize = 6;
/// A topic with a practice score below this still needs work.
pub const COMPLETE_PRACTICE_SCORE: u8 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTopic {
    pub topic_id: String,
    pub topic_name: String,
    pub time_allocation: u32,
    pub priority: Priority,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanDay {
    pub day: u8,
    pub date: DateTime<Utc>,
    pub topics: Vec<PlannedTopic>,
    pub total_minutes: u32,
}

fn is_incomplete(progress: Option<&TopicProgress>) -> bool {
    match progress {
        None => true,
        Some(p) => !p.learn_completed || p.practice_score < COMPLETE_PRACTICE_SCORE,
    }
}

fn planned(topic: &Topic, priority: Priority) -> PlannedTopic {
    PlannedTopic {
        topic_id: topic.id.clone(),
        topic_name: topic.name.clone(),
        time_allocation: topic.estimated_minutes(),
        priority,
    }
}

/// Weak areas (high priority) followed by up to six incomplete topics in catalog order.
pub fn prioritize(
    topic_progress: &BTreeMap<String, TopicProgress>,
    weak_areas: &[WeakArea],
    catalog: &Catalog,
) -> Vec<PlannedTopic> {
    let is_weak = |id: &str| weak_areas.iter().any(|w| w.topic_id == id);

    let weak = weak_areas
        .iter()
        .filter_map(|w| catalog.topic(&w.topic_id))
        .map(|t| planned(t, Priority::High));

    let incomplete = catalog
        .topics
        .iter()
        .filter(|t| is_incomplete(topic_progress.get(&t.id)) && !is_weak(t.id.as_str()))
        .take(MAX_INCOMPLETE_TOPICS)
        .map(|t| {
            let priority = if t.difficulty == TopicDifficulty::Advanced {
                Priority::Medium
            } else {
                Priority::Low
            };
            planned(t, priority)
        });

    weak.chain(incomplete).collect()
}

/// Splits the prioritized topics evenly over three days starting tomorrow.
/// `ceil(n / 3)` topics per day, so the last days may be short or empty.
pub fn generate_plan(
    topic_progress: &BTreeMap<String, TopicProgress>,
    weak_areas: &[WeakArea],
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Vec<StudyPlanDay> {
    let prioritized = prioritize(topic_progress, weak_areas, catalog);
    let per_day = prioritized.len().div_ceil(PLAN_DAYS);
    debug!(
        "[Study Plan] {} prioritized topics, {} per day",
        prioritized.len(),
        per_day
    );

    (0..PLAN_DAYS)
        .map(|i| {
            let start = (i * per_day).min(prioritized.len());
            let end = (start + per_day).min(prioritized.len());
            let topics = prioritized[start..end].to_vec();
            let total_minutes = topics.iter().map(|t| t.time_allocation).sum();
            let day = i as u8 + 1;

            StudyPlanDay {
                day,
                date: now + Duration::days(day as i64),
                topics,
                total_minutes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TopicProgressStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 7, 0, 0).unwrap()
    }

    fn topic(i: usize, difficulty: TopicDifficulty, minutes: Option<u32>) -> Topic {
        Topic {
            id: format!("topic-{i}"),
            name: format!("Topic {i}"),
            chapter: 3,
            difficulty,
            estimated_time: minutes,
            prerequisites: Vec::new(),
        }
    }

    fn catalog(n: usize) -> Catalog {
        Catalog {
            topics: (0..n)
                .map(|i| {
                    let difficulty = if i % 3 == 0 {
                        TopicDifficulty::Advanced
                    } else {
                        TopicDifficulty::Basic
                    };
                    topic(i, difficulty, Some(10 * (i as u32 + 1)))
                })
                .collect(),
            flashcards: Vec::new(),
        }
    }

    fn weak(i: usize, score: u8) -> WeakArea {
        WeakArea {
            topic_id: format!("topic-{i}"),
            topic_name: format!("Topic {i}"),
            score,
        }
    }

    #[test]
    fn test_seven_topics_split_three_three_one() {
        let catalog = catalog(10);
        let mut progress = TopicProgressStore::default();
        progress.update_practice_score("topic-4", 50, now()).unwrap();
        let weak_areas = vec![weak(4, 50)];

        let plan = generate_plan(&progress.completed_topics, &weak_areas, &catalog, now());

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].topics.len(), 3);
        assert_eq!(plan[1].topics.len(), 3);
        assert_eq!(plan[2].topics.len(), 1);

        assert_eq!(plan[0].topics[0].topic_id, "topic-4");
        assert_eq!(plan[0].topics[0].priority, Priority::High);
        // topic-0 is advanced, topic-1 basic
        assert_eq!(plan[0].topics[1].topic_id, "topic-0");
        assert_eq!(plan[0].topics[1].priority, Priority::Medium);
        assert_eq!(plan[0].topics[2].priority, Priority::Low);
        // topic-4 is not repeated among the incomplete topics
        assert_eq!(plan[2].topics[0].topic_id, "topic-6");

        assert_eq!(plan[0].total_minutes, 50 + 10 + 20);
        assert_eq!(plan[0].day, 1);
        assert_eq!(plan[0].date, now() + Duration::days(1));
        assert_eq!(plan[2].date, now() + Duration::days(3));
    }

    #[test]
    fn test_completed_topics_excluded() {
        let catalog = catalog(2);
        let mut progress = TopicProgressStore::default();
        progress.mark_learn_complete("topic-0", now());
        progress.update_practice_score("topic-0", 80, now()).unwrap();
        progress.mark_learn_complete("topic-1", now());
        progress.update_practice_score("topic-1", 79, now()).unwrap();

        let topics = prioritize(&progress.completed_topics, &[], &catalog);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].topic_id, "topic-1");
    }

    #[test]
    fn test_short_list_leaves_days_empty() {
        let catalog = catalog(1);
        let plan = generate_plan(&BTreeMap::new(), &[], &catalog, now());
        assert_eq!(plan[0].topics.len(), 1);
        assert!(plan[1].topics.is_empty());
        assert!(plan[2].topics.is_empty());
        assert_eq!(plan[2].total_minutes, 0);
    }

    #[test]
    fn test_default_time_allocation() {
        let catalog = Catalog {
            topics: vec![topic(0, TopicDifficulty::Intermediate, None)],
            flashcards: Vec::new(),
        };
        let plan = generate_plan(&BTreeMap::new(), &[], &catalog, now());
        assert_eq!(plan[0].topics[0].time_allocation, 60);
        assert_eq!(plan[0].topics[0].priority, Priority::Low);
    }

    #[test]
    fn test_unknown_weak_area_skipped() {
        let catalog = catalog(1);
        let topics = prioritize(&BTreeMap::new(), &[weak(42, 20)], &catalog);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].topic_id, "topic-0");
    }
}
