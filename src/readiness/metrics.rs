//! Readiness score: a weighted blend of topic completion, quiz scores and flashcard mastery.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use super::plan::{generate_plan, StudyPlanDay};
use crate::models::{CardProgress, Catalog, MasteryLevel, TopicProgress};

pub const COMPLETION_WEIGHT: f64 = 0.4;
pub const PRACTICE_WEIGHT: f64 = 0.3;
pub const MASTER_WEIGHT: f64 = 0.2;
pub const FLASHCARD_WEIGHT: f64 = 0.1;

/// Practice scores strictly below this (and above 0) mark a weak area.
pub const WEAK_SCORE_THRESHOLD: u8 = 70;
pub const MAX_WEAK_AREAS: usize = 5;

const LEVEL_WEIGHT: f64 = 0.6;
const ACCURACY_WEIGHT: f64 = 0.4;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakArea {
    pub topic_id: String,
    pub topic_name: String,
    pub score: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessMetrics {
    pub overall_score: u8,
    pub completion_rate: u8,
    pub practice_average: u8,
    pub master_average: u8,
    pub flashcard_mastery: u8,
    pub weak_areas: Vec<WeakArea>,
    pub study_plan: Vec<StudyPlanDay>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadinessStatus {
    JustGettingStarted,
    BuildingFoundation,
    MakingProgress,
    GettingThere,
    AlmostReady,
    ExamReady,
    FullyPrepared,
}

impl ReadinessStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => ReadinessStatus::JustGettingStarted,
            1..=29 => ReadinessStatus::BuildingFoundation,
            30..=49 => ReadinessStatus::MakingProgress,
            50..=69 => ReadinessStatus::GettingThere,
            70..=84 => ReadinessStatus::AlmostReady,
            85..=94 => ReadinessStatus::ExamReady,
            _ => ReadinessStatus::FullyPrepared,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReadinessStatus::JustGettingStarted => "Just Getting Started",
            ReadinessStatus::BuildingFoundation => "Building Foundation",
            ReadinessStatus::MakingProgress => "Making Progress",
            ReadinessStatus::GettingThere => "Getting There",
            ReadinessStatus::AlmostReady => "Almost Ready",
            ReadinessStatus::ExamReady => "Exam Ready",
            ReadinessStatus::FullyPrepared => "Fully Prepared",
        }
    }
}

impl ReadinessMetrics {
    pub fn status(&self) -> ReadinessStatus {
        ReadinessStatus::from_score(self.overall_score)
    }
}

fn to_display(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

/// Mean of the non-zero scores; topics never attempted are left out.
fn mean_of_attempted(scores: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = scores
        .filter(|&s| s > 0)
        .fold((0u32, 0u32), |(sum, count), s| (sum + s as u32, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

fn level_bonus(level: MasteryLevel) -> f64 {
    match level {
        MasteryLevel::New => 0.0,
        MasteryLevel::Learning => 25.0,
        MasteryLevel::Review => 50.0,
        MasteryLevel::Mastered => 100.0,
    }
}

fn card_score(progress: &CardProgress) -> f64 {
    LEVEL_WEIGHT * level_bonus(progress.mastery_level()) + ACCURACY_WEIGHT * progress.accuracy() * 100.0
}

/// Every known topic with a practice score in (0, 70), worst first, at most five.
/// Equal scores keep catalog order.
pub fn find_weak_areas(
    topic_progress: &BTreeMap<String, TopicProgress>,
    catalog: &Catalog,
) -> Vec<WeakArea> {
    let mut weak: Vec<(usize, WeakArea)> = topic_progress
        .iter()
        .filter(|(_, p)| p.practice_score > 0 && p.practice_score < WEAK_SCORE_THRESHOLD)
        .filter_map(|(topic_id, p)| {
            let Some(index) = catalog.topic_index(topic_id) else {
                debug!("Skipping progress for unknown topic {}", topic_id);
                return None;
            };
            let topic = &catalog.topics[index];
            Some((
                index,
                WeakArea {
                    topic_id: topic.id.clone(),
                    topic_name: topic.name.clone(),
                    score: p.practice_score,
                },
            ))
        })
        .collect();

    weak.sort_by_key(|(index, area)| (area.score, *index));
    weak.into_iter()
        .take(MAX_WEAK_AREAS)
        .map(|(_, area)| area)
        .collect()
}

/// Recomputes every readiness figure from the progress maps. Records whose
/// topic or card is missing from the catalog are ignored.
pub fn compute_metrics(
    topic_progress: &BTreeMap<String, TopicProgress>,
    flashcard_progress: &BTreeMap<String, CardProgress>,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> ReadinessMetrics {
    let known_topics: Vec<&TopicProgress> = topic_progress
        .iter()
        .filter(|(id, _)| catalog.topic(id).is_some())
        .map(|(_, p)| p)
        .collect();

    let practice_average = mean_of_attempted(known_topics.iter().map(|p| p.practice_score));
    let master_average = mean_of_attempted(known_topics.iter().map(|p| p.master_score));

    let cards: Vec<&CardProgress> = flashcard_progress
        .iter()
        .filter(|(id, _)| catalog.flashcard(id).is_some())
        .map(|(_, p)| p)
        .collect();
    let flashcard_mastery = if cards.is_empty() {
        0.0
    } else {
        cards.iter().map(|p| card_score(p)).sum::<f64>() / cards.len() as f64
    };

    let completion_rate = if catalog.topics.is_empty() {
        0.0
    } else {
        known_topics.len() as f64 / catalog.topics.len() as f64 * 100.0
    };

    let overall = COMPLETION_WEIGHT * completion_rate.clamp(0.0, 100.0)
        + PRACTICE_WEIGHT * practice_average.clamp(0.0, 100.0)
        + MASTER_WEIGHT * master_average.clamp(0.0, 100.0)
        + FLASHCARD_WEIGHT * flashcard_mastery.clamp(0.0, 100.0);

    debug!(
        "[Readiness] completion={:.1} practice={:.1} master={:.1} flashcards={:.1} -> {:.1}",
        completion_rate, practice_average, master_average, flashcard_mastery, overall
    );

    let weak_areas = find_weak_areas(topic_progress, catalog);
    let study_plan = generate_plan(topic_progress, &weak_areas, catalog, now);

    ReadinessMetrics {
        overall_score: to_display(overall),
        completion_rate: to_display(completion_rate),
        practice_average: to_display(practice_average),
        master_average: to_display(master_average),
        flashcard_mastery: to_display(flashcard_mastery),
        weak_areas,
        study_plan,
    }
}
