//! Per-card scheduling state produced by the SM-2 scheduler.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sm2::{self, DEFAULT_EASE_FACTOR, MAX_EASE_FACTOR, MIN_EASE_FACTOR};

/// Coarse four-stage classification derived from a card's review history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryLevel {
    #[default]
    New,
    Learning,
    Review,
    Mastered,
}

impl MasteryLevel {
    pub fn label(self) -> &'static str {
        match self {
            MasteryLevel::New => "New",
            MasteryLevel::Learning => "Learning",
            MasteryLevel::Review => "Review",
            MasteryLevel::Mastered => "Mastered",
        }
    }
}

/// Review history of one flashcard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardProgress {
    pub(crate) flashcard_id: String,
    pub(crate) last_reviewed: DateTime<Utc>,
    pub(crate) next_review: DateTime<Utc>,
    pub(crate) ease_factor: f64,
    pub(crate) interval: u32,
    pub(crate) repetitions: u32,
    pub(crate) mastery_level: MasteryLevel,
    pub(crate) correct_streak: u32,
    pub(crate) total_reviews: u32,
    pub(crate) correct_reviews: u32,
}

impl CardProgress {
    /// Defaults used for a card that has never been reviewed.
    pub(crate) fn unreviewed(flashcard_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            flashcard_id: flashcard_id.to_string(),
            last_reviewed: now,
            next_review: now,
            ease_factor: DEFAULT_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            mastery_level: MasteryLevel::New,
            correct_streak: 0,
            total_reviews: 0,
            correct_reviews: 0,
        }
    }

    /// Clamps the ease factor and counters, then rederives the mastery level.
    pub(crate) fn normalized(mut self) -> Self {
        if !self.ease_factor.is_finite() {
            self.ease_factor = DEFAULT_EASE_FACTOR;
        }
        self.ease_factor = self.ease_factor.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR);
        self.correct_reviews = self.correct_reviews.min(self.total_reviews);
        self.correct_streak = self.correct_streak.min(self.total_reviews);
        self.mastery_level = sm2::classify(self.repetitions, self.correct_streak, self.accuracy());
        self
    }

    pub fn flashcard_id(&self) -> &str {
        &self.flashcard_id
    }

    pub fn last_reviewed(&self) -> DateTime<Utc> {
        self.last_reviewed
    }

    pub fn next_review(&self) -> DateTime<Utc> {
        self.next_review
    }

    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    /// Days until the next scheduled review; 0 means reset / not yet scheduled.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn mastery_level(&self) -> MasteryLevel {
        self.mastery_level
    }

    pub fn correct_streak(&self) -> u32 {
        self.correct_streak
    }

    pub fn total_reviews(&self) -> u32 {
        self.total_reviews
    }

    pub fn correct_reviews(&self) -> u32 {
        self.correct_reviews
    }

    /// Share of reviews graded correct, 0.0 when the card was never reviewed.
    pub fn accuracy(&self) -> f64 {
        if self.total_reviews == 0 {
            0.0
        } else {
            self.correct_reviews as f64 / self.total_reviews as f64
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}
