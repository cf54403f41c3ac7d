//! SM-2 (SuperMemo 2) spaced repetition scheduling with mastery classification.
//!
//! The algorithm calculates review intervals based on recall quality:
//! - Each card has an ease factor (EF) in [1.3, 2.5] that adjusts after every review
//! - Quality grades 0-2: interval and repetitions are reset to 0 together
//! - Quality grades 3-5: interval grows 0 → 1 day → 6 days → previous interval × EF
//! - The mastery level is recomputed from repetitions, streak and accuracy, never set directly

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use super::{CardProgress, Flashcard, MasteryLevel, Quality};

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;

pub const FIRST_INTERVAL_DAYS: u32 = 1;
pub const SECOND_INTERVAL_DAYS: u32 = 6;

pub const MASTERED_ACCURACY: f64 = 0.9;
pub const MASTERED_STREAK: u32 = 5;
pub const MASTERED_REPETITIONS: u32 = 5;
pub const REVIEW_REPETITIONS: u32 = 3;
pub const REVIEW_STREAK: u32 = 2;

/// Interval after a correct recall, based on the interval before it.
pub fn next_interval(current_interval: u32, ease_factor: f64) -> u32 {
    match current_interval {
        0 => FIRST_INTERVAL_DAYS,
        1 => SECOND_INTERVAL_DAYS,
        n => {
            let grown = (n as f64 * ease_factor).round();
            if grown >= u32::MAX as f64 {
                u32::MAX
            } else {
                grown as u32
            }
        }
    }
}

/// `now` plus `interval` days, pinned to the latest representable instant on overflow.
pub fn schedule_after(now: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(interval)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), clamped to [1.3, 2.5].
pub fn adjust_ease(ease_factor: f64, quality: Quality) -> f64 {
    let miss = 5.0 - quality.value() as f64;
    let ef = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    ef.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR)
}

/// First match wins: new, then mastered, then review, otherwise learning.
pub fn classify(repetitions: u32, correct_streak: u32, accuracy: f64) -> MasteryLevel {
    if repetitions == 0 {
        MasteryLevel::New
    } else if accuracy >= MASTERED_ACCURACY
        && correct_streak >= MASTERED_STREAK
        && repetitions >= MASTERED_REPETITIONS
    {
        MasteryLevel::Mastered
    } else if repetitions >= REVIEW_REPETITIONS && correct_streak >= REVIEW_STREAK {
        MasteryLevel::Review
    } else {
        MasteryLevel::Learning
    }
}

/// Applies one graded review and returns the replacement record.
/// `progress` is `None` for a card that was never reviewed.
pub fn record_review(
    progress: Option<&CardProgress>,
    flashcard_id: &str,
    quality: Quality,
    now: DateTime<Utc>,
) -> CardProgress {
    let current = progress
        .cloned()
        .unwrap_or_else(|| CardProgress::unreviewed(flashcard_id, now));
    let correct = quality.is_correct();

    debug!(
        "[SM-2 Input] Card {}: q={}, interval={}d, ease={:.2}, reps={}",
        flashcard_id,
        quality.value(),
        current.interval,
        current.ease_factor,
        current.repetitions
    );

    let (interval, repetitions) = if correct {
        (
            next_interval(current.interval, current.ease_factor),
            current.repetitions + 1,
        )
    } else {
        (0, 0)
    };
    let ease_factor = adjust_ease(current.ease_factor, quality);

    let correct_streak = if correct { current.correct_streak + 1 } else { 0 };
    let total_reviews = current.total_reviews + 1;
    let correct_reviews = current.correct_reviews + u32::from(correct);
    let accuracy = correct_reviews as f64 / total_reviews as f64;
    let mastery_level = classify(repetitions, correct_streak, accuracy);

    info!(
        "[SM-2 Result] Card {}: Ease {:.2} -> {:.2}, Interval {}d -> {}d, {:?}",
        flashcard_id, current.ease_factor, ease_factor, current.interval, interval, mastery_level
    );

    CardProgress {
        flashcard_id: flashcard_id.to_string(),
        last_reviewed: now,
        next_review: schedule_after(now, interval),
        ease_factor,
        interval,
        repetitions,
        mastery_level,
        correct_streak,
        total_reviews,
        correct_reviews,
    }
}

/// Cards without a record, or whose next review is not after `now`, in input order.
pub fn select_due<'a>(
    candidates: &'a [Flashcard],
    progress: &BTreeMap<String, CardProgress>,
    now: DateTime<Utc>,
) -> Vec<&'a Flashcard> {
    candidates
        .iter()
        .filter(|card| {
            progress
                .get(&card.id)
                .map(|p| p.is_due(now))
                .unwrap_or(true)
        })
        .collect()
}
