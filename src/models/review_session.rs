//! Review session bookkeeping and the multi-round walk over due cards.
//! Cards graded below 3 are repeated in subsequent rounds until every card in a round is recalled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Flashcard, FlashcardProgressStore};
use crate::error::Result;

/// Statistics of one sitting, from start to end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub flashcards_reviewed: u32,
    pub correct_count: u32,
    pub topic_ids: Vec<String>,
}

impl ReviewSession {
    pub fn new(topic_ids: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("session-{}", now.timestamp_millis()),
            start_time: now,
            end_time: None,
            flashcards_reviewed: 0,
            correct_count: 0,
            topic_ids,
        }
    }
}

/// A due card inside the queue, tracking whether it was recalled this round.
#[derive(Clone, Debug)]
pub struct QueuedCard {
    pub flashcard: Flashcard,
    pub recalled: bool,
    pub recalled_at: Option<DateTime<Utc>>,
}

impl QueuedCard {
    pub fn new(flashcard: Flashcard) -> Self {
        Self {
            flashcard,
            recalled: false,
            recalled_at: None,
        }
    }
}

/// Walks the due cards round by round.
pub struct ReviewQueue {
    pub cards: Vec<QueuedCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub show_back: bool,
    pub round_number: usize,
}

impl ReviewQueue {
    pub fn new(due_cards: Vec<Flashcard>) -> Self {
        let cards: Vec<_> = due_cards.into_iter().map(QueuedCard::new).collect();
        let indices: Vec<usize> = (0..cards.len()).collect();

        Self {
            cards,
            current_round_cards: indices,
            current_index: 0,
            show_back: false,
            round_number: 1,
        }
    }

    pub fn current_card(&self) -> Option<&QueuedCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
    }

    pub fn flip(&mut self) {
        self.show_back = !self.show_back;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
            self.show_back = false;
        } else {
            self.start_next_round();
        }
    }

    fn start_next_round(&mut self) {
        let missed: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| self.cards.get(idx).map(|c| !c.recalled).unwrap_or(false))
            .collect();

        if !missed.is_empty() {
            self.current_round_cards = missed;
            self.current_index = 0;
            self.show_back = false;
            self.round_number += 1;
        }
        // If nothing was missed the queue is complete
    }

    /// Grades the current card through the store and marks it recalled if quality >= 3.
    pub fn grade_current_card(
        &mut self,
        store: &mut FlashcardProgressStore,
        quality: u8,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let Some(&idx) = self.current_round_cards.get(self.current_index) else {
            return Ok(());
        };
        let Some(card) = self.cards.get_mut(idx) else {
            return Ok(());
        };

        let progress = store.record_review(&card.flashcard.id, quality, now)?;
        if progress.correct_streak() > 0 {
            card.recalled = true;
            card.recalled_at = Some(now);
        } else {
            card.recalled = false;
        }
        Ok(())
    }

    pub fn recalled_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| self.cards.get(idx).map(|c| c.recalled).unwrap_or(false))
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.recalled_count()
    }

    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.recalled_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Retry): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}
