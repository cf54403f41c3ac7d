//! Read-only content catalog: learning topics and the flashcards attached to them.
use serde::{Deserialize, Serialize};

/// Minutes assumed for a topic that does not declare an estimated study time.
pub const DEFAULT_ESTIMATED_MINUTES: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicDifficulty {
    Basic,
    Intermediate,
    Advanced,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub chapter: u8,
    pub difficulty: TopicDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl Topic {
    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_time.unwrap_or(DEFAULT_ESTIMATED_MINUTES)
    }
}

/// Flashcard is a pair <front, back> belonging to one topic.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub topic_id: String,
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

/// Topics in their natural study order plus every flashcard.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub topics: Vec<Topic>,
    pub flashcards: Vec<Flashcard>,
}

impl Catalog {
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == topic_id)
    }

    /// Position of a topic in catalog order.
    pub fn topic_index(&self, topic_id: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.id == topic_id)
    }

    pub fn flashcard(&self, card_id: &str) -> Option<&Flashcard> {
        self.flashcards.iter().find(|c| c.id == card_id)
    }

    pub fn flashcards_for_topic<'a>(
        &'a self,
        topic_id: &'a str,
    ) -> impl Iterator<Item = &'a Flashcard> + 'a {
        self.flashcards.iter().filter(move |c| c.topic_id == topic_id)
    }
}
