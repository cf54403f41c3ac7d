pub mod card_progress;
pub mod catalog;
pub mod flashcard_store;
pub mod quality;
pub mod review_session;
pub mod sm2;
pub mod topic_progress;

pub use card_progress::{CardProgress, MasteryLevel};
pub use catalog::{Catalog, Flashcard, Topic, TopicDifficulty};
pub use flashcard_store::{FlashcardProgressStore, FlashcardStatistics};
pub use quality::Quality;
pub use review_session::{QueuedCard, ReviewQueue, ReviewSession};
pub use topic_progress::{TopicProgress, TopicProgressStore};
