pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod readiness;

pub use error::{Result, StudyError};
pub use models::{CardProgress, Catalog, Flashcard, FlashcardProgressStore, Quality, Topic, TopicProgressStore};
pub use readiness::{ReadinessMetrics, StudyPlanDay, compute_metrics, generate_plan};
