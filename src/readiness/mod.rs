//! Readiness aggregation over topic and flashcard progress.
pub mod metrics;
pub mod plan;

pub use metrics::{compute_metrics, find_weak_areas, ReadinessMetrics, ReadinessStatus, WeakArea};
pub use plan::{generate_plan, PlannedTopic, Priority, StudyPlanDay};
