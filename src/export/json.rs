//! JSON import/export of learner progress.
//! Saves both progress stores to a single file and loads them back.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{FlashcardProgressStore, TopicProgressStore};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default)]
    pub flashcards: FlashcardProgressStore,
    #[serde(default)]
    pub topics: TopicProgressStore,
}

/// Exports a progress snapshot to a JSON file at the specified path.
pub fn export_progress_to_path(snapshot: &ProgressSnapshot, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(snapshot)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!("Progress exported to {:?}", path);
    Ok(())
}

/// Imports a progress snapshot from a JSON file.
/// Returns an error if the file doesn't exist or doesn't match the progress shape.
pub fn import_progress(path: &Path) -> Result<ProgressSnapshot> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let snapshot: ProgressSnapshot = serde_json::from_str(&contents)?;

    info!(
        "Progress imported from {:?}: {} cards, {} topics",
        path,
        snapshot.flashcards.all_progress().len(),
        snapshot.topics.completed_topics.len()
    );
    Ok(snapshot)
}
