//! Built-in content catalog shipped with the application.
use log::{debug, warn};

use crate::error::Result;
use crate::models::Catalog;

const BUILTIN_CATALOG: &str = include_str!("data/catalog.json");

pub fn parse_catalog(json: &str) -> Result<Catalog> {
    let catalog: Catalog = serde_json::from_str(json)?;

    for card in &catalog.flashcards {
        if catalog.topic(&card.topic_id).is_none() {
            warn!("Flashcard {} references unknown topic {}", card.id, card.topic_id);
        }
    }
    debug!(
        "Catalog loaded: {} topics, {} flashcards",
        catalog.topics.len(),
        catalog.flashcards.len()
    );
    Ok(catalog)
}

pub fn builtin_catalog() -> Result<Catalog> {
    parse_catalog(BUILTIN_CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TopicDifficulty;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.topics.len(), 23);
        assert!(!catalog.flashcards.is_empty());

        for card in &catalog.flashcards {
            assert!(catalog.topic(&card.topic_id).is_some(), "{}", card.id);
        }
        for topic in &catalog.topics {
            for prereq in &topic.prerequisites {
                assert!(catalog.topic(prereq).is_some(), "{} -> {}", topic.id, prereq);
            }
        }
    }

    #[test]
    fn test_builtin_catalog_order_and_difficulty() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.topics[0].id, "financial-statements-basics");
        assert_eq!(
            catalog.topic("dupont-analysis").map(|t| t.difficulty),
            Some(TopicDifficulty::Advanced)
        );
    }

    #[test]
    fn test_parse_rejects_bad_difficulty() {
        let json = r#"{"topics": [{"id": "x", "name": "X", "chapter": 2, "difficulty": "expert"}], "flashcards": []}"#;
        assert!(parse_catalog(json).is_err());
    }
}
