use std::collections::HashMap;

use crate::types::{ContentItem, ContentType, Modality};

/// Read-only access to authored content, keyed by objective and stage.
pub trait ContentCatalog {
    /// Returns the item for `stage` of `objective`, preferring `modality`.
    fn resolve(&self, objective: &str, stage: ContentType, modality: Modality) -> Option<ContentItem>;
}

/// Catalog that never resolves anything; every stage becomes a placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCatalog;

impl ContentCatalog for EmptyCatalog {
    fn resolve(&self, _objective: &str, _stage: ContentType, _modality: Modality) -> Option<ContentItem> {
        None
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    items: HashMap<(String, ContentType), Vec<ContentItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, objective: impl Into<String>, item: ContentItem) {
        self.items
            .entry((objective.into(), item.content_type))
            .or_default()
            .push(item);
    }

    pub fn with_item(mut self, objective: impl Into<String>, item: ContentItem) -> Self {
        self.insert(objective, item);
        self
    }

    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        self.items.values().flatten().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentCatalog for InMemoryCatalog {
    fn resolve(&self, objective: &str, stage: ContentType, modality: Modality) -> Option<ContentItem> {
        let candidates = self.items.get(&(objective.to_string(), stage))?;
        candidates
            .iter()
            .find(|item| item.modality == modality)
            .or_else(|| candidates.first())
            .cloned()
    }
}

impl<C: ContentCatalog + ?Sized> ContentCatalog for &C {
    fn resolve(&self, objective: &str, stage: ContentType, modality: Modality) -> Option<ContentItem> {
        (**self).resolve(objective, stage, modality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_matching_modality() {
        let catalog = InMemoryCatalog::new()
            .with_item(
                "fractions",
                ContentItem::new("intro-text", ContentType::Introduction, Modality::Reading, 0.2, 10.0),
            )
            .with_item(
                "fractions",
                ContentItem::new("intro-video", ContentType::Introduction, Modality::Visual, 0.2, 10.0),
            );

        let visual = catalog.resolve("fractions", ContentType::Introduction, Modality::Visual);
        assert_eq!(visual.map(|i| i.id), Some("intro-video".to_string()));

        let social = catalog.resolve("fractions", ContentType::Introduction, Modality::Social);
        assert_eq!(social.map(|i| i.id), Some("intro-text".to_string()));

        assert!(catalog.resolve("fractions", ContentType::Practice, Modality::Visual).is_none());
        assert!(catalog.resolve("decimals", ContentType::Introduction, Modality::Visual).is_none());
    }

    #[test]
    fn test_get_and_len() {
        let catalog = InMemoryCatalog::new().with_item(
            "fractions",
            ContentItem::new("q1", ContentType::Assessment, Modality::Visual, 0.7, 15.0),
        );
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("q1").is_some());
        assert!(catalog.get("missing").is_none());
        assert!(EmptyCatalog
            .resolve("fractions", ContentType::Assessment, Modality::Visual)
            .is_none());
    }
}
