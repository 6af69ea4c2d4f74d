pub mod adapter;

pub use adapter::ContentAdapter;

use serde::{Deserialize, Serialize};

use crate::types::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationStep {
    Difficulty,
    Format,
    Pacing,
    Variety,
    Accessibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modification {
    pub step: AdaptationStep,
    pub field: String,
    pub change: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptedContent {
    /// Catalog item with adaptations applied; the catalog copy is untouched.
    pub content: ContentItem,
    pub adapted_difficulty: f64,
    /// Difficulty implied by recent scores; `None` without history.
    pub performance_difficulty: Option<f64>,
    pub pace_factor: f64,
    pub modifications: Vec<Modification>,
}

impl AdaptedContent {
    pub fn modifications_for(&self, step: AdaptationStep) -> impl Iterator<Item = &Modification> {
        self.modifications.iter().filter(move |m| m.step == step)
    }
}
