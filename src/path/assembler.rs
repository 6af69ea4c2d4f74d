use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::PathParams;
use crate::error::EngineResult;
use crate::modeling::StyleSignature;
use crate::path::catalog::ContentCatalog;
use crate::path::graph::{topological_order, validate_references};
use crate::path::learning_path::PathNode;
use crate::types::{ContentItem, ContentType, LearnerProfile, Modality, PerformanceObservation};

/// Historical fit per content type, plus optional style fit per modality.
///
/// Observations carry no modality, so score history alone gives every
/// modality a preference of zero. The style signature only moves the score
/// when `PathParams::style_fit_weight` is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPreferences {
    pub by_type: BTreeMap<ContentType, f64>,
    pub style_fit: BTreeMap<Modality, f64>,
    pub style_fit_weight: f64,
}

impl ContentPreferences {
    /// Mean score per content type; unseen types get `params.default_type_preference`.
    pub fn from_history(
        history: &[PerformanceObservation],
        style: &StyleSignature,
        params: &PathParams,
    ) -> Self {
        let mut sums: BTreeMap<ContentType, (f64, usize)> = BTreeMap::new();
        for obs in history.iter().filter(|o| o.score.is_finite()) {
            let entry = sums.entry(obs.content_type).or_insert((0.0, 0));
            entry.0 += obs.score;
            entry.1 += 1;
        }

        let by_type = ContentType::ALL
            .iter()
            .map(|t| {
                let pref = sums
                    .get(t)
                    .map(|(sum, n)| sum / *n as f64)
                    .unwrap_or(params.default_type_preference);
                (*t, pref)
            })
            .collect();

        Self {
            by_type,
            style_fit: style.weights.clone(),
            style_fit_weight: params.style_fit_weight,
        }
    }

    pub fn score(&self, item: &ContentItem) -> f64 {
        let type_pref = self.by_type.get(&item.content_type).copied().unwrap_or(0.0);
        if self.style_fit_weight == 0.0 {
            return type_pref;
        }
        let fit = self.style_fit.get(&item.modality).copied().unwrap_or(0.0);
        type_pref + self.style_fit_weight * fit
    }
}

pub struct PathAssembler {
    params: PathParams,
}

impl PathAssembler {
    pub fn new(params: PathParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Builds the ordered content sequence for `objectives`.
    ///
    /// Prerequisites always precede their dependents. Among items free to move,
    /// higher preference scores come first. The result is cut to
    /// `max_path_length` after ordering.
    pub fn assemble<S, C>(
        &self,
        objectives: &[S],
        profile: &LearnerProfile,
        style: &StyleSignature,
        history: &[PerformanceObservation],
        catalog: &C,
    ) -> EngineResult<Vec<ContentItem>>
    where
        S: AsRef<str>,
        C: ContentCatalog + ?Sized,
    {
        let nodes = self.assemble_nodes(objectives, profile, style, history, catalog)?;
        Ok(nodes.into_iter().map(|node| node.content).collect())
    }

    /// Same ordering as [`assemble`](Self::assemble), with each item's
    /// preference score attached.
    pub fn assemble_nodes<S, C>(
        &self,
        objectives: &[S],
        profile: &LearnerProfile,
        style: &StyleSignature,
        history: &[PerformanceObservation],
        catalog: &C,
    ) -> EngineResult<Vec<PathNode>>
    where
        S: AsRef<str>,
        C: ContentCatalog + ?Sized,
    {
        let items = self.resolve_templates(objectives, style.primary, catalog);
        validate_references(&items)?;

        let ordered = topological_order(items)?;

        let preferences = ContentPreferences::from_history(history, style, &self.params);
        let mut scored: Vec<(f64, ContentItem)> = ordered
            .into_iter()
            .map(|item| (preferences.score(&item), item))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut path = topological_order(scored.into_iter().map(|(_, item)| item).collect())?;
        let total = path.len();
        path.truncate(self.params.max_path_length);

        tracing::debug!(
            student_id = %profile.student_id,
            objectives = objectives.len(),
            total,
            kept = path.len(),
            "learning path assembled"
        );

        Ok(path
            .into_iter()
            .map(|item| {
                let score = preferences.score(&item);
                PathNode::new(item, score)
            })
            .collect())
    }

    fn resolve_templates<S, C>(&self, objectives: &[S], primary: Modality, catalog: &C) -> Vec<ContentItem>
    where
        S: AsRef<str>,
        C: ContentCatalog + ?Sized,
    {
        let mut items = Vec::with_capacity(objectives.len() * ContentType::ALL.len());
        let mut seen = HashSet::new();

        for objective in objectives {
            let objective = objective.as_ref();
            let mut previous: Option<String> = None;

            for stage in ContentType::ALL {
                let mut item = catalog
                    .resolve(objective, stage, primary)
                    .unwrap_or_else(|| self.placeholder(objective, stage, primary));

                if let Some(prev) = previous.take() {
                    if !item.prerequisites.contains(&prev) && prev != item.id {
                        item.prerequisites.insert(0, prev);
                    }
                }
                previous = Some(item.id.clone());

                if seen.insert(item.id.clone()) {
                    items.push(item);
                }
            }
        }

        items
    }

    fn placeholder(&self, objective: &str, stage: ContentType, modality: Modality) -> ContentItem {
        let id = ContentItem::placeholder_id(objective, stage, modality);
        tracing::warn!(objective, stage = stage.as_str(), %id, "catalog miss, using placeholder content");

        ContentItem::new(
            id,
            stage,
            modality,
            self.params.placeholder_difficulty,
            self.params.placeholder_duration_minutes,
        )
        .with_time_limit("completion", self.params.placeholder_duration_minutes)
    }
}

impl Default for PathAssembler {
    fn default() -> Self {
        Self::new(PathParams::default())
    }
}
