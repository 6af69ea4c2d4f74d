use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adaptation::{AdaptedContent, ContentAdapter};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::modeling::{PerformanceTrend, StyleAnalyzer, StyleSignature, TrendClassifier};
use crate::orchestrator::history::{AdaptationHistory, AdaptationRecord};
use crate::orchestrator::progress::{ProgressSnapshot, ProgressTracker};
use crate::path::{ContentCatalog, LearningPath, PathAssembler};
use crate::types::{LearnerProfile, PerformanceObservation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningExperience {
    pub student_id: String,
    pub objectives: Vec<String>,
    pub style_signature: StyleSignature,
    pub path: LearningPath,
    /// Adapted form of the active node; `None` for an empty path.
    pub current_content: Option<AdaptedContent>,
    pub recommendations: Vec<String>,
    pub progress: ProgressSnapshot,
    pub created_at: DateTime<Utc>,
}

/// Composes style analysis, path assembly and content adaptation for one
/// learner session.
///
/// Each instance owns its adaptation history. Calls on one instance need
/// `&mut self`; run one orchestrator per session for parallel work.
pub struct AdaptiveOrchestrator<C> {
    catalog: C,
    style: StyleAnalyzer,
    assembler: PathAssembler,
    adapter: ContentAdapter,
    progress: ProgressTracker,
    trend: TrendClassifier,
    history: AdaptationHistory,
    config: EngineConfig,
}

impl<C: ContentCatalog> AdaptiveOrchestrator<C> {
    pub fn new(config: EngineConfig, catalog: C) -> EngineResult<Self> {
        config.validate()?;

        Ok(Self {
            catalog,
            style: StyleAnalyzer::new(config.style.clone()),
            assembler: PathAssembler::new(config.path.clone()),
            adapter: ContentAdapter::new(config.adaptation.clone()),
            progress: ProgressTracker::new(config.progress.clone()),
            trend: TrendClassifier::new(&config.progress),
            history: AdaptationHistory::with_capacity(config.history_capacity),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn history(&self) -> &AdaptationHistory {
        &self.history
    }

    /// Hands retained history to the caller's persistence layer.
    pub fn drain_history(&mut self) -> Vec<AdaptationRecord> {
        self.history.drain()
    }

    pub fn difficulty_trend(&self, student_id: &str) -> PerformanceTrend {
        self.history.difficulty_trend(student_id, &self.trend)
    }

    pub fn create_experience<S: AsRef<str>>(
        &mut self,
        student_id: &str,
        objectives: &[S],
        profile: &LearnerProfile,
        history: &[PerformanceObservation],
    ) -> EngineResult<LearningExperience> {
        ensure_same_student(student_id, profile)?;
        let style = self.style.analyze_with_hints(history, &profile.style_hints);

        let nodes = self
            .assembler
            .assemble_nodes(objectives, profile, &style, history, &self.catalog)?;

        let mut path = LearningPath::new(nodes);
        if !path.is_empty() {
            path.start()?;
        }

        let current_content = path
            .current_node()
            .map(|node| self.adapter.adapt(&node.content, profile, history, &style));
        let recommendations = self.progress.recommendations(&style, history);
        let progress = self.progress.snapshot(&path, history);

        let experience = LearningExperience {
            student_id: student_id.to_string(),
            objectives: objectives.iter().map(|o| o.as_ref().to_string()).collect(),
            style_signature: style,
            path,
            current_content,
            recommendations,
            progress,
            created_at: Utc::now(),
        };

        tracing::info!(
            student_id,
            nodes = experience.path.len(),
            primary_style = experience.style_signature.primary.as_str(),
            trend = experience.progress.trend.as_str(),
            "learning experience created"
        );

        self.record(&experience);
        Ok(experience)
    }

    /// Re-adapts the active node of `experience` against fresh history.
    ///
    /// Call after the learner advances or new observations arrive. The path
    /// order is left as is.
    pub fn refresh_current_content(
        &mut self,
        experience: &mut LearningExperience,
        profile: &LearnerProfile,
        history: &[PerformanceObservation],
    ) -> EngineResult<()> {
        ensure_same_student(&experience.student_id, profile)?;
        let style = self.style.analyze_with_hints(history, &profile.style_hints);

        let node = experience
            .path
            .current_node()
            .ok_or(EngineError::InvalidState {
                expected: "path with a current node",
                actual: experience.path.state().as_str(),
            })?;
        let adapted = self.adapter.adapt(&node.content, profile, history, &style);

        experience.recommendations = self.progress.recommendations(&style, history);
        experience.progress = self.progress.snapshot(&experience.path, history);
        experience.current_content = Some(adapted);
        experience.style_signature = style;

        tracing::debug!(
            student_id = %experience.student_id,
            index = ?experience.path.current_index(),
            "current content refreshed"
        );

        self.record(experience);
        Ok(())
    }

    fn record(&mut self, experience: &LearningExperience) {
        let adapted = experience.current_content.as_ref();
        self.history.push(AdaptationRecord {
            id: Uuid::new_v4(),
            student_id: experience.student_id.clone(),
            recorded_at: Utc::now(),
            content_id: adapted.map(|a| a.content.id.clone()),
            adapted_difficulty: adapted.map(|a| a.adapted_difficulty),
            pace_factor: adapted.map(|a| a.pace_factor),
            primary_style: experience.style_signature.primary,
            trend: experience.progress.trend,
        });
    }
}

fn ensure_same_student(student_id: &str, profile: &LearnerProfile) -> EngineResult<()> {
    if student_id != profile.student_id {
        return Err(EngineError::StudentMismatch {
            requested: student_id.to_string(),
            profile: profile.student_id.clone(),
        });
    }
    Ok(())
}
