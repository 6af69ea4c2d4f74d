use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ProgressParams;
use crate::modeling::{std_dev, PerformanceTrend, StyleSignature, TrendClassifier};
use crate::path::LearningPath;
use crate::types::{mean, recent_scores, ContentType, PerformanceObservation};

pub const CONSISTENT_PERFORMANCE: &str = "consistent performance";
pub const RECENT_DECLINE: &str = "recent decline";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub overall_progress: f64,
    pub current_index: Option<usize>,
    pub total_nodes: usize,
    pub trend: PerformanceTrend,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

pub struct ProgressTracker {
    params: ProgressParams,
    trend: TrendClassifier,
}

impl ProgressTracker {
    pub fn new(params: ProgressParams) -> Self {
        let trend = TrendClassifier::new(&params);
        Self { params, trend }
    }

    pub fn snapshot(&self, path: &LearningPath, history: &[PerformanceObservation]) -> ProgressSnapshot {
        let scores: Vec<f64> = history.iter().map(|o| o.score).collect();
        let (strengths, improvement_areas) = self.strengths_and_gaps(history);

        ProgressSnapshot {
            overall_progress: path.completion_percentage(),
            current_index: path.current_index(),
            total_nodes: path.len(),
            trend: self.trend.classify(&scores),
            strengths,
            improvement_areas,
        }
    }

    /// Style recommendations followed by any triggered by recent scores.
    pub fn recommendations(
        &self,
        style: &StyleSignature,
        history: &[PerformanceObservation],
    ) -> Vec<String> {
        let mut recommendations = style.recommendations.clone();

        if let Some(avg) = mean(&recent_scores(history, self.params.score_window)) {
            if avg < self.params.low_performance {
                recommendations.push(self.params.low_performance_recommendation.clone());
            } else if avg > self.params.high_performance {
                recommendations.push(self.params.high_performance_recommendation.clone());
            }
        }

        recommendations
    }

    fn strengths_and_gaps(&self, history: &[PerformanceObservation]) -> (Vec<String>, Vec<String>) {
        let mut strengths = Vec::new();
        let mut gaps = Vec::new();

        let mut by_type: BTreeMap<ContentType, Vec<f64>> = BTreeMap::new();
        for obs in history {
            by_type.entry(obs.content_type).or_default().push(obs.score);
        }
        for (content_type, scores) in &by_type {
            let Some(avg) = mean(scores) else { continue };
            if avg > self.params.strength_threshold {
                strengths.push(content_type.as_str().to_string());
            } else if avg < self.params.improvement_threshold {
                gaps.push(content_type.as_str().to_string());
            }
        }

        let recent = recent_scores(history, self.params.score_window);
        if recent.len() >= 2 && std_dev(&recent) < self.params.consistency_std_dev {
            strengths.push(CONSISTENT_PERFORMANCE.to_string());
        }

        let last = recent_scores(history, self.params.trend_window);
        if last.len() == self.params.trend_window {
            if let (Some(first), Some(latest)) = (last.first(), last.last()) {
                if first - latest > self.params.decline_drop {
                    gaps.push(RECENT_DECLINE.to_string());
                }
            }
        }

        (strengths, gaps)
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(ProgressParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modeling::StyleAnalyzer;
    use crate::path::PathNode;
    use crate::types::{ContentItem, Modality};
    use chrono::Utc;

    fn obs(content_type: ContentType, score: f64) -> PerformanceObservation {
        PerformanceObservation::new(Utc::now(), content_type, score)
    }

    fn started_path(len: usize) -> LearningPath {
        let mut path = LearningPath::new(
            (0..len)
                .map(|i| {
                    PathNode::new(
                        ContentItem::new(format!("n{i}"), ContentType::Practice, Modality::Visual, 0.5, 10.0),
                        0.5,
                    )
                })
                .collect(),
        );
        path.start().unwrap();
        path
    }

    #[test]
    fn test_snapshot_basics() {
        let tracker = ProgressTracker::default();
        let snapshot = tracker.snapshot(&started_path(4), &[]);
        assert_eq!(snapshot.overall_progress, 0.0);
        assert_eq!(snapshot.current_index, Some(0));
        assert_eq!(snapshot.total_nodes, 4);
        assert_eq!(snapshot.trend, PerformanceTrend::InsufficientData);
        assert!(snapshot.strengths.is_empty());
        assert!(snapshot.improvement_areas.is_empty());
    }

    #[test]
    fn test_strengths_and_improvement_areas() {
        let tracker = ProgressTracker::default();
        let history = vec![
            obs(ContentType::Practice, 0.9),
            obs(ContentType::Assessment, 0.4),
            obs(ContentType::Practice, 0.95),
            obs(ContentType::Introduction, 0.7),
        ];
        let snapshot = tracker.snapshot(&started_path(2), &history);
        assert!(snapshot.strengths.contains(&"practice".to_string()));
        assert!(snapshot.improvement_areas.contains(&"assessment".to_string()));
        assert!(!snapshot.strengths.contains(&"introduction".to_string()));
        assert!(!snapshot.improvement_areas.contains(&"introduction".to_string()));
    }

    #[test]
    fn test_consistency_and_recent_decline() {
        let tracker = ProgressTracker::default();
        let steady: Vec<_> = [0.7, 0.72, 0.71, 0.7, 0.72]
            .iter()
            .map(|s| obs(ContentType::Practice, *s))
            .collect();
        let snapshot = tracker.snapshot(&started_path(2), &steady);
        assert!(snapshot.strengths.contains(&CONSISTENT_PERFORMANCE.to_string()));
        assert_eq!(snapshot.trend, PerformanceTrend::Stable);

        let falling: Vec<_> = [0.9, 0.8, 0.9, 0.7, 0.5]
            .iter()
            .map(|s| obs(ContentType::Practice, *s))
            .collect();
        let snapshot = tracker.snapshot(&started_path(2), &falling);
        assert!(snapshot.improvement_areas.contains(&RECENT_DECLINE.to_string()));
        assert_eq!(snapshot.trend, PerformanceTrend::Declining);
    }

    #[test]
    fn test_performance_recommendations() {
        let tracker = ProgressTracker::default();
        let style = StyleAnalyzer::default().analyze(&[]);
        let base = style.recommendations.len();

        let high: Vec<_> = [0.95; 5].iter().map(|s| obs(ContentType::Practice, *s)).collect();
        let recs = tracker.recommendations(&style, &high);
        assert_eq!(recs.len(), base + 1);
        assert!(recs.last().unwrap().contains("advanced topics"));

        let low: Vec<_> = [0.3; 5].iter().map(|s| obs(ContentType::Practice, *s)).collect();
        let recs = tracker.recommendations(&style, &low);
        assert_eq!(recs.len(), base + 1);

        let mid: Vec<_> = [0.75; 5].iter().map(|s| obs(ContentType::Practice, *s)).collect();
        assert_eq!(tracker.recommendations(&style, &mid).len(), base);
        assert_eq!(tracker.recommendations(&style, &[]).len(), base);
    }
}
