use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modeling::{PerformanceTrend, TrendClassifier};
use crate::types::Modality;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptationRecord {
    pub id: Uuid,
    pub student_id: String,
    pub recorded_at: DateTime<Utc>,
    pub content_id: Option<String>,
    pub adapted_difficulty: Option<f64>,
    pub pace_factor: Option<f64>,
    pub primary_style: Modality,
    pub trend: PerformanceTrend,
}

/// Append-only record of orchestration results, oldest evicted at capacity.
#[derive(Debug, Clone)]
pub struct AdaptationHistory {
    capacity: usize,
    records: VecDeque<AdaptationRecord>,
    evicted: u64,
}

impl AdaptationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(1024)),
            evicted: 0,
        }
    }

    pub fn push(&mut self, record: AdaptationRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
            self.evicted = self.evicted.saturating_add(1);
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records dropped to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn latest(&self) -> Option<&AdaptationRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AdaptationRecord> {
        self.records.iter()
    }

    pub fn records_for<'a>(&'a self, student_id: &'a str) -> impl Iterator<Item = &'a AdaptationRecord> + 'a {
        self.records.iter().filter(move |r| r.student_id == student_id)
    }

    /// Direction of the adapted difficulty across a student's records.
    pub fn difficulty_trend(&self, student_id: &str, classifier: &TrendClassifier) -> PerformanceTrend {
        let difficulties: Vec<f64> = self
            .records_for(student_id)
            .filter_map(|r| r.adapted_difficulty)
            .collect();
        classifier.classify(&difficulties)
    }

    /// Hands every retained record to the caller, oldest first.
    pub fn drain(&mut self) -> Vec<AdaptationRecord> {
        self.records.drain(..).collect()
    }
}

impl Default for AdaptationHistory {
    fn default() -> Self {
        Self::with_capacity(crate::config::DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(student: &str, difficulty: f64) -> AdaptationRecord {
        AdaptationRecord {
            id: Uuid::new_v4(),
            student_id: student.to_string(),
            recorded_at: Utc::now(),
            content_id: Some("c1".to_string()),
            adapted_difficulty: Some(difficulty),
            pace_factor: Some(1.0),
            primary_style: Modality::Visual,
            trend: PerformanceTrend::Stable,
        }
    }

    #[test]
    fn test_bounded_ring() {
        let mut history = AdaptationHistory::with_capacity(3);
        for i in 0..5 {
            history.push(record("s1", i as f64 / 10.0));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.evicted(), 2);
        let kept: Vec<f64> = history.iter().filter_map(|r| r.adapted_difficulty).collect();
        assert_eq!(kept, vec![0.2, 0.3, 0.4]);
        assert_eq!(history.latest().and_then(|r| r.adapted_difficulty), Some(0.4));
    }

    #[test]
    fn test_zero_capacity_coerced() {
        let mut history = AdaptationHistory::with_capacity(0);
        history.push(record("s1", 0.5));
        history.push(record("s1", 0.6));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_difficulty_trend_per_student() {
        let mut history = AdaptationHistory::default();
        for d in [0.3, 0.5, 0.7] {
            history.push(record("rising", d));
            history.push(record("falling", 1.0 - d));
        }
        history.push(record("short", 0.5));

        let classifier = TrendClassifier::default();
        assert_eq!(history.difficulty_trend("rising", &classifier), PerformanceTrend::Improving);
        assert_eq!(history.difficulty_trend("falling", &classifier), PerformanceTrend::Declining);
        assert_eq!(
            history.difficulty_trend("short", &classifier),
            PerformanceTrend::InsufficientData
        );
        assert_eq!(history.records_for("rising").count(), 3);
    }

    #[test]
    fn test_drain_empties() {
        let mut history = AdaptationHistory::default();
        history.push(record("s1", 0.5));
        let drained = history.drain();
        assert_eq!(drained.len(), 1);
        assert!(history.is_empty());
    }
}
