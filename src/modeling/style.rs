use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::StyleParams;
use crate::types::{Modality, PerformanceObservation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSignature {
    pub weights: BTreeMap<Modality, f64>,
    pub primary: Modality,
    pub secondary: Option<Modality>,
    pub diversity: f64,
    pub recommendations: Vec<String>,
}

impl StyleSignature {
    pub fn weight(&self, modality: Modality) -> f64 {
        self.weights.get(&modality).copied().unwrap_or(0.0)
    }

    pub fn has_signal(&self) -> bool {
        self.weights.values().any(|w| *w > 0.0)
    }
}

pub struct StyleAnalyzer {
    params: StyleParams,
}

impl StyleAnalyzer {
    pub fn new(params: StyleParams) -> Self {
        Self { params }
    }

    pub fn analyze(&self, history: &[PerformanceObservation]) -> StyleSignature {
        self.analyze_with_hints(history, &[])
    }

    /// Like [`analyze`](Self::analyze), but a learner with no modality signal
    /// falls back to their first declared hint instead of the configured default.
    pub fn analyze_with_hints(
        &self,
        history: &[PerformanceObservation],
        hints: &[Modality],
    ) -> StyleSignature {
        let mut weights: BTreeMap<Modality, f64> = Modality::ALL
            .iter()
            .map(|m| (*m, self.raw_score(history, *m)))
            .collect();

        let total: f64 = weights.values().sum();
        if total > 0.0 {
            for weight in weights.values_mut() {
                *weight /= total;
            }
        }

        let ranked = rank(&weights);
        let (primary, secondary) = match ranked.as_slice() {
            [(top, w), rest @ ..] if *w > 0.0 => {
                let second = rest.first().filter(|(_, w)| *w > 0.0).map(|(m, _)| *m);
                (*top, second)
            }
            _ => (
                hints.first().copied().unwrap_or(self.params.fallback_modality),
                None,
            ),
        };

        let diversity = normalized_entropy(&weights);

        let mut recommendations = self
            .params
            .recommendations
            .get(&primary)
            .cloned()
            .unwrap_or_default();
        if diversity > self.params.diversity_threshold {
            recommendations.push(self.params.multimodal_recommendation.clone());
        }

        tracing::debug!(
            primary = primary.as_str(),
            diversity,
            observations = history.len(),
            "style signature computed"
        );

        StyleSignature {
            weights,
            primary,
            secondary,
            diversity,
            recommendations,
        }
    }

    fn raw_score(&self, history: &[PerformanceObservation], modality: Modality) -> f64 {
        let preference = column_mean(history.iter().map(|o| o.signals.preference.get(&modality)));
        let corroboration =
            column_mean(history.iter().map(|o| o.signals.corroboration.get(&modality)));

        preference * self.params.preference_weight
            + corroboration * self.params.corroboration_weight
    }
}

impl Default for StyleAnalyzer {
    fn default() -> Self {
        Self::new(StyleParams::default())
    }
}

/// Mean of the readings present in a signal column; 0 when the column is absent.
fn column_mean<'a>(column: impl Iterator<Item = Option<&'a f64>>) -> f64 {
    let readings: Vec<f64> = column
        .flatten()
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0))
        .collect();
    if readings.is_empty() {
        return 0.0;
    }
    readings.iter().sum::<f64>() / readings.len() as f64
}

fn rank(weights: &BTreeMap<Modality, f64>) -> Vec<(Modality, f64)> {
    let mut ranked: Vec<(Modality, f64)> = Modality::ALL
        .iter()
        .map(|m| (*m, weights.get(m).copied().unwrap_or(0.0)))
        .collect();
    // Stable sort keeps canonical order among equal weights.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Shannon entropy over the non-zero weights, divided by its maximum.
pub fn normalized_entropy(weights: &BTreeMap<Modality, f64>) -> f64 {
    let present: Vec<f64> = weights.values().copied().filter(|w| *w > 0.0).collect();
    if present.len() < 2 {
        return 0.0;
    }

    let total: f64 = present.iter().sum();
    let entropy: f64 = present
        .iter()
        .map(|w| w / total)
        .map(|p| -p * p.log2())
        .sum();

    (entropy / (present.len() as f64).log2()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentType;
    use chrono::Utc;

    fn observation() -> PerformanceObservation {
        PerformanceObservation::new(Utc::now(), ContentType::Practice, 0.7)
    }

    #[test]
    fn test_empty_history_defaults() {
        let signature = StyleAnalyzer::default().analyze(&[]);
        assert!(signature.weights.values().all(|w| *w == 0.0));
        assert_eq!(signature.weights.len(), Modality::ALL.len());
        assert_eq!(signature.primary, Modality::Visual);
        assert_eq!(signature.secondary, None);
        assert_eq!(signature.diversity, 0.0);
        assert!(!signature.recommendations.is_empty());
    }

    #[test]
    fn test_hint_used_when_no_signal() {
        let signature =
            StyleAnalyzer::default().analyze_with_hints(&[observation()], &[Modality::Social]);
        assert_eq!(signature.primary, Modality::Social);
        assert!(!signature.has_signal());
    }

    #[test]
    fn test_hint_ignored_when_signal_present() {
        let history = vec![observation().with_preference(Modality::Auditory, 0.8)];
        let signature = StyleAnalyzer::default().analyze_with_hints(&history, &[Modality::Social]);
        assert_eq!(signature.primary, Modality::Auditory);
    }

    #[test]
    fn test_weights_normalized_with_corroboration() {
        let history = vec![
            observation()
                .with_preference(Modality::Visual, 0.8)
                .with_corroboration(Modality::Visual, 0.4),
            observation()
                .with_preference(Modality::Visual, 0.6)
                .with_preference(Modality::Reading, 0.4),
        ];
        let signature = StyleAnalyzer::default().analyze(&history);

        // visual: 0.7 + 0.5 * 0.4 = 0.9, reading: 0.4
        let total: f64 = signature.weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((signature.weight(Modality::Visual) - 0.9 / 1.3).abs() < 1e-9);
        assert_eq!(signature.primary, Modality::Visual);
        assert_eq!(signature.secondary, Some(Modality::Reading));
    }

    #[test]
    fn test_ties_follow_canonical_order() {
        let history = vec![observation()
            .with_preference(Modality::Social, 0.5)
            .with_preference(Modality::Kinesthetic, 0.5)
            .with_preference(Modality::Auditory, 0.5)];
        let signature = StyleAnalyzer::default().analyze(&history);
        assert_eq!(signature.primary, Modality::Auditory);
        assert_eq!(signature.secondary, Some(Modality::Kinesthetic));
    }

    #[test]
    fn test_single_modality_has_zero_diversity() {
        let history = vec![observation().with_preference(Modality::Reading, 0.9)];
        let signature = StyleAnalyzer::default().analyze(&history);
        assert_eq!(signature.diversity, 0.0);
        assert_eq!(signature.secondary, None);
        assert!((signature.weight(Modality::Reading) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_weights_have_full_diversity_and_extra_recommendation() {
        let mut obs = observation();
        for modality in Modality::ALL {
            obs = obs.with_preference(modality, 0.3);
        }
        let analyzer = StyleAnalyzer::default();
        let signature = analyzer.analyze(&[obs]);
        assert!((signature.diversity - 1.0).abs() < 1e-9);
        assert_eq!(
            signature.recommendations.last().map(String::as_str),
            Some(analyzer.params.multimodal_recommendation.as_str())
        );
    }

    #[test]
    fn test_negative_and_nan_readings_ignored() {
        let history = vec![observation()
            .with_preference(Modality::Visual, -3.0)
            .with_preference(Modality::Auditory, f64::NAN)
            .with_preference(Modality::Reading, 0.2)];
        let signature = StyleAnalyzer::default().analyze(&history);
        assert_eq!(signature.primary, Modality::Reading);
        assert!(signature.weights.values().all(|w| w.is_finite() && *w >= 0.0));
    }
}
