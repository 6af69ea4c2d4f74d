use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::Modality;

pub const STYLE_PREFERENCE_WEIGHT: f64 = 1.0;
pub const STYLE_CORROBORATION_WEIGHT: f64 = 0.5;
pub const STYLE_DIVERSITY_THRESHOLD: f64 = 0.7;

pub const DIFFICULTY_BASE_WEIGHT: f64 = 0.3;
pub const DIFFICULTY_PERFORMANCE_WEIGHT: f64 = 0.7;
pub const PERFORMANCE_WINDOW: usize = 5;
pub const PERFORMANCE_LOW_THRESHOLD: f64 = 0.6;
pub const PERFORMANCE_MID_THRESHOLD: f64 = 0.8;
pub const PERFORMANCE_LOW_DIFFICULTY: f64 = 0.3;
pub const PERFORMANCE_MID_DIFFICULTY: f64 = 0.6;
pub const PERFORMANCE_HIGH_DIFFICULTY: f64 = 0.9;
pub const MIN_DIFFICULTY: f64 = 0.1;
pub const MAX_DIFFICULTY: f64 = 1.0;

pub const PACE_BASELINE_MINUTES: f64 = 60.0;
pub const FAST_PACE_RATIO: f64 = 0.7;
pub const SLOW_PACE_RATIO: f64 = 1.3;
pub const FAST_PACE_FACTOR: f64 = 0.8;
pub const NORMAL_PACE_FACTOR: f64 = 1.0;
pub const SLOW_PACE_FACTOR: f64 = 1.3;

pub const DEFAULT_MAX_PATH_LENGTH: usize = 20;
pub const DEFAULT_TYPE_PREFERENCE: f64 = 0.5;
/// Off by default: ordering then depends on per-type scores only.
pub const DEFAULT_STYLE_FIT_WEIGHT: f64 = 0.0;
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleParams {
    pub preference_weight: f64,
    pub corroboration_weight: f64,
    pub diversity_threshold: f64,
    pub fallback_modality: Modality,
    pub recommendations: BTreeMap<Modality, Vec<String>>,
    pub multimodal_recommendation: String,
}

impl Default for StyleParams {
    fn default() -> Self {
        let table: [(Modality, [&str; 2]); 5] = [
            (
                Modality::Visual,
                [
                    "Use diagrams, charts, and mind maps to organize information",
                    "Watch short video explanations before practicing",
                ],
            ),
            (
                Modality::Auditory,
                [
                    "Listen to narrated explanations and podcasts",
                    "Explain concepts out loud to reinforce understanding",
                ],
            ),
            (
                Modality::Kinesthetic,
                [
                    "Work through interactive simulations and hands-on activities",
                    "Take short active breaks between learning blocks",
                ],
            ),
            (
                Modality::Reading,
                [
                    "Read detailed written explanations and take notes",
                    "Summarize each section in your own words",
                ],
            ),
            (
                Modality::Social,
                [
                    "Join group activities and study with peers",
                    "Ask for and give peer feedback on exercises",
                ],
            ),
        ];

        Self {
            preference_weight: STYLE_PREFERENCE_WEIGHT,
            corroboration_weight: STYLE_CORROBORATION_WEIGHT,
            diversity_threshold: STYLE_DIVERSITY_THRESHOLD,
            fallback_modality: Modality::Visual,
            recommendations: table
                .into_iter()
                .map(|(modality, recs)| (modality, recs.iter().map(|s| s.to_string()).collect()))
                .collect(),
            multimodal_recommendation:
                "Mix content formats to match your multimodal learning profile".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyParams {
    pub base_weight: f64,
    pub performance_weight: f64,
    pub performance_window: usize,
    pub low_threshold: f64,
    pub mid_threshold: f64,
    pub low_difficulty: f64,
    pub mid_difficulty: f64,
    pub high_difficulty: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub easy_band: f64,
    pub hard_band: f64,
    pub min_hints_when_easy: usize,
    pub max_hints_when_hard: usize,
    pub easy_time_scale: f64,
    pub hard_time_scale: f64,
    pub default_hints: Vec<String>,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            base_weight: DIFFICULTY_BASE_WEIGHT,
            performance_weight: DIFFICULTY_PERFORMANCE_WEIGHT,
            performance_window: PERFORMANCE_WINDOW,
            low_threshold: PERFORMANCE_LOW_THRESHOLD,
            mid_threshold: PERFORMANCE_MID_THRESHOLD,
            low_difficulty: PERFORMANCE_LOW_DIFFICULTY,
            mid_difficulty: PERFORMANCE_MID_DIFFICULTY,
            high_difficulty: PERFORMANCE_HIGH_DIFFICULTY,
            min_difficulty: MIN_DIFFICULTY,
            max_difficulty: MAX_DIFFICULTY,
            easy_band: 0.4,
            hard_band: 0.8,
            min_hints_when_easy: 2,
            max_hints_when_hard: 1,
            easy_time_scale: 1.5,
            hard_time_scale: 0.8,
            default_hints: vec![
                "Break the problem into smaller steps".to_string(),
                "Review the worked example before attempting this".to_string(),
                "Check each step against the key definition".to_string(),
            ],
        }
    }
}

impl DifficultyParams {
    /// Step function over the mean of recent scores.
    pub fn performance_difficulty(&self, mean_score: f64) -> f64 {
        if mean_score < self.low_threshold {
            self.low_difficulty
        } else if mean_score < self.mid_threshold {
            self.mid_difficulty
        } else {
            self.high_difficulty
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingParams {
    pub baseline_minutes: f64,
    pub fast_ratio: f64,
    pub slow_ratio: f64,
    pub fast_factor: f64,
    pub normal_factor: f64,
    pub slow_factor: f64,
}

impl Default for PacingParams {
    fn default() -> Self {
        Self {
            baseline_minutes: PACE_BASELINE_MINUTES,
            fast_ratio: FAST_PACE_RATIO,
            slow_ratio: SLOW_PACE_RATIO,
            fast_factor: FAST_PACE_FACTOR,
            normal_factor: NORMAL_PACE_FACTOR,
            slow_factor: SLOW_PACE_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarietyParams {
    pub high_threshold: f64,
    pub low_threshold: f64,
    pub max_alternatives_when_low: usize,
    pub default_alternative_formats: Vec<String>,
    pub default_bonus_materials: Vec<String>,
}

impl Default for VarietyParams {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            low_threshold: 0.3,
            max_alternatives_when_low: 1,
            default_alternative_formats: vec![
                "video".to_string(),
                "interactive".to_string(),
                "text".to_string(),
            ],
            default_bonus_materials: vec![
                "Extension challenge".to_string(),
                "Real-world application".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatRules {
    pub default_diagram: String,
    pub max_videos: usize,
    pub default_podcast: String,
    pub default_interactive: String,
    pub default_hands_on: String,
    pub default_reading: String,
    pub default_group_activity: String,
}

impl Default for FormatRules {
    fn default() -> Self {
        Self {
            default_diagram: "concept flowchart".to_string(),
            max_videos: 2,
            default_podcast: "topic podcast".to_string(),
            default_interactive: "interactive simulation".to_string(),
            default_hands_on: "hands-on activity".to_string(),
            default_reading: "supplementary reading".to_string(),
            default_group_activity: "group discussion".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathParams {
    pub max_path_length: usize,
    /// Preference for content types with no scored history.
    pub default_type_preference: f64,
    /// Weight of the style signature's modality fit in the preference score.
    pub style_fit_weight: f64,
    pub placeholder_difficulty: f64,
    pub placeholder_duration_minutes: f64,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            default_type_preference: DEFAULT_TYPE_PREFERENCE,
            style_fit_weight: DEFAULT_STYLE_FIT_WEIGHT,
            placeholder_difficulty: 0.5,
            placeholder_duration_minutes: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressParams {
    pub score_window: usize,
    pub trend_window: usize,
    pub up_threshold: f64,
    pub down_threshold: f64,
    pub strength_threshold: f64,
    pub improvement_threshold: f64,
    pub consistency_std_dev: f64,
    pub decline_drop: f64,
    pub low_performance: f64,
    pub high_performance: f64,
    pub low_performance_recommendation: String,
    pub high_performance_recommendation: String,
}

impl Default for ProgressParams {
    fn default() -> Self {
        Self {
            score_window: PERFORMANCE_WINDOW,
            trend_window: 3,
            up_threshold: 0.05,
            down_threshold: -0.05,
            strength_threshold: 0.8,
            improvement_threshold: 0.6,
            consistency_std_dev: 0.1,
            decline_drop: 0.1,
            low_performance: 0.6,
            high_performance: 0.9,
            low_performance_recommendation:
                "Review foundational concepts and add extra practice before moving on".to_string(),
            high_performance_recommendation:
                "Explore advanced topics and enrichment challenges".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptationConfig {
    pub difficulty: DifficultyParams,
    pub pacing: PacingParams,
    pub variety: VarietyParams,
    pub format: FormatRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub style: StyleParams,
    pub adaptation: AdaptationConfig,
    pub path: PathParams,
    pub progress: ProgressParams,
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style: StyleParams::default(),
            adaptation: AdaptationConfig::default(),
            path: PathParams::default(),
            progress: ProgressParams::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PATHWAY_MAX_PATH_LENGTH") {
            config.path.max_path_length = val
                .parse()
                .ok()
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_PATH_LENGTH);
        }
        if let Ok(val) = std::env::var("PATHWAY_HISTORY_CAPACITY") {
            config.history_capacity = val
                .parse()
                .ok()
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_HISTORY_CAPACITY);
        }
        if let Ok(val) = std::env::var("PATHWAY_FALLBACK_MODALITY") {
            if let Some(modality) = Modality::parse(&val) {
                config.style.fallback_modality = modality;
            }
        }

        config
    }

    pub fn from_json(raw: &str) -> EngineResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let difficulty = &self.adaptation.difficulty;
        let pacing = &self.adaptation.pacing;
        let variety = &self.adaptation.variety;

        let finite = [
            ("style.preference_weight", self.style.preference_weight),
            ("style.corroboration_weight", self.style.corroboration_weight),
            ("style.diversity_threshold", self.style.diversity_threshold),
            ("difficulty.base_weight", difficulty.base_weight),
            ("difficulty.performance_weight", difficulty.performance_weight),
            ("difficulty.easy_time_scale", difficulty.easy_time_scale),
            ("difficulty.hard_time_scale", difficulty.hard_time_scale),
            ("pacing.baseline_minutes", pacing.baseline_minutes),
            ("path.default_type_preference", self.path.default_type_preference),
            ("path.style_fit_weight", self.path.style_fit_weight),
            ("progress.up_threshold", self.progress.up_threshold),
            ("progress.down_threshold", self.progress.down_threshold),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfig(format!("{name} must be finite")));
            }
        }

        if !(difficulty.min_difficulty > 0.0
            && difficulty.min_difficulty <= difficulty.max_difficulty)
        {
            return Err(EngineError::InvalidConfig(
                "difficulty clamp range is inverted or empty".to_string(),
            ));
        }
        if difficulty.low_threshold > difficulty.mid_threshold {
            return Err(EngineError::InvalidConfig(
                "difficulty bucket thresholds are inverted".to_string(),
            ));
        }
        if difficulty.easy_band > difficulty.hard_band {
            return Err(EngineError::InvalidConfig(
                "difficulty easy band exceeds hard band".to_string(),
            ));
        }
        if pacing.baseline_minutes <= 0.0 || pacing.fast_ratio > pacing.slow_ratio {
            return Err(EngineError::InvalidConfig(
                "pacing baseline must be positive and ratios ordered".to_string(),
            ));
        }
        if variety.low_threshold > variety.high_threshold {
            return Err(EngineError::InvalidConfig(
                "variety thresholds are inverted".to_string(),
            ));
        }
        if self.progress.down_threshold > self.progress.up_threshold {
            return Err(EngineError::InvalidConfig(
                "trend thresholds are inverted".to_string(),
            ));
        }
        if difficulty.performance_window == 0
            || self.progress.score_window == 0
            || self.progress.trend_window < 2
        {
            return Err(EngineError::InvalidConfig(
                "score windows must be non-empty and the trend window at least 2".to_string(),
            ));
        }
        if self.path.max_path_length == 0 {
            return Err(EngineError::InvalidConfig(
                "max_path_length must be positive".to_string(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "history_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_performance_difficulty_buckets() {
        let params = DifficultyParams::default();
        assert_eq!(params.performance_difficulty(0.2), 0.3);
        assert_eq!(params.performance_difficulty(0.6), 0.6);
        assert_eq!(params.performance_difficulty(0.79), 0.6);
        assert_eq!(params.performance_difficulty(0.8), 0.9);
        assert_eq!(params.performance_difficulty(1.0), 0.9);
    }

    #[test]
    fn test_every_modality_has_recommendations() {
        let style = StyleParams::default();
        for modality in Modality::ALL {
            assert!(!style.recommendations[&modality].is_empty());
        }
    }

    #[test]
    fn test_json_round_trip_and_validation() {
        let mut config = EngineConfig::default();
        config.path.max_path_length = 8;
        let raw = serde_json::to_string(&config).unwrap();
        let parsed = EngineConfig::from_json(&raw).unwrap();
        assert_eq!(parsed.path.max_path_length, 8);

        config.history_capacity = 0;
        let raw = serde_json::to_string(&config).unwrap();
        assert!(matches!(
            EngineConfig::from_json(&raw),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_invalid_config() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inverted_clamp_rejected() {
        let mut config = EngineConfig::default();
        config.adaptation.difficulty.min_difficulty = 0.9;
        config.adaptation.difficulty.max_difficulty = 0.5;
        assert!(config.validate().is_err());
    }
}
