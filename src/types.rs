use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Visual,
    Auditory,
    Kinesthetic,
    Reading,
    Social,
}

impl Modality {
    /// Canonical order, also used to break score ties.
    pub const ALL: [Modality; 5] = [
        Modality::Visual,
        Modality::Auditory,
        Modality::Kinesthetic,
        Modality::Reading,
        Modality::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::Reading => "reading",
            Self::Social => "social",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Some(Self::Visual),
            "auditory" => Some(Self::Auditory),
            "kinesthetic" => Some(Self::Kinesthetic),
            "reading" => Some(Self::Reading),
            "social" => Some(Self::Social),
            _ => None,
        }
    }
}

/// Stage of an objective's content template, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Introduction,
    CoreContent,
    Practice,
    Assessment,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Introduction,
        ContentType::CoreContent,
        ContentType::Practice,
        ContentType::Assessment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::CoreContent => "core_content",
            Self::Practice => "practice",
            Self::Assessment => "assessment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilityNeed {
    VisualImpairment,
    HearingImpairment,
    MobilityImpairment,
}

impl AccessibilityNeed {
    pub const ALL: [AccessibilityNeed; 3] = [
        AccessibilityNeed::VisualImpairment,
        AccessibilityNeed::HearingImpairment,
        AccessibilityNeed::MobilityImpairment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisualImpairment => "visual_impairment",
            Self::HearingImpairment => "hearing_impairment",
            Self::MobilityImpairment => "mobility_impairment",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub student_id: String,
    pub grade_level: u8,
    #[serde(default)]
    pub accessibility_needs: Vec<AccessibilityNeed>,
    pub variety_preference: f64,
    /// Declared learning-style hints, most preferred first.
    #[serde(default)]
    pub style_hints: Vec<Modality>,
}

impl LearnerProfile {
    pub fn new(student_id: impl Into<String>, grade_level: u8) -> Self {
        Self {
            student_id: student_id.into(),
            grade_level,
            accessibility_needs: Vec::new(),
            variety_preference: 0.5,
            style_hints: Vec::new(),
        }
    }

    pub fn has_need(&self, need: AccessibilityNeed) -> bool {
        self.accessibility_needs.contains(&need)
    }
}

/// Optional modality signal columns attached to an observation.
///
/// `preference` is the direct preference reading per modality, `corroboration`
/// a weaker engagement reading that supports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSignals {
    #[serde(default)]
    pub preference: BTreeMap<Modality, f64>,
    #[serde(default)]
    pub corroboration: BTreeMap<Modality, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceObservation {
    pub timestamp: DateTime<Utc>,
    pub content_type: ContentType,
    pub score: f64,
    #[serde(default)]
    pub completion_time_minutes: Option<f64>,
    #[serde(default)]
    pub signals: StyleSignals,
}

impl PerformanceObservation {
    pub fn new(timestamp: DateTime<Utc>, content_type: ContentType, score: f64) -> Self {
        Self {
            timestamp,
            content_type,
            score,
            completion_time_minutes: None,
            signals: StyleSignals::default(),
        }
    }

    pub fn with_completion_time(mut self, minutes: f64) -> Self {
        self.completion_time_minutes = Some(minutes);
        self
    }

    pub fn with_preference(mut self, modality: Modality, value: f64) -> Self {
        self.signals.preference.insert(modality, value);
        self
    }

    pub fn with_corroboration(mut self, modality: Modality, value: f64) -> Self {
        self.signals.corroboration.insert(modality, value);
        self
    }
}

/// Scores of the trailing `window` observations, oldest first.
pub fn recent_scores(history: &[PerformanceObservation], window: usize) -> Vec<f64> {
    let start = history.len().saturating_sub(window);
    history[start..].iter().map(|obs| obs.score).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResources {
    #[serde(default)]
    pub diagrams: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub podcasts: Vec<String>,
    #[serde(default)]
    pub interactive_elements: Vec<String>,
    #[serde(default)]
    pub hands_on_activities: Vec<String>,
    #[serde(default)]
    pub reading_materials: Vec<String>,
    #[serde(default)]
    pub group_activities: Vec<String>,
}

/// Presentation switches. `None` means the catalog left the choice open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationFlags {
    #[serde(default)]
    pub narration: Option<bool>,
    #[serde(default)]
    pub detailed_text: Option<bool>,
    #[serde(default)]
    pub peer_feedback: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityFeatures {
    pub audio_descriptions: bool,
    pub text_alternatives: bool,
    pub captions: bool,
    pub transcripts: bool,
    pub keyboard_navigation: bool,
    pub voice_control: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetails {
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    /// Named time limits in minutes.
    #[serde(default)]
    pub time_limits: BTreeMap<String, f64>,
    #[serde(default)]
    pub media: MediaResources,
    #[serde(default)]
    pub presentation: PresentationFlags,
    #[serde(default)]
    pub alternative_formats: Vec<String>,
    #[serde(default)]
    pub bonus_materials: Vec<String>,
    #[serde(default)]
    pub accessibility: AccessibilityFeatures,
    /// Forward-compatible metadata the engine passes through untouched.
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub content_type: ContentType,
    pub base_difficulty: f64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub estimated_duration_minutes: f64,
    pub modality: Modality,
    #[serde(default)]
    pub details: ContentDetails,
}

impl ContentItem {
    pub fn new(
        id: impl Into<String>,
        content_type: ContentType,
        modality: Modality,
        base_difficulty: f64,
        estimated_duration_minutes: f64,
    ) -> Self {
        Self {
            id: id.into(),
            content_type,
            base_difficulty,
            prerequisites: Vec::new(),
            estimated_duration_minutes,
            modality,
            details: ContentDetails::default(),
        }
    }

    pub fn with_prerequisite(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.prerequisites.contains(&id) {
            self.prerequisites.push(id);
        }
        self
    }

    pub fn with_time_limit(mut self, name: impl Into<String>, minutes: f64) -> Self {
        self.details.time_limits.insert(name.into(), minutes);
        self
    }

    pub fn placeholder_id(objective: &str, stage: ContentType, modality: Modality) -> String {
        format!("{}_{}_{}", objective, stage.as_str(), modality.as_str())
    }
}
