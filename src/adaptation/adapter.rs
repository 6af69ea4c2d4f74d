use crate::adaptation::{AdaptationStep, AdaptedContent, Modification};
use crate::config::{AdaptationConfig, DifficultyParams};
use crate::modeling::StyleSignature;
use crate::types::{
    mean, recent_scores, AccessibilityNeed, ContentItem, LearnerProfile, Modality,
    PerformanceObservation,
};

#[derive(Default)]
struct ModificationLog {
    entries: Vec<Modification>,
}

impl ModificationLog {
    fn record(&mut self, step: AdaptationStep, field: &str, change: impl Into<String>) {
        self.entries.push(Modification {
            step,
            field: field.to_string(),
            change: change.into(),
        });
    }
}

/// Tailors a single catalog item to a learner.
///
/// Steps always run in the order difficulty, format, pacing, variety,
/// accessibility. Accessibility runs last so nothing earlier can strip it.
pub struct ContentAdapter {
    config: AdaptationConfig,
}

impl ContentAdapter {
    pub fn new(config: AdaptationConfig) -> Self {
        Self { config }
    }

    pub fn adapt(
        &self,
        item: &ContentItem,
        profile: &LearnerProfile,
        history: &[PerformanceObservation],
        style: &StyleSignature,
    ) -> AdaptedContent {
        let mut content = item.clone();
        let mut log = ModificationLog::default();

        let performance_difficulty = self.performance_difficulty(history);
        let adapted_difficulty = self.target_difficulty(item.base_difficulty, performance_difficulty);
        self.apply_difficulty(&mut content, adapted_difficulty, &mut log);

        self.apply_format(&mut content, style.primary, &mut log);

        let pace_factor = self.pace_factor(history);
        self.apply_pacing(&mut content, pace_factor, &mut log);

        self.apply_variety(&mut content, profile.variety_preference, &mut log);

        self.apply_accessibility(&mut content, profile, &mut log);

        tracing::debug!(
            content_id = %content.id,
            adapted_difficulty,
            pace_factor,
            modifications = log.entries.len(),
            "content adapted"
        );

        AdaptedContent {
            content,
            adapted_difficulty,
            performance_difficulty,
            pace_factor,
            modifications: log.entries,
        }
    }

    pub fn performance_difficulty(&self, history: &[PerformanceObservation]) -> Option<f64> {
        let params = &self.config.difficulty;
        let scores = recent_scores(history, params.performance_window);
        mean(&scores).map(|m| params.performance_difficulty(m))
    }

    pub fn target_difficulty(&self, base_difficulty: f64, performance: Option<f64>) -> f64 {
        let params = &self.config.difficulty;
        let base = if base_difficulty.is_finite() {
            base_difficulty
        } else {
            params.min_difficulty
        };

        let target = match performance {
            Some(perf) => base * params.base_weight + perf * params.performance_weight,
            None => base,
        };

        clamp_difficulty(target, params)
    }

    /// Multiplier from mean completion time against the baseline session length.
    pub fn pace_factor(&self, history: &[PerformanceObservation]) -> f64 {
        let params = &self.config.pacing;
        let times: Vec<f64> = history
            .iter()
            .filter_map(|o| o.completion_time_minutes)
            .filter(|t| t.is_finite() && *t >= 0.0)
            .collect();

        let Some(avg) = mean(&times) else {
            return params.normal_factor;
        };

        let ratio = avg / params.baseline_minutes;
        if ratio < params.fast_ratio {
            params.fast_factor
        } else if ratio > params.slow_ratio {
            params.slow_factor
        } else {
            params.normal_factor
        }
    }

    fn apply_difficulty(&self, content: &mut ContentItem, difficulty: f64, log: &mut ModificationLog) {
        let params = &self.config.difficulty;
        let details = &mut content.details;

        if difficulty < params.easy_band {
            let added = ensure_min_hints(&mut details.hints, params);
            if added > 0 {
                log.record(AdaptationStep::Difficulty, "hints", format!("added {added} hints"));
            }
            if scale_values(details.time_limits.values_mut(), params.easy_time_scale) {
                log.record(
                    AdaptationStep::Difficulty,
                    "time_limits",
                    format!("scaled by {}", params.easy_time_scale),
                );
            }
        } else if difficulty > params.hard_band {
            if details.hints.len() > params.max_hints_when_hard {
                let removed = details.hints.len() - params.max_hints_when_hard;
                details.hints.truncate(params.max_hints_when_hard);
                log.record(AdaptationStep::Difficulty, "hints", format!("removed {removed} hints"));
            }
            if scale_values(details.time_limits.values_mut(), params.hard_time_scale) {
                log.record(
                    AdaptationStep::Difficulty,
                    "time_limits",
                    format!("scaled by {}", params.hard_time_scale),
                );
            }
        }
    }

    fn apply_format(&self, content: &mut ContentItem, primary: Modality, log: &mut ModificationLog) {
        let rules = &self.config.format;
        let details = &mut content.details;
        let media = &mut details.media;

        match primary {
            Modality::Visual => {
                if ensure_entry(&mut media.diagrams, &rules.default_diagram) {
                    log.record(AdaptationStep::Format, "diagrams", "added diagram reference");
                }
                if media.videos.len() > rules.max_videos {
                    media.videos.truncate(rules.max_videos);
                    log.record(
                        AdaptationStep::Format,
                        "videos",
                        format!("capped at {}", rules.max_videos),
                    );
                }
            }
            Modality::Auditory => {
                if ensure_flag(&mut details.presentation.narration) {
                    log.record(AdaptationStep::Format, "narration", "enabled");
                }
                if ensure_entry(&mut media.podcasts, &rules.default_podcast) {
                    log.record(AdaptationStep::Format, "podcasts", "added podcast reference");
                }
            }
            Modality::Kinesthetic => {
                if ensure_entry(&mut media.interactive_elements, &rules.default_interactive) {
                    log.record(AdaptationStep::Format, "interactive_elements", "added interactive element");
                }
                if ensure_entry(&mut media.hands_on_activities, &rules.default_hands_on) {
                    log.record(AdaptationStep::Format, "hands_on_activities", "added hands-on activity");
                }
            }
            Modality::Reading => {
                if ensure_flag(&mut details.presentation.detailed_text) {
                    log.record(AdaptationStep::Format, "detailed_text", "enabled");
                }
                if ensure_entry(&mut media.reading_materials, &rules.default_reading) {
                    log.record(AdaptationStep::Format, "reading_materials", "added reading material");
                }
            }
            Modality::Social => {
                if ensure_entry(&mut media.group_activities, &rules.default_group_activity) {
                    log.record(AdaptationStep::Format, "group_activities", "added group activity");
                }
                if ensure_flag(&mut details.presentation.peer_feedback) {
                    log.record(AdaptationStep::Format, "peer_feedback", "enabled");
                }
            }
        }
    }

    fn apply_pacing(&self, content: &mut ContentItem, pace_factor: f64, log: &mut ModificationLog) {
        if pace_factor == self.config.pacing.normal_factor {
            return;
        }

        content.estimated_duration_minutes *= pace_factor;
        scale_values(content.details.time_limits.values_mut(), pace_factor);
        log.record(
            AdaptationStep::Pacing,
            "estimated_duration_minutes",
            format!("scaled by {pace_factor}"),
        );
    }

    fn apply_variety(&self, content: &mut ContentItem, variety_preference: f64, log: &mut ModificationLog) {
        let params = &self.config.variety;
        let details = &mut content.details;

        if variety_preference > params.high_threshold {
            if details.alternative_formats.is_empty() {
                details.alternative_formats = params.default_alternative_formats.clone();
                log.record(AdaptationStep::Variety, "alternative_formats", "added defaults");
            }
            if details.bonus_materials.is_empty() {
                details.bonus_materials = params.default_bonus_materials.clone();
                log.record(AdaptationStep::Variety, "bonus_materials", "added defaults");
            }
        } else if variety_preference < params.low_threshold {
            if details.alternative_formats.len() > params.max_alternatives_when_low {
                details.alternative_formats.truncate(params.max_alternatives_when_low);
                log.record(
                    AdaptationStep::Variety,
                    "alternative_formats",
                    format!("trimmed to {}", params.max_alternatives_when_low),
                );
            }
            if !details.bonus_materials.is_empty() {
                details.bonus_materials.clear();
                log.record(AdaptationStep::Variety, "bonus_materials", "cleared");
            }
        }
    }

    fn apply_accessibility(
        &self,
        content: &mut ContentItem,
        profile: &LearnerProfile,
        log: &mut ModificationLog,
    ) {
        let features = &mut content.details.accessibility;

        // Repeated declarations of a need collapse to one accommodation.
        for need in AccessibilityNeed::ALL.into_iter().filter(|n| profile.has_need(*n)) {
            match need {
                AccessibilityNeed::VisualImpairment => {
                    features.audio_descriptions = true;
                    features.text_alternatives = true;
                }
                AccessibilityNeed::HearingImpairment => {
                    features.captions = true;
                    features.transcripts = true;
                }
                AccessibilityNeed::MobilityImpairment => {
                    features.keyboard_navigation = true;
                    features.voice_control = true;
                }
            }
            log.record(AdaptationStep::Accessibility, need.as_str(), "accommodations enabled");
        }
    }
}

impl Default for ContentAdapter {
    fn default() -> Self {
        Self::new(AdaptationConfig::default())
    }
}

fn clamp_difficulty(value: f64, params: &DifficultyParams) -> f64 {
    if value.is_nan() {
        return params.min_difficulty;
    }
    value.clamp(params.min_difficulty, params.max_difficulty)
}

fn ensure_min_hints(hints: &mut Vec<String>, params: &DifficultyParams) -> usize {
    let before = hints.len();
    let mut defaults = params.default_hints.iter();

    while hints.len() < params.min_hints_when_easy {
        match defaults.next() {
            Some(hint) if hints.contains(hint) => continue,
            Some(hint) => hints.push(hint.clone()),
            None => hints.push(format!("Hint {}", hints.len() + 1)),
        }
    }

    hints.len() - before
}

/// Adds `default` when the list is empty. Returns whether it was added.
fn ensure_entry(list: &mut Vec<String>, default: &str) -> bool {
    if list.is_empty() {
        list.push(default.to_string());
        return true;
    }
    false
}

/// Enables a flag the catalog left unset. An explicit `false` is kept.
fn ensure_flag(flag: &mut Option<bool>) -> bool {
    if flag.is_none() {
        *flag = Some(true);
        return true;
    }
    false
}

fn scale_values<'a>(values: impl Iterator<Item = &'a mut f64>, factor: f64) -> bool {
    let mut touched = false;
    for value in values {
        *value *= factor;
        touched = true;
    }
    touched
}
