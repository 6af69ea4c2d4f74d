pub mod engine;
pub mod history;
pub mod progress;

pub use engine::{AdaptiveOrchestrator, LearningExperience};
pub use history::{AdaptationHistory, AdaptationRecord};
pub use progress::{ProgressSnapshot, ProgressTracker};
