//! Personalized learning path assembly and content adaptation.
//!
//! - [`modeling`] infers a learner's style signature and score trends.
//! - [`path`] orders catalog content so prerequisites come first, then by fit.
//! - [`adaptation`] tailors the active content item to the learner.
//! - [`orchestrator`] ties the three together and keeps an adaptation history.

pub mod adaptation;
pub mod config;
pub mod error;
pub mod logging;
pub mod modeling;
pub mod orchestrator;
pub mod path;
pub mod types;

pub use adaptation::{AdaptedContent, ContentAdapter};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use modeling::{StyleAnalyzer, StyleSignature};
pub use orchestrator::{AdaptiveOrchestrator, LearningExperience};
pub use path::{ContentCatalog, InMemoryCatalog, LearningPath, PathAssembler};
pub use types::*;
