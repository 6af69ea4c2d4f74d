pub mod assembler;
pub mod catalog;
pub mod graph;
pub mod learning_path;

pub use assembler::{ContentPreferences, PathAssembler};
pub use catalog::{ContentCatalog, EmptyCatalog, InMemoryCatalog};
pub use graph::{is_topologically_ordered, topological_order, validate_references};
pub use learning_path::{LearningPath, PathNode, PathState};
