use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::ContentItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathState {
    NotStarted,
    InProgress,
    Complete,
}

impl PathState {
    pub const fn as_str(self) -> &'static str {
        match self {
            PathState::NotStarted => "not_started",
            PathState::InProgress => "in_progress",
            PathState::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNode {
    pub content: ContentItem,
    pub preference_score: f64,
    pub completion_rate: f64,
    pub success_rate: f64,
    pub engagement_score: f64,
}

impl PathNode {
    pub fn new(content: ContentItem, preference_score: f64) -> Self {
        Self {
            content,
            preference_score,
            completion_rate: 0.0,
            success_rate: 0.0,
            engagement_score: 0.0,
        }
    }
}

/// Ordered nodes with a forward-only cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    nodes: Vec<PathNode>,
    current_index: Option<usize>,
    completed: bool,
}

impl LearningPath {
    pub fn new(nodes: Vec<PathNode>) -> Self {
        Self {
            nodes,
            current_index: None,
            completed: false,
        }
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_node(&self) -> Option<&PathNode> {
        self.current_index.and_then(|i| self.nodes.get(i))
    }

    pub fn state(&self) -> PathState {
        match (self.current_index, self.completed) {
            (None, _) => PathState::NotStarted,
            (Some(_), false) => PathState::InProgress,
            (Some(_), true) => PathState::Complete,
        }
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.completed {
            return 100.0;
        }
        match self.current_index {
            Some(i) if !self.nodes.is_empty() => i as f64 / self.nodes.len() as f64 * 100.0,
            _ => 0.0,
        }
    }

    /// Places the cursor on the first node.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.state() != PathState::NotStarted {
            return Err(self.state_error(PathState::NotStarted));
        }
        if self.nodes.is_empty() {
            return Err(EngineError::OutOfRange { index: 0, len: 0 });
        }
        self.current_index = Some(0);
        Ok(())
    }

    /// Moves the cursor one node forward and returns the new index.
    pub fn advance_to_next_node(&mut self) -> EngineResult<usize> {
        let Some(index) = self.current_index.filter(|_| !self.completed) else {
            return Err(self.state_error(PathState::InProgress));
        };

        let next = index + 1;
        if next >= self.nodes.len() {
            return Err(EngineError::OutOfRange {
                index: next,
                len: self.nodes.len(),
            });
        }

        self.current_index = Some(next);
        Ok(next)
    }

    /// Marks the path finished. Only valid on the last node.
    pub fn mark_complete(&mut self) -> EngineResult<()> {
        match self.current_index {
            Some(i) if !self.completed && i + 1 == self.nodes.len() => {
                self.completed = true;
                Ok(())
            }
            Some(_) if !self.completed => Err(EngineError::InvalidState {
                expected: "cursor on last node",
                actual: PathState::InProgress.as_str(),
            }),
            _ => Err(self.state_error(PathState::InProgress)),
        }
    }

    pub fn update_node_progress(
        &mut self,
        index: usize,
        completion_rate: f64,
        success_rate: f64,
        engagement_score: f64,
    ) -> EngineResult<()> {
        let len = self.nodes.len();
        for (field, value) in [
            ("completion_rate", completion_rate),
            ("success_rate", success_rate),
            ("engagement_score", engagement_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidProgress { field, value });
            }
        }

        let node = self
            .nodes
            .get_mut(index)
            .ok_or(EngineError::OutOfRange { index, len })?;
        node.completion_rate = completion_rate;
        node.success_rate = success_rate;
        node.engagement_score = engagement_score;
        Ok(())
    }

    fn state_error(&self, expected: PathState) -> EngineError {
        EngineError::InvalidState {
            expected: expected.as_str(),
            actual: self.state().as_str(),
        }
    }
}
