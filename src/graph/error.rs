//! Error types for pipeline graph construction and traversal.

use crate::stage::StageError;

/// Errors that can occur while building or running a stage graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The graph contains a cycle involving the named stage.
    #[error("cycle detected involving stage: {0}")]
    CycleDetected(String),

    /// An edge or a traversal root references a stage that does not exist.
    #[error("stage not found: {0}")]
    StageNotFound(String),

    /// A stage with the same name already exists.
    #[error("duplicate stage name: {0}")]
    DuplicateStage(String),

    /// The graph is empty (no stages).
    #[error("empty pipeline: no stages")]
    EmptyGraph,

    /// The graph is full: stage ids are 32-bit indices.
    #[error("stage capacity exceeded at {0} stages")]
    TooManyStages(usize),

    /// A stage failed during traversal; the whole traversal is aborted and
    /// the failure surfaced to the caller.
    #[error("stage '{stage}' failed: {source}")]
    StageFailed {
        /// Name of the failing stage.
        stage: String,
        /// The underlying stage error.
        #[source]
        source: StageError,
    },
}

impl GraphError {
    /// True when the traversal failed only because a stage has not yet
    /// accumulated enough samples — routine during pipeline warm-up.
    #[must_use]
    pub fn is_warmup(&self) -> bool {
        matches!(self, Self::StageFailed { source, .. } if source.is_warmup())
    }
}
