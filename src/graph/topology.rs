//! Stage graph topology: compact node storage with name-based lookup.
//!
//! Stages are stored in a flat `Vec` and addressed by [`StageId`] (an index
//! newtype). Adjacency lists are inline `SmallVec`s, sized for the common
//! case of one or two successors per stage.

use std::fmt;

use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::stage::Stage;
use crate::Value;

use super::GraphError;

/// Identifier for a stage within a [`StageGraph`].
///
/// Ids are dense indices assigned in insertion order and are only meaningful
/// for the graph that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub u32);

impl StageId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage#{}", self.0)
    }
}

/// A single node in the graph: a named stage plus its outgoing edges.
pub(crate) struct StageNode {
    pub(crate) id: StageId,
    pub(crate) name: String,
    pub(crate) stage: Box<dyn Stage>,
    pub(crate) successors: SmallVec<[StageId; 4]>,
}

impl fmt::Debug for StageNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("successors", &self.successors)
            .finish_non_exhaustive()
    }
}

/// A directed acyclic graph of processing stages.
///
/// Nodes are added with [`add_stage`](Self::add_stage) and wired with
/// [`connect`](Self::connect). Most callers build graphs through
/// [`PipelineBuilder`](super::PipelineBuilder) instead of using this type
/// directly.
#[derive(Debug, Default)]
pub struct StageGraph {
    nodes: Vec<StageNode>,
    name_index: FxHashMap<String, StageId>,
}

impl StageGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named stage and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateStage`] if a stage with the same name
    /// already exists, or [`GraphError::TooManyStages`] once the graph
    /// exhausts the 32-bit id space.
    pub fn add_stage(
        &mut self,
        name: impl Into<String>,
        stage: Box<dyn Stage>,
    ) -> Result<StageId, GraphError> {
        let name = name.into();
        if self.name_index.contains_key(&name) {
            return Err(GraphError::DuplicateStage(name));
        }
        let id = u32::try_from(self.nodes.len())
            .map(StageId)
            .map_err(|_| GraphError::TooManyStages(self.nodes.len()))?;
        self.name_index.insert(name.clone(), id);
        self.nodes.push(StageNode {
            id,
            name,
            stage,
            successors: SmallVec::new(),
        });
        Ok(id)
    }

    /// Adds a directed edge so that `from`'s output feeds `to`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StageNotFound`] if either id is unknown, or
    /// [`GraphError::CycleDetected`] for a self-loop. Longer cycles are
    /// caught by [`validate`](Self::validate).
    pub fn connect(&mut self, from: StageId, to: StageId) -> Result<(), GraphError> {
        if from == to {
            return Err(GraphError::CycleDetected(self.stage_name(from).to_owned()));
        }
        if to.index() >= self.nodes.len() {
            return Err(GraphError::StageNotFound(to.to_string()));
        }
        let Some(node) = self.nodes.get_mut(from.index()) else {
            return Err(GraphError::StageNotFound(from.to_string()));
        };
        if !node.successors.contains(&to) {
            node.successors.push(to);
        }
        Ok(())
    }

    /// Looks up a stage id by name.
    #[must_use]
    pub fn stage_id(&self, name: &str) -> Option<StageId> {
        self.name_index.get(name).copied()
    }

    /// Returns the name of a stage, or `"?"` for an unknown id.
    #[must_use]
    pub fn stage_name(&self, id: StageId) -> &str {
        self.nodes.get(id.index()).map_or("?", |n| n.name.as_str())
    }

    /// Successors of a stage, in the order their edges were added.
    #[must_use]
    pub fn successors(&self, id: StageId) -> &[StageId] {
        self.nodes.get(id.index()).map_or(&[], |n| &n.successors)
    }

    /// Number of stages in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when the stage has no outgoing edges.
    #[must_use]
    pub fn is_terminal(&self, id: StageId) -> bool {
        self.successors(id).is_empty()
    }

    /// Runs a single stage against `input`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StageNotFound`] for an unknown id, or
    /// [`GraphError::StageFailed`] wrapping the stage's own error.
    pub fn execute_stage(
        &mut self,
        id: StageId,
        input: &Value,
    ) -> Result<Option<Value>, GraphError> {
        let Some(node) = self.nodes.get_mut(id.index()) else {
            return Err(GraphError::StageNotFound(id.to_string()));
        };
        node.stage
            .execute(input)
            .map_err(|source| GraphError::StageFailed {
                stage: node.name.clone(),
                source,
            })
    }

    /// Checks that the graph is non-empty and acyclic.
    ///
    /// Cycle detection is Kahn's algorithm: repeatedly remove zero-in-degree
    /// nodes; any node left over sits on a cycle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyGraph`] or [`GraphError::CycleDetected`]
    /// naming a stage on the cycle.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let mut in_degree = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            for succ in &node.successors {
                in_degree[succ.index()] += 1;
            }
        }

        let mut ready: Vec<StageId> = self
            .nodes
            .iter()
            .filter(|n| in_degree[n.id.index()] == 0)
            .map(|n| n.id)
            .collect();
        let mut visited = 0usize;

        while let Some(id) = ready.pop() {
            visited += 1;
            for &succ in self.successors(id) {
                in_degree[succ.index()] -= 1;
                if in_degree[succ.index()] == 0 {
                    ready.push(succ);
                }
            }
        }

        if visited != self.nodes.len() {
            let stuck = self
                .nodes
                .iter()
                .find(|n| in_degree[n.id.index()] > 0)
                .map_or_else(|| "?".to_owned(), |n| n.name.clone());
            return Err(GraphError::CycleDetected(stuck));
        }
        Ok(())
    }
}
