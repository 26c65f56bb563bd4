//! Fluent construction of stage graphs.
//!
//! [`PipelineBuilder`] chains stages linearly by default and supports
//! fan-out points where one stage's output feeds several branches.

use crate::stage::Stage;

use super::{GraphError, StageGraph};

/// Builds a [`StageGraph`] stage by stage.
///
/// Each call to [`stage`](Self::stage) appends a node and, unless the chain
/// was broken by [`fan_out`](Self::fan_out), wires it after the previous
/// stage. Arbitrary edges can be added with [`connect`](Self::connect).
///
/// Name and edge resolution is deferred to [`build`](Self::build), so stages
/// may be referenced before they are declared.
#[derive(Default)]
pub struct PipelineBuilder {
    nodes: Vec<(String, Box<dyn Stage>)>,
    edges: Vec<(String, String)>,
    last: Option<String>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named stage, chained after the previously added stage.
    #[must_use]
    pub fn stage(mut self, name: impl Into<String>, stage: impl Stage + 'static) -> Self {
        let name = name.into();
        if let Some(prev) = self.last.take() {
            self.edges.push((prev, name.clone()));
        }
        self.nodes.push((name.clone(), Box::new(stage)));
        self.last = Some(name);
        self
    }

    /// Adds an explicit edge between two named stages.
    #[must_use]
    pub fn connect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Fans the output of `source` out to several branches.
    ///
    /// Each branch started inside the closure is wired after `source`.
    /// The implicit chain is broken afterwards; follow up with
    /// [`connect`](Self::connect) to join branches back together.
    #[must_use]
    pub fn fan_out(
        mut self,
        source: impl Into<String>,
        f: impl FnOnce(FanOutBuilder<'_>) -> FanOutBuilder<'_>,
    ) -> Self {
        let source = source.into();
        let fan = FanOutBuilder {
            builder: &mut self,
            source,
        };
        f(fan);
        self.last = None;
        self
    }

    /// Resolves names, wires edges, and validates the resulting graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateStage`] for repeated names,
    /// [`GraphError::StageNotFound`] for edges naming unknown stages, and
    /// [`GraphError::EmptyGraph`] or [`GraphError::CycleDetected`] from
    /// validation.
    pub fn build(self) -> Result<StageGraph, GraphError> {
        let mut graph = StageGraph::new();
        for (name, stage) in self.nodes {
            graph.add_stage(name, stage)?;
        }
        for (from, to) in self.edges {
            let from_id = graph
                .stage_id(&from)
                .ok_or(GraphError::StageNotFound(from))?;
            let to_id = graph.stage_id(&to).ok_or(GraphError::StageNotFound(to))?;
            graph.connect(from_id, to_id)?;
        }
        graph.validate()?;
        Ok(graph)
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.nodes.len())
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

/// Declares the branches of a fan-out point; see
/// [`PipelineBuilder::fan_out`].
#[derive(Debug)]
pub struct FanOutBuilder<'a> {
    builder: &'a mut PipelineBuilder,
    source: String,
}

impl FanOutBuilder<'_> {
    /// Starts a branch with the given stage, wired after the fan-out source.
    #[must_use]
    pub fn branch(self, name: impl Into<String>, stage: impl Stage + 'static) -> Self {
        let name = name.into();
        self.builder.edges.push((self.source.clone(), name.clone()));
        self.builder.nodes.push((name, Box::new(stage)));
        self
    }
}
