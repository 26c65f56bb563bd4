//! Depth-first pipeline traversal.
//!
//! The executor walks a [`StageGraph`] from a root stage using an explicit
//! work stack. When a stage with several successors produces a value, the
//! value is wrapped in an `Rc` and shared across the branches rather than
//! cloned per branch. Outputs of terminal stages are collected as the
//! traversal result.

use std::rc::Rc;

use crate::Value;

use super::{GraphError, StageGraph, StageId};

/// Traversal policy knobs for [`PipelineExecutor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorConfig {
    /// Stop the traversal as soon as any stage returns no output.
    ///
    /// Off by default: a silent stage only prunes its own subtree, and
    /// sibling branches keep running. Turn this on for strictly linear
    /// pipelines where a withheld value means nothing downstream can fire.
    pub abort_on_empty_output: bool,
}

/// Counters accumulated across [`PipelineExecutor::run`] calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorMetrics {
    /// Stage executions attempted, including any that failed.
    pub stages_executed: u64,
    /// Values routed along edges to successor stages.
    pub values_routed: u64,
    /// Fan-out points hit (a produced value shared by 2+ successors).
    pub fan_out_dispatches: u64,
    /// Stage executions that produced no output.
    pub empty_outputs: u64,
    /// Values collected from terminal stages.
    pub terminal_outputs: u64,
}

/// Runs values through a [`StageGraph`].
///
/// The executor owns no graph state of its own beyond metrics, so one
/// executor can drive any number of graphs.
#[derive(Debug, Default)]
pub struct PipelineExecutor {
    config: ExecutorConfig,
    metrics: ExecutorMetrics,
}

impl PipelineExecutor {
    /// Creates an executor with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor with an explicit configuration.
    #[must_use]
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self {
            config,
            metrics: ExecutorMetrics::default(),
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn metrics(&self) -> ExecutorMetrics {
        self.metrics
    }

    /// Resets all counters to zero.
    pub fn reset_metrics(&mut self) {
        self.metrics = ExecutorMetrics::default();
    }

    /// Pushes `input` into the stage at `root` and traverses the graph
    /// depth-first, returning the outputs of all terminal stages reached.
    ///
    /// Successors are visited in the order their edges were declared. A
    /// stage returning `None` prunes its subtree (or aborts the whole
    /// traversal under
    /// [`abort_on_empty_output`](ExecutorConfig::abort_on_empty_output)).
    ///
    /// Collected outputs are owned values independent of any live
    /// container: a terminal stage producing a [`Value::View`] has it
    /// materialized before it lands in the result vector.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StageNotFound`] for an unknown root, or
    /// [`GraphError::StageFailed`] as soon as any stage fails; remaining
    /// work is abandoned.
    pub fn run(
        &mut self,
        graph: &mut StageGraph,
        root: StageId,
        input: &Value,
    ) -> Result<Vec<Value>, GraphError> {
        let mut results = Vec::new();
        let mut stack: Vec<(StageId, Rc<Value>)> = vec![(root, Rc::new(input.clone()))];

        while let Some((id, value)) = stack.pop() {
            self.metrics.stages_executed += 1;
            let output = graph.execute_stage(id, &value)?;

            let Some(output) = output else {
                self.metrics.empty_outputs += 1;
                if self.config.abort_on_empty_output {
                    tracing::trace!(stage = graph.stage_name(id), "empty output, aborting run");
                    break;
                }
                continue;
            };

            if graph.is_terminal(id) {
                self.metrics.terminal_outputs += 1;
                // Collected results must outlive the run. A view still reads
                // the live container, so it is materialized into an owned
                // value here; owned variants are deposited as-is.
                results.push(match output {
                    Value::View(view) => view.materialize(),
                    owned => owned,
                });
                continue;
            }

            let successors = graph.successors(id);
            if successors.len() > 1 {
                self.metrics.fan_out_dispatches += 1;
            }
            let shared = Rc::new(output);
            // Reverse push so the first-declared successor runs first.
            for &succ in successors.iter().rev() {
                stack.push((succ, Rc::clone(&shared)));
                self.metrics.values_routed += 1;
            }
        }

        tracing::debug!(
            root = graph.stage_name(root),
            stages = self.metrics.stages_executed,
            outputs = results.len(),
            "pipeline run complete"
        );
        Ok(results)
    }

    /// Runs a strictly linear pipeline and returns its single output, if
    /// any. Traversal aborts on the first empty output regardless of the
    /// configured policy.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`run`](Self::run).
    pub fn run_single(
        &mut self,
        graph: &mut StageGraph,
        root: StageId,
        input: &Value,
    ) -> Result<Option<Value>, GraphError> {
        let saved = self.config.abort_on_empty_output;
        self.config.abort_on_empty_output = true;
        let result = self.run(graph, root, input);
        self.config.abort_on_empty_output = saved;
        Ok(result?.into_iter().next())
    }
}
