//! Pipeline graph: topology, construction, and execution.
//!
//! A pipeline is a directed acyclic graph of [`Stage`](crate::stage::Stage)
//! implementations. [`PipelineBuilder`] assembles the graph,
//! [`StageGraph`] stores it, and [`PipelineExecutor`] pushes values through
//! it depth-first, sharing fan-out values by reference count and collecting
//! terminal outputs.

mod builder;
mod error;
mod executor;
mod topology;

pub use builder::{FanOutBuilder, PipelineBuilder};
pub use error::GraphError;
pub use executor::{ExecutorConfig, ExecutorMetrics, PipelineExecutor};
pub use topology::{StageGraph, StageId};
