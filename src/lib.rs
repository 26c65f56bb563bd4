//! # Pulseline
//!
//! A small engine for building sensor-data processing pipelines: chains of
//! stages that ingest streaming numeric samples, buffer them in fixed-capacity
//! circular buffers, extract windowed views, and compute derived values
//! (magnitude, mean, peak events).
//!
//! This crate provides:
//! - **Circular buffer**: fixed-capacity, overwrite-oldest storage with
//!   logical (oldest-first) indexing
//! - **Value model**: the tagged-union payload passed between stages
//!   (scalar, sample vector, matrix, windowed view)
//! - **Stages**: ingestion, window selection, feature extraction, and peak
//!   detection, all behind one `execute` contract
//! - **Pipeline graph**: an arena-owned stage graph with a work-stack
//!   executor that shares intermediate values across fan-out
//!
//! ## Example
//!
//! ```rust
//! use pulseline::{
//!     BufferedIngestion, Magnitude, PipelineBuilder, PipelineExecutor,
//!     Selector, Value,
//! };
//! use smallvec::smallvec;
//!
//! # fn main() -> pulseline::Result<()> {
//! let ingestion = BufferedIngestion::new(64, 1, 0)?;
//! let selector = Selector::over_buffer(ingestion.buffer(), 0, 0, vec![0, 1, 2])?;
//!
//! let mut graph = PipelineBuilder::new()
//!     .stage("ingest", ingestion)
//!     .stage("window", selector)
//!     .stage("magnitude", Magnitude)
//!     .build()?;
//!
//! let root = graph.stage_id("ingest").unwrap();
//! let mut executor = PipelineExecutor::new();
//!
//! let outputs = executor.run(&mut graph, root, &Value::Sample(smallvec![3.0, 4.0, 0.0]))?;
//! assert_eq!(outputs[0].as_scalar(), Some(5.0));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod data;
pub mod graph;
pub mod stage;

// Re-export key types
pub use buffer::CircularBuffer;
pub use data::{Matrix, Sample, Value, ViewSource, WindowRange, WindowedView};
pub use graph::{
    ExecutorConfig, ExecutorMetrics, FanOutBuilder, PipelineBuilder, PipelineExecutor, StageGraph,
    StageId,
};
pub use stage::{
    BufferedIngestion, Magnitude, Mean, Minimum, PeakDetector, PeakState, Selector, Stage,
    StandardDeviation,
};

/// Result type for pulseline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pulseline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Circular buffer errors.
    #[error("buffer error: {0}")]
    Buffer(#[from] buffer::BufferError),

    /// Value model and windowed view errors.
    #[error("data error: {0}")]
    Data(#[from] data::DataError),

    /// Stage execution errors.
    #[error("stage error: {0}")]
    Stage(#[from] stage::StageError),

    /// Pipeline graph construction and traversal errors.
    #[error("graph error: {0}")]
    Graph(#[from] graph::GraphError),
}
