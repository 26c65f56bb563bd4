//! Pipeline stages: the unit of computation.
//!
//! Every stage implements [`Stage::execute`]: consume one [`Value`], produce
//! zero or one. `Ok(None)` means the stage withheld output for this input
//! (for example, an ingestion stage between notification points), and
//! traversal does not continue past it this cycle.
//!
//! ## Stage catalog
//!
//! - [`BufferedIngestion`]: circular-buffer ingestion with interval/offset
//!   notification (sliding-window segmentation)
//! - [`Selector`]: re-issues a windowed view over a bound container
//! - [`Magnitude`], [`Mean`], [`Minimum`], [`StandardDeviation`]: feature
//!   extraction leaves
//! - [`PeakDetector`]: debounced local-maximum event detection

use crate::buffer::BufferError;
use crate::data::{DataError, Value};

pub mod features;
pub mod ingest;
pub mod peak;
pub mod select;

pub use features::{Magnitude, Mean, Minimum, StandardDeviation};
pub use ingest::BufferedIngestion;
pub use peak::{PeakDetector, PeakState};
pub use select::Selector;

/// Errors raised by stage construction and execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// Bad constructor arguments. Fatal at construction, never recovered.
    #[error("invalid stage configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the rejected argument.
        reason: String,
    },

    /// The input had a valid variant but the wrong element count.
    #[error("input has {actual} elements, expected {expected}")]
    InvalidInputShape {
        /// Element count the stage requires.
        expected: usize,
        /// Element count of the offending input.
        actual: usize,
    },

    /// The input variant cannot be consumed by this stage.
    #[error("unsupported input: expected {expected}, got {actual}")]
    UnsupportedInput {
        /// Variant the stage consumes.
        expected: &'static str,
        /// Variant that arrived.
        actual: &'static str,
    },

    /// A statistic was requested over zero elements.
    #[error("empty input")]
    EmptyInput,

    /// Not enough samples have accumulated yet. Expected and recoverable
    /// during pipeline warm-up; see [`StageError::is_warmup`].
    #[error("insufficient data: need {needed} samples, have {available}")]
    InsufficientData {
        /// Samples the operation requires.
        needed: usize,
        /// Samples currently available.
        available: usize,
    },

    /// Buffer access failed.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// Value model or view access failed.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl StageError {
    /// True for the routine buffer-not-yet-full condition, which callers
    /// should treat as "keep feeding samples" rather than misuse.
    #[must_use]
    pub fn is_warmup(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// The unit of computation in a pipeline.
///
/// Stages are wired into a graph by the builder and invoked by the
/// executor; they never call each other directly.
pub trait Stage {
    /// Consumes one value and produces zero or one.
    ///
    /// # Errors
    ///
    /// Returns a [`StageError`] on misuse (wrong variant or shape) or when
    /// a statistic cannot be computed; `Ok(None)` is the non-error
    /// "no output this cycle" case.
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError>;
}
