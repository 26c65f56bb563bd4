//! The value model passed between pipeline stages.
//!
//! [`Value`] is a tagged union over everything a stage can consume or
//! produce: a scalar, a fixed-length sensor sample, an owned matrix, or a
//! non-copying windowed view. Every consumption site dispatches with an
//! exhaustive `match`; there is no inspection-based downcasting.

use smallvec::SmallVec;

pub mod matrix;
pub mod view;

pub use matrix::Matrix;
pub use view::{ViewSource, WindowRange, WindowedView};

/// One sensor sample: a fixed-length ordered sequence of floats.
///
/// Inline storage covers the common 3-4 axis case without a heap
/// allocation.
pub type Sample = SmallVec<[f32; 4]>;

/// Errors raised by the value model and windowed views.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// An index exceeded the addressable size.
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The requested index or offset.
        index: usize,
        /// The addressable size at the time of the call.
        len: usize,
    },

    /// A window range was inverted or extended past the container.
    #[error("invalid window range: {reason}")]
    InvalidRange {
        /// Description of the violated bound.
        reason: String,
    },

    /// A one-dimensional accessor was used on a view that is neither a
    /// single row nor a single column.
    #[error("invalid shape: {rows}x{cols} view has no one-dimensional accessor")]
    InvalidShape {
        /// View row count.
        rows: usize,
        /// View column count.
        cols: usize,
    },

    /// Rows of differing lengths were supplied to a matrix constructor.
    #[error("ragged rows: expected {expected} columns, row {row} has {actual}")]
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Column count established by the first row.
        expected: usize,
        /// Column count of the offending row.
        actual: usize,
    },
}

/// The polymorphic payload passed between stages.
#[derive(Debug)]
pub enum Value {
    /// A single derived value (a feature, a detected peak).
    Scalar(f32),
    /// One sensor sample.
    Sample(Sample),
    /// An owned two-dimensional block of values.
    Matrix(Matrix),
    /// A read-only projection over a shared container.
    View(WindowedView),
}

impl Value {
    /// Total element count: 1 for a scalar, the length for a sample,
    /// `rows * cols` for matrices and views.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Sample(sample) => sample.len(),
            Self::Matrix(matrix) => matrix.size(),
            Self::View(view) => view.size(),
        }
    }

    /// Row-major flattened element access across every variant.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfRange`] past [`size()`](Self::size).
    pub fn element(&self, index: usize) -> Result<f32, DataError> {
        match self {
            Self::Scalar(value) => {
                if index == 0 {
                    Ok(*value)
                } else {
                    Err(DataError::IndexOutOfRange { index, len: 1 })
                }
            }
            Self::Sample(sample) => {
                sample
                    .get(index)
                    .copied()
                    .ok_or(DataError::IndexOutOfRange {
                        index,
                        len: sample.len(),
                    })
            }
            Self::Matrix(matrix) => {
                let cols = matrix.num_columns();
                if cols == 0 || index >= matrix.size() {
                    return Err(DataError::IndexOutOfRange {
                        index,
                        len: matrix.size(),
                    });
                }
                matrix.get(index / cols, index % cols)
            }
            Self::View(view) => view.element(index),
        }
    }

    /// Returns the scalar payload, or `None` for other variants.
    #[must_use]
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the sample payload, or `None` for other variants.
    #[must_use]
    pub fn as_sample(&self) -> Option<&Sample> {
        match self {
            Self::Sample(sample) => Some(sample),
            _ => None,
        }
    }

    /// Returns the view payload, or `None` for other variants.
    #[must_use]
    pub fn as_view(&self) -> Option<&WindowedView> {
        match self {
            Self::View(view) => Some(view),
            _ => None,
        }
    }

    /// The variant name, used in shape-mismatch diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Sample(_) => "sample",
            Self::Matrix(_) => "matrix",
            Self::View(_) => "view",
        }
    }
}

/// Cloning is always deep: a `View` materializes into an owned `Sample`
/// (single row) or `Matrix`, independent of the source container, since the
/// view's validity is tied to a container with its own lifetime.
impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Self::Scalar(value) => Self::Scalar(*value),
            Self::Sample(sample) => Self::Sample(sample.clone()),
            Self::Matrix(matrix) => Self::Matrix(matrix.clone()),
            Self::View(view) => view.materialize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CircularBuffer;
    use smallvec::smallvec;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_sizes() {
        assert_eq!(Value::Scalar(1.0).size(), 1);
        assert_eq!(Value::Sample(smallvec![1.0, 2.0]).size(), 2);
        assert_eq!(Value::Matrix(Matrix::zeros(2, 3)).size(), 6);
    }

    #[test]
    fn test_element_access() {
        let value = Value::Sample(smallvec![5.0, 6.0]);
        assert_eq!(value.element(1), Ok(6.0));
        assert_eq!(
            value.element(2),
            Err(DataError::IndexOutOfRange { index: 2, len: 2 })
        );

        let matrix = Value::Matrix(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
        assert_eq!(matrix.element(2), Ok(3.0));
    }

    #[test]
    fn test_scalar_accessors() {
        let value = Value::Scalar(2.5);
        assert_eq!(value.as_scalar(), Some(2.5));
        assert_eq!(value.element(0), Ok(2.5));
        assert!(value.as_sample().is_none());
        assert_eq!(value.kind(), "scalar");
    }

    #[test]
    fn test_view_clone_is_deep() {
        let mut buffer = CircularBuffer::new(4).unwrap();
        buffer.push(Sample::from_slice(&[1.0, 2.0, 3.0]));
        let buffer = Rc::new(RefCell::new(buffer));

        let view = WindowedView::new(
            ViewSource::Buffer(Rc::clone(&buffer)),
            WindowRange::new(0, 0, vec![0, 2]),
        )
        .unwrap();
        let value = Value::View(view);
        let cloned = value.clone();

        // Single-row views materialize as samples.
        assert_eq!(cloned.as_sample(), Some(&Sample::from_slice(&[1.0, 3.0])));

        // Mutating the source container does not change the clone.
        for _ in 0..4 {
            buffer.borrow_mut().push(Sample::from_slice(&[9.0, 9.0, 9.0]));
        }
        assert_eq!(cloned.as_sample(), Some(&Sample::from_slice(&[1.0, 3.0])));
        // The live view now addresses the newer data.
        assert_eq!(value.element(0), Ok(9.0));
    }

    #[test]
    fn test_multi_row_view_clones_to_matrix() {
        let mut buffer = CircularBuffer::new(4).unwrap();
        buffer.push(Sample::from_slice(&[1.0, 2.0]));
        buffer.push(Sample::from_slice(&[3.0, 4.0]));
        let buffer = Rc::new(RefCell::new(buffer));

        let view = WindowedView::new(
            ViewSource::Buffer(buffer),
            WindowRange::new(0, 1, vec![1, 0]),
        )
        .unwrap();
        let cloned = Value::View(view).clone();
        match cloned {
            Value::Matrix(matrix) => {
                assert_eq!(matrix.get(0, 0), Ok(2.0));
                assert_eq!(matrix.get(1, 1), Ok(3.0));
            }
            other => panic!("expected matrix, got {}", other.kind()),
        }
    }
}
