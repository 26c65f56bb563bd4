//! Window selection over a bound container.

use std::cell::RefCell;
use std::rc::Rc;

use crate::buffer::CircularBuffer;
use crate::data::{Matrix, Sample, Value, ViewSource, WindowRange, WindowedView};

use super::{Stage, StageError};

/// Re-issues a [`WindowedView`] over a bound container on each execution.
///
/// The input value is ignored: the selector is bound to its container at
/// construction time and re-derives the absolute row range every cycle, so
/// a selector behind a circular-buffer ingestion stage always addresses the
/// current window contents.
pub struct Selector {
    source: ViewSource,
    start_row: usize,
    end_row: usize,
    column_indices: Vec<usize>,
}

impl Selector {
    /// Creates a selector over `source` for rows `start_row..=end_row` and
    /// the given columns.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidConfiguration`] if the row range is
    /// inverted. Column indices are validated against the container's live
    /// state at each execution, not here.
    pub fn new(
        source: ViewSource,
        start_row: usize,
        end_row: usize,
        column_indices: Vec<usize>,
    ) -> Result<Self, StageError> {
        if start_row > end_row {
            return Err(StageError::InvalidConfiguration {
                reason: format!("start_row {start_row} exceeds end_row {end_row}"),
            });
        }
        Ok(Self {
            source,
            start_row,
            end_row,
            column_indices,
        })
    }

    /// Convenience constructor binding a circular buffer, typically
    /// obtained from [`BufferedIngestion::buffer`](super::BufferedIngestion::buffer).
    ///
    /// # Errors
    ///
    /// Same conditions as [`Selector::new`].
    pub fn over_buffer(
        buffer: Rc<RefCell<CircularBuffer<Sample>>>,
        start_row: usize,
        end_row: usize,
        column_indices: Vec<usize>,
    ) -> Result<Self, StageError> {
        Self::new(ViewSource::Buffer(buffer), start_row, end_row, column_indices)
    }

    /// Convenience constructor binding a shared matrix.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Selector::new`].
    pub fn over_matrix(
        matrix: Rc<Matrix>,
        start_row: usize,
        end_row: usize,
        column_indices: Vec<usize>,
    ) -> Result<Self, StageError> {
        Self::new(ViewSource::Matrix(matrix), start_row, end_row, column_indices)
    }
}

impl Stage for Selector {
    fn execute(&mut self, _input: &Value) -> Result<Option<Value>, StageError> {
        let available = self.source.num_rows();
        if self.end_row >= available {
            return Err(StageError::InsufficientData {
                needed: self.end_row + 1,
                available,
            });
        }
        let view = WindowedView::new(
            self.source.clone(),
            WindowRange::new(self.start_row, self.end_row, self.column_indices.clone()),
        )?;
        Ok(Some(Value::View(view)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(rows: &[[f32; 3]]) -> Rc<RefCell<CircularBuffer<Sample>>> {
        let mut buffer = CircularBuffer::new(8).unwrap();
        for row in rows {
            buffer.push(Sample::from_slice(row));
        }
        Rc::new(RefCell::new(buffer))
    }

    #[test]
    fn test_selects_window() {
        let buffer = buffer_with(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut selector = Selector::over_buffer(buffer, 0, 1, vec![0, 2]).unwrap();

        let out = selector.execute(&Value::Scalar(0.0)).unwrap().unwrap();
        let view = out.as_view().unwrap();
        assert_eq!(view.num_rows(), 2);
        assert_eq!(view.at(1, 1), Ok(6.0));
    }

    #[test]
    fn test_insufficient_data_during_warmup() {
        let buffer = buffer_with(&[[1.0, 2.0, 3.0]]);
        let mut selector = Selector::over_buffer(buffer, 0, 4, vec![0]).unwrap();

        let err = selector.execute(&Value::Scalar(0.0)).unwrap_err();
        assert_eq!(
            err,
            StageError::InsufficientData {
                needed: 5,
                available: 1
            }
        );
        assert!(err.is_warmup());
    }

    #[test]
    fn test_inverted_range_rejected_at_construction() {
        let buffer = buffer_with(&[]);
        assert!(Selector::over_buffer(buffer, 2, 1, vec![0]).is_err());
    }

    #[test]
    fn test_bad_column_surfaces_as_range_error() {
        let buffer = buffer_with(&[[1.0, 2.0, 3.0]]);
        let mut selector = Selector::over_buffer(buffer, 0, 0, vec![7]).unwrap();
        let err = selector.execute(&Value::Scalar(0.0)).unwrap_err();
        assert!(matches!(err, StageError::Data(_)));
        assert!(!err.is_warmup());
    }

    #[test]
    fn test_matrix_selector() {
        let matrix = Rc::new(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
        let mut selector = Selector::over_matrix(matrix, 1, 1, vec![0, 1]).unwrap();
        let out = selector.execute(&Value::Scalar(0.0)).unwrap().unwrap();
        assert_eq!(out.as_view().unwrap().at_flat(1), Ok(4.0));
    }
}
