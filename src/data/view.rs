//! Windowed views: non-copying row-range / column-set projections.
//!
//! A [`WindowedView`] addresses a contiguous logical row range and an
//! explicit, possibly reordered column-index set over a shared container.
//! The view never copies data; it observes the container's live state.
//! A view over a circular buffer does not slide automatically — the owning
//! stage re-derives the absolute row range each time it re-issues a view.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::buffer::CircularBuffer;

use super::{DataError, Matrix, Sample, Value};

/// The container a windowed view projects over.
///
/// Both variants are shared handles: views and selector stages hold clones
/// of the same `Rc`, and the container lives until the last holder releases
/// it.
#[derive(Debug, Clone)]
pub enum ViewSource {
    /// A live circular buffer of sensor samples (rows = logical entries,
    /// columns = sample components).
    Buffer(Rc<RefCell<CircularBuffer<Sample>>>),
    /// An immutable shared matrix.
    Matrix(Rc<Matrix>),
}

impl ViewSource {
    /// Current number of addressable rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        match self {
            Self::Buffer(buffer) => buffer.borrow().len(),
            Self::Matrix(matrix) => matrix.num_rows(),
        }
    }

    /// Current number of addressable columns.
    ///
    /// For a buffer this is the width of the stored samples (0 when empty);
    /// the ingestion stage enforces a uniform width across entries.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        match self {
            Self::Buffer(buffer) => buffer.borrow().front().map_or(0, SmallVec::len),
            Self::Matrix(matrix) => matrix.num_columns(),
        }
    }

    /// Reads one element by absolute row and column, or `None` out of range.
    fn get(&self, row: usize, col: usize) -> Option<f32> {
        match self {
            Self::Buffer(buffer) => buffer.borrow().get(row).ok()?.get(col).copied(),
            Self::Matrix(matrix) => matrix.get(row, col).ok(),
        }
    }
}

/// Describes a view: an inclusive logical row range plus an ordered column
/// index set that may subset, reorder, or duplicate source columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRange {
    /// First logical row of the window (inclusive).
    pub start_row: usize,
    /// Last logical row of the window (inclusive).
    pub end_row: usize,
    /// Source column positions addressed by the window, in view order.
    pub column_indices: Vec<usize>,
}

impl WindowRange {
    /// Creates a range over rows `start_row..=end_row` and the given columns.
    #[must_use]
    pub fn new(start_row: usize, end_row: usize, column_indices: Vec<usize>) -> Self {
        Self {
            start_row,
            end_row,
            column_indices,
        }
    }

    /// Number of addressable rows, `end_row - start_row + 1`.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of addressable columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.column_indices.len()
    }
}

/// A read-only projection over a shared container.
///
/// Validation is eager: the row range and every column index are checked
/// against the container at construction time, so misuse fails fast rather
/// than at first access.
#[derive(Debug, Clone)]
pub struct WindowedView {
    source: ViewSource,
    range: WindowRange,
}

impl WindowedView {
    /// Creates a validated view over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidRange`] if the row range is inverted,
    /// extends past the container's current row count, or any column index
    /// is outside the container's column count.
    pub fn new(source: ViewSource, range: WindowRange) -> Result<Self, DataError> {
        if range.start_row > range.end_row {
            return Err(DataError::InvalidRange {
                reason: format!(
                    "start_row {} exceeds end_row {}",
                    range.start_row, range.end_row
                ),
            });
        }
        let rows = source.num_rows();
        if range.end_row >= rows {
            return Err(DataError::InvalidRange {
                reason: format!("end_row {} outside container with {rows} rows", range.end_row),
            });
        }
        let cols = source.num_columns();
        for &col in &range.column_indices {
            if col >= cols {
                return Err(DataError::InvalidRange {
                    reason: format!("column index {col} outside container with {cols} columns"),
                });
            }
        }
        Ok(Self { source, range })
    }

    /// Number of addressable rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.range.num_rows()
    }

    /// Number of addressable columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.range.num_columns()
    }

    /// Total element count (`rows * cols`).
    #[must_use]
    pub fn size(&self) -> usize {
        self.num_rows() * self.num_columns()
    }

    /// The window this view addresses.
    #[must_use]
    pub fn range(&self) -> &WindowRange {
        &self.range
    }

    /// Returns the element at `(row_offset, col_offset)` within the window:
    /// `container[start_row + row_offset][column_indices[col_offset]]`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfRange`] if either offset exceeds the
    /// window dimensions.
    pub fn at(&self, row_offset: usize, col_offset: usize) -> Result<f32, DataError> {
        if row_offset >= self.num_rows() {
            return Err(DataError::IndexOutOfRange {
                index: row_offset,
                len: self.num_rows(),
            });
        }
        if col_offset >= self.num_columns() {
            return Err(DataError::IndexOutOfRange {
                index: col_offset,
                len: self.num_columns(),
            });
        }
        let row = self.range.start_row + row_offset;
        let col = self.range.column_indices[col_offset];
        self.source.get(row, col).ok_or(DataError::IndexOutOfRange {
            index: row,
            len: self.source.num_rows(),
        })
    }

    /// One-dimensional accessor, valid only when the view is a single row
    /// or a single column.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidShape`] for two-dimensional views and
    /// [`DataError::IndexOutOfRange`] past the non-unit dimension.
    pub fn at_flat(&self, offset: usize) -> Result<f32, DataError> {
        if self.num_rows() == 1 {
            self.at(0, offset)
        } else if self.num_columns() == 1 {
            self.at(offset, 0)
        } else {
            Err(DataError::InvalidShape {
                rows: self.num_rows(),
                cols: self.num_columns(),
            })
        }
    }

    /// Moves the window to a new absolute row range, revalidating against
    /// the container's current state. Column indices are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidRange`] under the same conditions as
    /// [`WindowedView::new`].
    pub fn set_row_range(&mut self, start_row: usize, end_row: usize) -> Result<(), DataError> {
        let range = WindowRange::new(start_row, end_row, self.range.column_indices.clone());
        *self = Self::new(self.source.clone(), range)?;
        Ok(())
    }

    /// Row-major flattened element access, used by the statistics stages.
    pub(crate) fn element(&self, index: usize) -> Result<f32, DataError> {
        let cols = self.num_columns();
        if cols == 0 || index >= self.size() {
            return Err(DataError::IndexOutOfRange {
                index,
                len: self.size(),
            });
        }
        self.at(index / cols, index % cols)
    }

    /// Deep-copies the window into an owned value, independent of the
    /// source container: a [`Value::Sample`] for single-row views, a
    /// [`Value::Matrix`] otherwise.
    pub(crate) fn materialize(&self) -> Value {
        let rows = self.num_rows();
        let cols = self.num_columns();
        // Validated at construction; containers never shrink, and the
        // ingestion stage keeps sample widths uniform.
        let read = |r: usize, c: usize| {
            self.source
                .get(self.range.start_row + r, self.range.column_indices[c])
                .unwrap_or_default()
        };
        if rows == 1 {
            let sample: Sample = (0..cols).map(|c| read(0, c)).collect();
            Value::Sample(sample)
        } else {
            let mut matrix = Matrix::zeros(rows, cols);
            for r in 0..rows {
                for c in 0..cols {
                    // Both axes bounded by the loop ranges.
                    let _ = matrix.set(r, c, read(r, c));
                }
            }
            Value::Matrix(matrix)
        }
    }
}

impl fmt::Display for WindowedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WindowedView(rows {}..={}, {} columns)",
            self.range.start_row,
            self.range.end_row,
            self.num_columns()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_buffer(rows: &[[f32; 3]]) -> Rc<RefCell<CircularBuffer<Sample>>> {
        let mut buffer = CircularBuffer::new(8).unwrap();
        for row in rows {
            buffer.push(Sample::from_slice(row));
        }
        Rc::new(RefCell::new(buffer))
    }

    #[test]
    fn test_view_addresses_window() {
        let buffer = sample_buffer(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let view = WindowedView::new(
            ViewSource::Buffer(buffer),
            WindowRange::new(1, 2, vec![2, 0]),
        )
        .unwrap();

        assert_eq!(view.num_rows(), 2);
        assert_eq!(view.num_columns(), 2);
        assert_eq!(view.size(), 4);
        // view.at(i, j) == container[start + i][columns[j]]
        assert_eq!(view.at(0, 0), Ok(6.0));
        assert_eq!(view.at(0, 1), Ok(4.0));
        assert_eq!(view.at(1, 0), Ok(9.0));
        assert_eq!(view.at(1, 1), Ok(7.0));
    }

    #[test]
    fn test_out_of_range_offsets() {
        let buffer = sample_buffer(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let view = WindowedView::new(
            ViewSource::Buffer(buffer),
            WindowRange::new(0, 1, vec![0, 1]),
        )
        .unwrap();
        assert!(matches!(
            view.at(2, 0),
            Err(DataError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            view.at(0, 2),
            Err(DataError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_eager_validation() {
        let buffer = sample_buffer(&[[1.0, 2.0, 3.0]]);
        // Inverted range.
        assert!(matches!(
            WindowedView::new(
                ViewSource::Buffer(Rc::clone(&buffer)),
                WindowRange::new(1, 0, vec![0]),
            ),
            Err(DataError::InvalidRange { .. })
        ));
        // Row past the container.
        assert!(matches!(
            WindowedView::new(
                ViewSource::Buffer(Rc::clone(&buffer)),
                WindowRange::new(0, 1, vec![0]),
            ),
            Err(DataError::InvalidRange { .. })
        ));
        // Column past the sample width.
        assert!(matches!(
            WindowedView::new(ViewSource::Buffer(buffer), WindowRange::new(0, 0, vec![3])),
            Err(DataError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_flat_accessor_shapes() {
        let buffer = sample_buffer(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        let single_row = WindowedView::new(
            ViewSource::Buffer(Rc::clone(&buffer)),
            WindowRange::new(1, 1, vec![0, 1, 2]),
        )
        .unwrap();
        assert_eq!(single_row.at_flat(2), Ok(6.0));
        assert!(matches!(
            single_row.at_flat(3),
            Err(DataError::IndexOutOfRange { .. })
        ));

        let single_col = WindowedView::new(
            ViewSource::Buffer(Rc::clone(&buffer)),
            WindowRange::new(0, 1, vec![1]),
        )
        .unwrap();
        assert_eq!(single_col.at_flat(1), Ok(5.0));

        let two_dim = WindowedView::new(
            ViewSource::Buffer(buffer),
            WindowRange::new(0, 1, vec![0, 1]),
        )
        .unwrap();
        assert_eq!(
            two_dim.at_flat(0),
            Err(DataError::InvalidShape { rows: 2, cols: 2 })
        );
    }

    #[test]
    fn test_view_observes_live_container() {
        let buffer = sample_buffer(&[[1.0, 1.0, 1.0]]);
        let view = WindowedView::new(
            ViewSource::Buffer(Rc::clone(&buffer)),
            WindowRange::new(0, 0, vec![0]),
        )
        .unwrap();
        assert_eq!(view.at(0, 0), Ok(1.0));

        // Fill the buffer until the original row 0 is evicted: the view
        // still addresses logical row 0, which now holds newer data.
        for n in 2u8..=9 {
            buffer
                .borrow_mut()
                .push(Sample::from_slice(&[f32::from(n), 0.0, 0.0]));
        }
        assert_eq!(view.at(0, 0), Ok(2.0));
    }

    #[test]
    fn test_set_row_range_revalidates() {
        let buffer = sample_buffer(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut view = WindowedView::new(
            ViewSource::Buffer(buffer),
            WindowRange::new(0, 0, vec![0]),
        )
        .unwrap();
        view.set_row_range(1, 1).unwrap();
        assert_eq!(view.at(0, 0), Ok(4.0));
        assert!(view.set_row_range(1, 5).is_err());
    }

    #[test]
    fn test_view_over_matrix() {
        let matrix = Rc::new(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
        let view = WindowedView::new(
            ViewSource::Matrix(matrix),
            WindowRange::new(0, 1, vec![1]),
        )
        .unwrap();
        assert_eq!(view.at(1, 0), Ok(4.0));
    }

    #[test]
    fn test_duplicated_columns() {
        let buffer = sample_buffer(&[[1.0, 2.0, 3.0]]);
        let view = WindowedView::new(
            ViewSource::Buffer(buffer),
            WindowRange::new(0, 0, vec![1, 1, 1]),
        )
        .unwrap();
        assert_eq!(view.at(0, 0), Ok(2.0));
        assert_eq!(view.at(0, 2), Ok(2.0));
    }
}
