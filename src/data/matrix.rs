//! Minimal row-major matrix storage for pipeline payloads.

use super::DataError;

/// A row-major `f32` matrix with fixed dimensions.
///
/// Serves as the owned backing store for [`Value::Matrix`](super::Value) and
/// as the materialization target when a windowed view is deep-cloned.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Creates a zero-filled `rows x cols` matrix.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::RaggedRows`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, DataError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(DataError::RaggedRows {
                    row: row_idx,
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.cols
    }

    /// Total element count (`rows * cols`).
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns the element at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfRange`] on either axis overflow.
    pub fn get(&self, row: usize, col: usize) -> Result<f32, DataError> {
        if row >= self.rows {
            return Err(DataError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(DataError::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        Ok(self.data[row * self.cols + col])
    }

    /// Writes the element at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfRange`] on either axis overflow.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<(), DataError> {
        if row >= self.rows {
            return Err(DataError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        if col >= self.cols {
            return Err(DataError::IndexOutOfRange {
                index: col,
                len: self.cols,
            });
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Returns row `row` as a slice.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::IndexOutOfRange`] if `row >= num_rows()`.
    pub fn row(&self, row: usize) -> Result<&[f32], DataError> {
        if row >= self.rows {
            return Err(DataError::IndexOutOfRange {
                index: row,
                len: self.rows,
            });
        }
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }
}
