//! Feature-extraction stages: magnitude, mean, minimum, standard deviation.
//!
//! Each stage reduces its input (a sample, matrix, or flattened view) to a
//! single [`Value::Scalar`]. Inputs are read through the value model's
//! flattened element access, so a statistics stage accepts any variant of
//! the right size.

use crate::data::Value;

use super::{Stage, StageError};

/// Euclidean magnitude of a 3-component input: `sqrt(x^2 + y^2 + z^2)`.
///
/// Inputs with any other element count are rejected with
/// [`StageError::InvalidInputShape`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Magnitude;

impl Stage for Magnitude {
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError> {
        let n = input.size();
        if n != 3 {
            return Err(StageError::InvalidInputShape {
                expected: 3,
                actual: n,
            });
        }
        let x = input.element(0)?;
        let y = input.element(1)?;
        let z = input.element(2)?;
        Ok(Some(Value::Scalar((x * x + y * y + z * z).sqrt())))
    }
}

/// Arithmetic mean over all elements of the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mean;

impl Stage for Mean {
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError> {
        let n = input.size();
        if n == 0 {
            return Err(StageError::EmptyInput);
        }
        let mut sum = 0.0f32;
        for i in 0..n {
            sum += input.element(i)?;
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(Some(Value::Scalar(sum / n as f32)))
    }
}

/// Minimum value over all elements of the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Minimum;

impl Stage for Minimum {
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError> {
        let n = input.size();
        if n == 0 {
            return Err(StageError::EmptyInput);
        }
        let mut minimum = input.element(0)?;
        for i in 1..n {
            minimum = minimum.min(input.element(i)?);
        }
        Ok(Some(Value::Scalar(minimum)))
    }
}

/// Sample standard deviation with the Bessel-corrected (`n - 1`)
/// denominator.
///
/// Requires at least two elements; fewer raise
/// [`StageError::InsufficientData`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDeviation;

impl Stage for StandardDeviation {
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError> {
        let n = input.size();
        if n < 2 {
            return Err(StageError::InsufficientData {
                needed: 2,
                available: n,
            });
        }
        let mut sum = 0.0f32;
        for i in 0..n {
            sum += input.element(i)?;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / n as f32;

        let mut squared = 0.0f32;
        for i in 0..n {
            let diff = input.element(i)? - mean;
            squared += diff * diff;
        }
        #[allow(clippy::cast_precision_loss)]
        let variance = squared / (n - 1) as f32;
        Ok(Some(Value::Scalar(variance.sqrt())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Sample;
    use smallvec::smallvec;

    fn scalar(result: Result<Option<Value>, StageError>) -> f32 {
        result.unwrap().unwrap().as_scalar().unwrap()
    }

    #[test]
    fn test_magnitude_3_4_5() {
        let mut stage = Magnitude;
        let out = scalar(stage.execute(&Value::Sample(smallvec![3.0, 4.0, 0.0])));
        assert!((out - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude_rejects_wrong_width() {
        let mut stage = Magnitude;
        let err = stage
            .execute(&Value::Sample(smallvec![1.0, 2.0]))
            .unwrap_err();
        assert_eq!(
            err,
            StageError::InvalidInputShape {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_mean() {
        let mut stage = Mean;
        let out = scalar(stage.execute(&Value::Sample(smallvec![1.0, 2.0, 3.0, 4.0, 5.0])));
        assert!((out - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_empty_input() {
        let mut stage = Mean;
        let err = stage.execute(&Value::Sample(Sample::new())).unwrap_err();
        assert_eq!(err, StageError::EmptyInput);
    }

    #[test]
    fn test_minimum() {
        let mut stage = Minimum;
        let out = scalar(stage.execute(&Value::Sample(smallvec![5.0, 2.0, 8.0, 1.0, 9.0])));
        assert!((out - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimum_empty_input() {
        let mut stage = Minimum;
        assert_eq!(
            stage.execute(&Value::Sample(Sample::new())).unwrap_err(),
            StageError::EmptyInput
        );
    }

    #[test]
    fn test_standard_deviation_bessel() {
        let mut stage = StandardDeviation;
        let out = scalar(stage.execute(&Value::Sample(smallvec![
            2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0
        ])));
        // Bessel-corrected: sqrt(32 / 7)
        assert!((out - 2.138_09).abs() < 1e-3);
    }

    #[test]
    fn test_standard_deviation_needs_two() {
        let mut stage = StandardDeviation;
        let err = stage.execute(&Value::Scalar(1.0)).unwrap_err();
        assert_eq!(
            err,
            StageError::InsufficientData {
                needed: 2,
                available: 1
            }
        );
        assert!(err.is_warmup());
    }

    #[test]
    fn test_statistics_over_matrix() {
        let matrix = crate::data::Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let mut stage = Mean;
        let out = scalar(stage.execute(&Value::Matrix(matrix)));
        assert!((out - 2.5).abs() < 1e-6);
    }
}
