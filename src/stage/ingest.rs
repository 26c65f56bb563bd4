//! Circular-buffer ingestion with interval/offset notification.
//!
//! [`BufferedIngestion`] implements the sliding-window segmentation policy:
//! the buffer capacity is the window size, `notification_interval` the hop
//! size, and `notification_offset` selects which sample (counted back from
//! the newest write) is emitted at each notification point. A capacity of
//! 512 with interval 256 and offset 0 yields 50%-overlapping windows of 512
//! samples.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::smallvec;

use crate::buffer::CircularBuffer;
use crate::data::{Sample, Value};

use super::{Stage, StageError};

/// Appends incoming samples to an owned circular buffer and emits one
/// sample every `notification_interval` inputs.
///
/// The emitted sample is the one `notification_offset` positions behind the
/// most recent write; nothing is emitted until the buffer holds more than
/// `notification_offset` entries. Downstream selectors bind to the buffer
/// via [`BufferedIngestion::buffer`].
pub struct BufferedIngestion {
    buffer: Rc<RefCell<CircularBuffer<Sample>>>,
    notification_interval: usize,
    notification_offset: usize,
    sample_counter: usize,
    /// Width of the first accepted sample; later samples must match.
    sample_width: Option<usize>,
}

impl BufferedIngestion {
    /// Creates an ingestion stage with its own buffer of `capacity` samples.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidConfiguration`] if `capacity` is 0,
    /// `notification_interval < 1`, or `notification_offset > capacity`.
    pub fn new(
        capacity: usize,
        notification_interval: usize,
        notification_offset: usize,
    ) -> Result<Self, StageError> {
        if notification_interval < 1 {
            return Err(StageError::InvalidConfiguration {
                reason: format!(
                    "notification_interval {notification_interval} must be at least 1"
                ),
            });
        }
        if notification_offset > capacity {
            return Err(StageError::InvalidConfiguration {
                reason: format!(
                    "notification_offset {notification_offset} outside [0, {capacity}]"
                ),
            });
        }
        let buffer = CircularBuffer::new(capacity)?;
        Ok(Self {
            buffer: Rc::new(RefCell::new(buffer)),
            notification_interval,
            notification_offset,
            sample_counter: 0,
            sample_width: None,
        })
    }

    /// Shared handle to the internal buffer, for binding selector stages.
    #[must_use]
    pub fn buffer(&self) -> Rc<RefCell<CircularBuffer<Sample>>> {
        Rc::clone(&self.buffer)
    }

    /// Number of samples currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// True before the first sample arrives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }

    /// The configured notification offset.
    #[must_use]
    pub fn notification_offset(&self) -> usize {
        self.notification_offset
    }

    /// Re-targets which sample is emitted at notification points.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidConfiguration`] if `offset` exceeds the
    /// buffer capacity.
    pub fn set_notification_offset(&mut self, offset: usize) -> Result<(), StageError> {
        let capacity = self.buffer.borrow().capacity();
        if offset > capacity {
            return Err(StageError::InvalidConfiguration {
                reason: format!("notification_offset {offset} outside [0, {capacity}]"),
            });
        }
        self.notification_offset = offset;
        Ok(())
    }
}

impl Stage for BufferedIngestion {
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError> {
        let sample: Sample = match input {
            Value::Sample(sample) => sample.clone(),
            // Scalar streams are one-column samples.
            Value::Scalar(value) => smallvec![*value],
            other => {
                return Err(StageError::UnsupportedInput {
                    expected: "sample",
                    actual: other.kind(),
                })
            }
        };
        if sample.is_empty() {
            return Err(StageError::EmptyInput);
        }
        match self.sample_width {
            Some(width) if width != sample.len() => {
                return Err(StageError::InvalidInputShape {
                    expected: width,
                    actual: sample.len(),
                });
            }
            Some(_) => {}
            None => self.sample_width = Some(sample.len()),
        }

        self.buffer.borrow_mut().push(sample);

        self.sample_counter += 1;
        if self.sample_counter == self.notification_interval {
            self.sample_counter = 0;

            let buffer = self.buffer.borrow();
            if self.notification_offset < buffer.len() {
                let emitted = buffer.latest(self.notification_offset)?.clone();
                return Ok(Some(Value::Sample(emitted)));
            }
            tracing::trace!(
                offset = self.notification_offset,
                buffered = buffer.len(),
                "notification withheld during warm-up"
            );
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_outputs(stage: &mut BufferedIngestion, inputs: &[f32]) -> Vec<Option<f32>> {
        inputs
            .iter()
            .map(|&v| {
                stage
                    .execute(&Value::Scalar(v))
                    .unwrap()
                    .map(|out| out.as_sample().unwrap()[0])
            })
            .collect()
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(BufferedIngestion::new(0, 1, 0).is_err());
        assert!(BufferedIngestion::new(10, 0, 0).is_err());
        assert!(BufferedIngestion::new(10, 1, 11).is_err());
        // offset == capacity is allowed, it just never emits.
        assert!(BufferedIngestion::new(10, 1, 10).is_ok());
    }

    #[test]
    fn test_notification_interval() {
        let mut stage = BufferedIngestion::new(10, 3, 0).unwrap();
        assert_eq!(
            scalar_outputs(&mut stage, &[1.0, 2.0, 3.0]),
            vec![None, None, Some(3.0)]
        );
        // Counter resets after emission: the pattern repeats.
        assert_eq!(
            scalar_outputs(&mut stage, &[1.0, 2.0, 3.0]),
            vec![None, None, Some(3.0)]
        );
    }

    #[test]
    fn test_notification_offset_lags_output() {
        let mut stage = BufferedIngestion::new(10, 1, 2).unwrap();
        // The third sample's output is the value from two samples ago.
        assert_eq!(
            scalar_outputs(&mut stage, &[1.0, 2.0, 3.0, 4.0]),
            vec![None, None, Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn test_sample_width_enforced() {
        let mut stage = BufferedIngestion::new(4, 1, 0).unwrap();
        stage
            .execute(&Value::Sample(Sample::from_slice(&[1.0, 2.0, 3.0])))
            .unwrap();
        let err = stage
            .execute(&Value::Sample(Sample::from_slice(&[1.0, 2.0])))
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
    fn test_rejects_non_sample_input() {
        let mut stage = BufferedIngestion::new(4, 1, 0).unwrap();
        let err = stage
            .execute(&Value::Matrix(crate::data::Matrix::zeros(1, 1)))
            .unwrap_err();
        assert!(matches!(err, StageError::UnsupportedInput { .. }));
    }

    #[test]
    fn test_set_notification_offset() {
        let mut stage = BufferedIngestion::new(4, 1, 0).unwrap();
        stage.set_notification_offset(4).unwrap();
        assert_eq!(stage.notification_offset(), 4);
        assert!(stage.set_notification_offset(5).is_err());
    }
}
