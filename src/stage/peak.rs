//! Debounced local-maximum peak detection.

use crate::data::Value;

use super::{Stage, StageError};

/// Detector state: the armed candidate and the debounce counter.
///
/// Kept separate from the stage so transitions are a pure function of
/// `(state, input)`, which makes the detector trivially testable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakState {
    /// Height of the currently armed candidate; 0 when disarmed.
    pub last_peak_value: f32,
    /// Samples observed since the candidate was (re-)armed; -1 when no
    /// candidate has been seen yet.
    pub samples_since_last_peak: i64,
}

impl Default for PeakState {
    fn default() -> Self {
        Self {
            last_peak_value: 0.0,
            samples_since_last_peak: -1,
        }
    }
}

/// Tracks a candidate peak and confirms it once `min_peak_distance` samples
/// have elapsed without a higher candidate.
///
/// Note the confirmation semantics: the emitted value is the scalar that
/// arrives at the confirmation sample, **not** the stored candidate's
/// height. This mirrors the behavior of the detector this stage was
/// modeled on; correct it only once the intended semantics are confirmed.
#[derive(Debug, Clone)]
pub struct PeakDetector {
    min_peak_height: f32,
    min_peak_distance: i64,
    state: PeakState,
}

impl PeakDetector {
    /// Creates a detector that arms on values of at least
    /// `min_peak_height` and confirms after `min_peak_distance` samples.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidConfiguration`] if
    /// `min_peak_distance < 1`.
    pub fn new(min_peak_height: f32, min_peak_distance: i64) -> Result<Self, StageError> {
        if min_peak_distance < 1 {
            return Err(StageError::InvalidConfiguration {
                reason: format!("min_peak_distance {min_peak_distance} must be at least 1"),
            });
        }
        Ok(Self {
            min_peak_height,
            min_peak_distance,
            state: PeakState::default(),
        })
    }

    /// Current detector state.
    #[must_use]
    pub fn state(&self) -> PeakState {
        self.state
    }

    /// One transition of the detector: `(state, input) -> (state, output)`.
    #[must_use]
    pub fn step(
        state: PeakState,
        value: f32,
        min_peak_height: f32,
        min_peak_distance: i64,
    ) -> (PeakState, Option<f32>) {
        let mut next = state;
        next.samples_since_last_peak += 1;

        // An armed candidate that survived the debounce distance is
        // confirmed; the emitted value is the current input.
        if next.last_peak_value > 0.0 && next.samples_since_last_peak >= min_peak_distance {
            next.last_peak_value = 0.0;
            next.samples_since_last_peak = -1;
            return (next, Some(value));
        }

        if value >= min_peak_height
            && (value > next.last_peak_value
                || next.samples_since_last_peak >= min_peak_distance)
        {
            next.last_peak_value = value;
            next.samples_since_last_peak = 0;
        }
        (next, None)
    }
}

impl Stage for PeakDetector {
    fn execute(&mut self, input: &Value) -> Result<Option<Value>, StageError> {
        let value = input.as_scalar().ok_or(StageError::UnsupportedInput {
            expected: "scalar",
            actual: input.kind(),
        })?;
        let (next, output) =
            Self::step(self.state, value, self.min_peak_height, self.min_peak_distance);
        self.state = next;
        Ok(output.map(Value::Scalar))
    }
}
