//! Fixed-capacity circular buffer for streaming samples.
//!
//! [`CircularBuffer`] overwrites its logical-oldest entry once full and never
//! reallocates. Entries are addressed by *logical* index: 0 is the oldest
//! live entry, `len() - 1` the most recently written one. The physical slot
//! for logical index `i` is `(write_cursor + capacity - len + i) % capacity`.
//!
//! The buffer is single-threaded by design; concurrent producers must be
//! serialized upstream before reaching the pipeline.

use std::fmt;

/// Errors raised by circular buffer construction and access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The buffer was constructed with an unusable capacity.
    #[error("invalid capacity {capacity}: must be non-zero")]
    InvalidConfiguration {
        /// The rejected capacity.
        capacity: usize,
    },

    /// A logical index exceeded the number of live entries.
    #[error("logical index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The requested logical index.
        index: usize,
        /// The number of live entries at the time of the call.
        len: usize,
    },
}

/// A fixed-capacity buffer that overwrites its oldest entry when full.
///
/// The capacity is exact and fixed at construction: `notification_offset`
/// ranges on the ingestion stage are defined against it, so it is never
/// rounded or resized.
pub struct CircularBuffer<T> {
    /// Stored entries. Grows up to `capacity`, then slots are reused.
    slots: Vec<T>,
    /// Fixed capacity, > 0.
    capacity: usize,
    /// Physical index where the next write lands.
    write_cursor: usize,
}

impl<T> CircularBuffer<T> {
    /// Creates a buffer holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidConfiguration`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidConfiguration { capacity });
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            write_cursor: 0,
        })
    }

    /// Appends an entry, evicting the logical-oldest one if the buffer is
    /// full. Always succeeds; O(1).
    pub fn push(&mut self, value: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.write_cursor] = value;
        }
        self.write_cursor = (self.write_cursor + 1) % self.capacity;
    }

    /// Returns the entry at `logical` index (0 = oldest).
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfRange`] if `logical >= len()`.
    pub fn get(&self, logical: usize) -> Result<&T, BufferError> {
        if logical >= self.len() {
            return Err(BufferError::IndexOutOfRange {
                index: logical,
                len: self.len(),
            });
        }
        Ok(&self.slots[self.physical_index(logical)])
    }

    /// Returns the entry `offset` positions behind the most recent write
    /// (`latest(0)` is the newest entry).
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::IndexOutOfRange`] if `offset >= len()`.
    pub fn latest(&self, offset: usize) -> Result<&T, BufferError> {
        let len = self.len();
        if offset >= len {
            return Err(BufferError::IndexOutOfRange { index: offset, len });
        }
        self.get(len - 1 - offset)
    }

    /// Returns the oldest live entry, or `None` when empty.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns the most recently written entry, or `None` when empty.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.latest(0).ok()
    }

    /// Returns the number of live entries, `0..=capacity`.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no entries have been written yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true once every slot holds a live entry.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates live entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len()).map(move |i| &self.slots[self.physical_index(i)])
    }

    /// Maps a logical index (validated by the caller) to its physical slot.
    #[inline]
    fn physical_index(&self, logical: usize) -> usize {
        (self.write_cursor + self.capacity - self.len() + logical) % self.capacity
    }
}

impl<T> fmt::Debug for CircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("is_full", &self.is_full())
            .finish()
    }
}
