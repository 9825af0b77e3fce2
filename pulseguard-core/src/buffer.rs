//! Fixed-Capacity Sliding Buffer for Sample Windows
//!
//! ## Overview
//!
//! Every stage of the measurement pipelines keeps a short, bounded history:
//!
//! | Window | Capacity | Contents |
//! |--------|----------|----------|
//! | Raw intensity window | 100 | red / infrared samples |
//! | Rate smoothing | 2 | instantaneous heart rates |
//! | Saturation smoothing | 4 | valid SpO2 estimates |
//!
//! All three share the same rule: pushing onto a full window evicts the
//! oldest element, so the window always holds the most recent `N` items in
//! arrival order.
//!
//! ## Memory Layout
//!
//! Storage is an array of `Option<T>` sized at compile time through const
//! generics:
//!
//! ```text
//! SlidingBuffer<u32, 5> after 7 pushes (a..g):
//! ┌─────┬─────┬─────┬─────┬─────┐
//! │  f  │  g  │  c  │  d  │  e  │  ← physical slots
//! └─────┴─────┴─────┴─────┴─────┘
//!                ↑
//!                └── write_pos = 2, oldest element
//!
//! Logical view: [c, d, e, f, g]
//! ```
//!
//! No heap allocation takes place, so the same type backs the windows on
//! the Raspberry Pi build and on a microcontroller.
//!
//! ## Reductions
//!
//! `mean()` and `median()` are undefined over an empty window and return
//! [`MeasurementError::EmptyReadingSet`] instead of a made-up value.
//!
//! ```rust
//! use pulseguard_core::buffer::SlidingBuffer;
//!
//! let mut rates: SlidingBuffer<f32, 2> = SlidingBuffer::new();
//! rates.push(72.0);
//! rates.push(78.0);
//! rates.push(74.0); // evicts 72.0
//!
//! assert_eq!(rates.mean().unwrap(), 76.0);
//! ```

use core::cmp::Ordering;

use crate::errors::{MeasurementError, MeasurementResult};

/// Values that can be reduced to a mean or median
pub trait Scalar: Copy {
    /// Widen to `f32` for arithmetic
    fn as_f32(self) -> f32;
}

impl Scalar for f32 {
    fn as_f32(self) -> f32 {
        self
    }
}

impl Scalar for u32 {
    fn as_f32(self) -> f32 {
        self as f32
    }
}

impl Scalar for u16 {
    fn as_f32(self) -> f32 {
        self as f32
    }
}

/// Fixed-capacity FIFO window with oldest-first eviction
///
/// ## Internal Invariants
///
/// - `write_pos < N` (next write position is always valid)
/// - `len <= N` after every operation
/// - Iteration yields elements oldest to newest
///
/// ## Thread Safety
///
/// Windows are owned by a single sampling loop and never shared.
#[derive(Clone, Debug)]
pub struct SlidingBuffer<T: Copy, const N: usize> {
    /// Storage array using Option for unfilled slots
    data: [Option<T>; N],

    /// Index where the next write will occur
    write_pos: usize,

    /// Current number of stored elements
    len: usize,
}

impl<T: Copy, const N: usize> SlidingBuffer<T, N> {
    /// Creates an empty window
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Appends an element, evicting and returning the oldest one when full
    pub fn push(&mut self, item: T) -> Option<T> {
        if N == 0 {
            return Some(item);
        }

        let evicted = if self.is_full() {
            self.data[self.write_pos]
        } else {
            None
        };

        self.data[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }

        evicted
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of elements
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the window holds exactly `N` elements
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Most recently pushed element
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 { N - 1 } else { self.write_pos - 1 };

        self.data[idx].as_ref()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> SlidingBufferIter<'_, T, N> {
        SlidingBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Copies the contents, oldest first, into `out`; returns how many were copied
    pub fn copy_into(&self, out: &mut [T]) -> usize {
        let mut copied = 0;
        for (slot, item) in out.iter_mut().zip(self.iter()) {
            *slot = *item;
            copied += 1;
        }
        copied
    }

    /// Drop all elements
    pub fn clear(&mut self) {
        self.data = [None; N];
        self.write_pos = 0;
        self.len = 0;
    }

    /// Gets an element by its logical index (0 = oldest)
    fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            // Full: the oldest element sits at write_pos
            (self.write_pos + index) % N
        };

        self.data[actual_index].as_ref()
    }
}

impl<T: Scalar, const N: usize> SlidingBuffer<T, N> {
    /// Arithmetic mean of the stored elements
    pub fn mean(&self) -> MeasurementResult<f32> {
        if self.is_empty() {
            return Err(MeasurementError::EmptyReadingSet);
        }

        let sum: f32 = self.iter().map(|v| v.as_f32()).sum();
        Ok(sum / self.len as f32)
    }

    /// Median of the stored elements
    pub fn median(&self) -> MeasurementResult<f32> {
        let mut scratch: heapless::Vec<f32, N> = heapless::Vec::new();
        for value in self.iter() {
            // Capacity matches the window, cannot overflow
            let _ = scratch.push(value.as_f32());
        }
        median_of(&mut scratch)
    }
}

/// Median of a slice, sorting it in place
///
/// Even-length input yields the mean of the two middle values. `NaN`
/// entries sort as equal to their neighbours.
pub fn median_of(values: &mut [f32]) -> MeasurementResult<f32> {
    if values.is_empty() {
        return Err(MeasurementError::EmptyReadingSet);
    }

    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Ok((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Ok(values[mid])
    }
}

/// Iterator over window contents, oldest first
pub struct SlidingBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a SlidingBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for SlidingBufferIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Copy, const N: usize> Default for SlidingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
