//! Fixed-capacity circular buffer for the signature pipeline.

/// Fixed-capacity, overwrite-on-wrap circular buffer.
///
/// Unlike a FIFO queue nothing is ever popped: every push overwrites the
/// oldest slot. Reads address slots by a logical offset relative to the
/// next write, so `get(-1)` is the newest item and `get(0)` the oldest one
/// once the buffer has wrapped. `total_written` counts every push ever made.
///
/// Each slot is cloned from the default independently, so a buffer of
/// `Vec<f32>` frames owns one zeroed vector per slot.
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    data: Vec<T>,
    write_position: usize,
    total_written: u64,
}

impl<T: Clone> CircularBuffer<T> {
    /// Creates a buffer of `capacity` slots, each initialized to `default`.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, default: T) -> Self {
        assert!(capacity > 0, "circular buffer capacity must be non-zero");
        Self {
            data: vec![default; capacity],
            write_position: 0,
            total_written: 0,
        }
    }
}

impl<T> CircularBuffer<T> {
    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the slot the next push will overwrite.
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_position
    }

    /// Returns the number of items ever pushed.
    #[inline]
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Resolves a logical offset to a physical slot index.
    #[inline]
    fn slot(&self, offset: isize) -> usize {
        let cap = self.capacity() as isize;
        (self.write_position as isize + offset.rem_euclid(cap)).rem_euclid(cap) as usize
    }

    /// Returns the item at `offset` relative to the next write position.
    #[inline]
    pub fn get(&self, offset: isize) -> &T {
        &self.data[self.slot(offset)]
    }

    /// Mutable counterpart of [`CircularBuffer::get`].
    #[inline]
    pub fn get_mut(&mut self, offset: isize) -> &mut T {
        let idx = self.slot(offset);
        &mut self.data[idx]
    }

    /// Returns the most recently pushed item.
    #[inline]
    pub fn latest(&self) -> &T {
        self.get(-1)
    }

    /// Overwrites the next slot and advances.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.data[self.write_position] = value;
        self.advance(1);
    }

    /// Fills the next slot in place, then advances.
    ///
    /// Lets frame buffers reuse their slot allocation instead of moving a
    /// fresh vector in on every push.
    #[inline]
    pub fn push_with<F: FnOnce(&mut T)>(&mut self, fill: F) {
        fill(&mut self.data[self.write_position]);
        self.advance(1);
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.write_position = (self.write_position + n) % self.capacity();
        self.total_written += n as u64;
    }
}

impl<T: Copy> CircularBuffer<T> {
    /// Pushes every item of `input`, wrapping as needed.
    ///
    /// Inputs longer than the capacity leave only their last `capacity`
    /// items in the buffer, but all of them count towards `total_written`.
    pub fn push_slice(&mut self, input: &[T]) {
        let cap = self.capacity();
        let skip = input.len().saturating_sub(cap);
        if skip > 0 {
            self.advance(skip);
        }
        let tail = &input[skip..];

        let first = tail.len().min(cap - self.write_position);
        self.data[self.write_position..self.write_position + first].copy_from_slice(&tail[..first]);
        let second = tail.len() - first;
        if second > 0 {
            self.data[..second].copy_from_slice(&tail[first..]);
        }
        self.advance(tail.len());
    }

    /// Copies the whole buffer into `out` in chronological order, oldest first.
    ///
    /// # Panics
    /// Panics if `out.len()` differs from the capacity.
    pub fn copy_chronological(&self, out: &mut [T]) {
        assert_eq!(out.len(), self.capacity());
        let split = self.capacity() - self.write_position;
        out[..split].copy_from_slice(&self.data[self.write_position..]);
        out[split..].copy_from_slice(&self.data[..self.write_position]);
    }
}
