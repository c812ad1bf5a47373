//! Fixed-capacity receive buffer
//!
//! Bytes arriving from the display are appended at the tail and drained from
//! the head once a complete frame has been found. Storage is an inline array
//! indexed modulo `N`, so nothing is allocated on the receive path.
//!
//! When a write does not fit, the oldest unread bytes are evicted to make
//! room. A slow consumer therefore never stalls the producer; it only loses
//! the stale front of the stream.

/// Errors reported by [`RingBuffer`] operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// A buffer with no storage was requested
    ZeroCapacity,
    /// Peek offset is not inside the unread region
    OutOfRange,
    /// More bytes were requested than are currently unread
    Underflow,
}

/// Bounded FIFO byte buffer with drop-oldest overflow
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    storage: [u8; N],
    /// Index of the oldest unread byte
    head: usize,
    /// Number of unread bytes
    len: usize,
    /// Bytes discarded because they did not fit
    dropped: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty buffer holding up to `N` bytes
    ///
    /// `N` should be at least as large as the longest expected frame.
    pub fn new() -> Result<Self, BufferError> {
        if N == 0 {
            return Err(BufferError::ZeroCapacity);
        }

        Ok(Self {
            storage: [0; N],
            head: 0,
            len: 0,
            dropped: 0,
        })
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no unread bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the next written byte will evict one
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Bytes that can be written without eviction
    pub fn free(&self) -> usize {
        N - self.len
    }

    /// Total number of bytes lost to overflow since creation
    ///
    /// The counter wraps around; compare readings with `wrapping_sub`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Append bytes, evicting the oldest unread bytes if necessary
    ///
    /// Returns how many of `bytes` are now held in the buffer. This is less
    /// than `bytes.len()` only when the input alone is longer than the
    /// capacity, in which case just its newest `N` bytes are kept.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let kept = if bytes.len() > N {
            let skipped = bytes.len() - N;
            self.dropped = self.dropped.wrapping_add(skipped);
            &bytes[skipped..]
        } else {
            bytes
        };

        let overflow = (self.len + kept.len()).saturating_sub(N);
        if overflow > 0 {
            self.head = (self.head + overflow) % N;
            self.len -= overflow;
            self.dropped = self.dropped.wrapping_add(overflow);
        }

        for &byte in kept {
            let tail = (self.head + self.len) % N;
            self.storage[tail] = byte;
            self.len += 1;
        }

        kept.len()
    }

    /// Read the byte `offset` positions after the read position
    ///
    /// Does not consume anything.
    pub fn peek_at(&self, offset: usize) -> Result<u8, BufferError> {
        if offset >= self.len {
            return Err(BufferError::OutOfRange);
        }
        Ok(self.storage[(self.head + offset) % N])
    }

    /// Discard the first `n` unread bytes
    pub fn consume(&mut self, n: usize) -> Result<(), BufferError> {
        if n > self.len {
            return Err(BufferError::Underflow);
        }
        if n > 0 {
            self.head = (self.head + n) % N;
            self.len -= n;
        }
        Ok(())
    }

    /// Discard every unread byte
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Iterate over the unread bytes, oldest first, without consuming them
    pub fn iter(&self) -> Iter<'_, N> {
        Iter {
            buffer: self,
            offset: 0,
        }
    }
}

/// Iterator over the unread bytes of a [`RingBuffer`]
pub struct Iter<'a, const N: usize> {
    buffer: &'a RingBuffer<N>,
    offset: usize,
}

impl<const N: usize> Iterator for Iter<'_, N> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let byte = self.buffer.peek_at(self.offset).ok()?;
        self.offset += 1;
        Some(byte)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len() - self.offset;
        (remaining, Some(remaining))
    }
}

impl<const N: usize> ExactSizeIterator for Iter<'_, N> {}
