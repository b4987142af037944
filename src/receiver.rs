use crate::ring::Ring;
use crate::{CloneError, RecvError};
use std::sync::Arc;

/// A borrow handle into a receiver's ring.
///
/// Standing in for the paired `start_recv`/`end_recv` calls of the
/// originating C design, a `FrameGuard` acquires its borrow in
/// [`Receiver::recv`] and releases it automatically when dropped — there is
/// no way to forget the release, even across an early return or a panic
/// unwind. It owns a clone of the ring's `Arc`, so it is free to outlive the
/// `Receiver` it was obtained from.
pub struct FrameGuard {
    ring: Arc<Ring>,
    index: usize,
    data_ptr: *const u8,
    timestamp: u64,
}

impl FrameGuard {
    /// The segment's bytes as of the moment this guard was acquired.
    ///
    /// Safe to read for as long as the guard is alive: the ring never
    /// selects a borrowed segment as a write target (P1), so nothing writes
    /// through `data_ptr` while this guard exists.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        // SAFETY: see the struct-level documentation.
        unsafe { std::slice::from_raw_parts(self.data_ptr, self.ring.bufsize()) }
    }

    /// The opaque timestamp tag recorded alongside this frame by the sender.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let mut state = self.ring.lock();
        Ring::end_read(&mut state, self.index);
    }
}

// SAFETY: `FrameGuard` only exposes a read-only view of bytes that, by
// construction, no other thread is writing (see `bytes`); its `Drop` takes
// the ring's lock, so releasing it from a different thread than the one that
// acquired it is sound.
unsafe impl Send for FrameGuard {}

/// A fanout handle into a ring. Any number of receivers may exist
/// concurrently; each independently borrows the most recent frame that is
/// not currently being overwritten.
pub struct Receiver {
    ring: Arc<Ring>,
}

impl Receiver {
    pub(crate) fn new(ring: Arc<Ring>) -> Self {
        Self { ring }
    }

    /// Borrows the most recent frame that is not currently being written.
    ///
    /// The returned [`FrameGuard`] releases the borrow when dropped; there
    /// is no separate "end" call.
    ///
    /// # Errors
    ///
    /// Returns [`RecvError::SenderClosed`] once the sender has been dropped.
    /// No further frames will ever arrive on this ring.
    pub fn recv(&self) -> Result<FrameGuard, RecvError> {
        let mut state = self.ring.lock();
        if state.is_sender_closed() {
            return Err(RecvError::SenderClosed);
        }

        let (index, data_ptr, timestamp) = Ring::begin_read(&mut state);
        drop(state);

        Ok(FrameGuard {
            ring: Arc::clone(&self.ring),
            index,
            data_ptr,
            timestamp,
        })
    }

    /// Spawns a new receiver sharing this one's ring, growing the segment
    /// table by one to keep pool sufficiency (P2) intact.
    ///
    /// # Errors
    ///
    /// Returns [`CloneError::MaxReceivers`] if the segment table is already
    /// at [`crate::MAX_SEGMENTS`].
    pub fn try_clone(&self) -> Result<Receiver, CloneError> {
        let mut state = self.ring.lock();
        self.ring.grow(&mut state)?;
        Ring::register_receiver(&mut state);
        drop(state);

        Ok(Receiver {
            ring: Arc::clone(&self.ring),
        })
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        let mut state = self.ring.lock();
        Ring::unregister_receiver(&mut state);
    }
}
