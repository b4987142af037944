use crate::ring::Ring;
use crate::{Metrics, SendError};
use std::ptr;
use std::sync::Arc;

/// The single write handle for a ring.
///
/// Exactly one `Sender` exists per ring — it does not implement `Clone`, the
/// same way the producer side of a single-producer structure never should,
/// since cloning it would reintroduce the multi-producer contention this
/// type is built to avoid.
pub struct Sender {
    ring: Arc<Ring>,
}

impl Sender {
    pub(crate) fn new(ring: Arc<Ring>) -> Self {
        Self { ring }
    }

    /// Publishes a frame to every current and future receiver that borrows
    /// after this call completes.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::NoReceivers`] if no receiver is attached to the
    /// ring; the sender does not publish into a ring nobody is reading.
    ///
    /// # Panics
    ///
    /// Panics if `payload.len()` does not equal the ring's configured
    /// segment size.
    pub fn send(&self, payload: &[u8], timestamp: u64) -> Result<(), SendError> {
        assert_eq!(
            payload.len(),
            self.ring.bufsize(),
            "payload length {} does not match the ring's segment size {}",
            payload.len(),
            self.ring.bufsize()
        );

        let (target, data_ptr, timestamp_ptr) = {
            let mut state = self.ring.lock();
            if state.num_receivers() == 0 {
                return Err(SendError::NoReceivers);
            }
            self.ring.begin_write(&mut state)
            // lock released at the end of this block
        };

        // SAFETY: `target` had zero outstanding borrows at selection time
        // (P1) and no new borrow can land on it until `finish_write` below
        // republishes `last_written_block` under the lock, per
        // `Ring::pick_read_index`'s policy.
        unsafe {
            ptr::copy_nonoverlapping(payload.as_ptr(), data_ptr, self.ring.bufsize());
            *timestamp_ptr = timestamp;
        }

        {
            let mut state = self.ring.lock();
            Ring::finish_write(&mut state, target);
        }

        Ok(())
    }

    /// Returns a snapshot of the ring's send/conflation counters.
    ///
    /// Stays at its default (zero) value unless the ring was built with
    /// [`crate::Config::with_metrics`].
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        self.ring.metrics_snapshot()
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        let mut state = self.ring.lock();
        Ring::close_sender(&mut state);
    }
}
