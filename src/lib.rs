//! frameq — a single-producer, multi-consumer ring buffer for fixed-size,
//! latest-value frames.
//!
//! One [`Sender`] broadcasts frames of a configured byte size; any number of
//! [`Receiver`]s (up to [`MAX_RECEIVERS`]) independently borrow the most
//! recent frame that is not currently being overwritten. Receivers do not
//! queue history — a `recv` always returns *a* recent frame, never *every*
//! frame, and an old frame is dropped rather than delivered stale or made to
//! block the sender.
//!
//! The canonical use case is fanning out live video frames to several
//! consumers (a preview window, a recorder, a network sender) without making
//! the producer wait on the slowest one.
//!
//! # Example
//!
//! ```
//! use frameq::new_ring;
//!
//! let (sender, receiver) = new_ring(4);
//!
//! sender.send(&[0xDE, 0xAD, 0xBE, 0xEF], 100).unwrap();
//!
//! let frame = receiver.recv().unwrap();
//! assert_eq!(frame.bytes(), &[0xDE, 0xAD, 0xBE, 0xEF]);
//! assert_eq!(frame.timestamp(), 100);
//! // The borrow releases automatically when `frame` drops.
//! ```

mod config;
mod error;
mod invariants;
mod metrics;
mod receiver;
mod ring;
mod sender;

pub use config::Config;
pub use error::{CloneError, RecvError, SendError};
pub use metrics::Metrics;
pub use receiver::{FrameGuard, Receiver};
pub use ring::{MAX_RECEIVERS, MAX_SEGMENTS};
pub use sender::Sender;

use std::sync::Arc;

/// Creates a matched [`Sender`]/[`Receiver`] pair sharing a ring whose
/// segments are `bufsize` bytes each.
///
/// Equivalent to `new_ring_with_config(Config::new(bufsize))`.
///
/// # Panics
///
/// Panics if `bufsize` is zero.
#[must_use]
pub fn new_ring(bufsize: usize) -> (Sender, Receiver) {
    new_ring_with_config(Config::new(bufsize))
}

/// Creates a matched [`Sender`]/[`Receiver`] pair from an explicit
/// [`Config`], e.g. to opt into metrics collection via
/// [`Config::with_metrics`].
#[must_use]
pub fn new_ring_with_config(config: Config) -> (Sender, Receiver) {
    let ring = Arc::new(ring::Ring::new(config));
    let sender = Sender::new(Arc::clone(&ring));
    let receiver = Receiver::new(ring);
    (sender, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_shares_one_ring() {
        let (sender, receiver) = new_ring(4);
        sender.send(&[1, 2, 3, 4], 7).unwrap();
        let frame = receiver.recv().unwrap();
        assert_eq!(frame.bytes(), &[1, 2, 3, 4]);
        assert_eq!(frame.timestamp(), 7);
    }
}
