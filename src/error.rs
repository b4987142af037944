use thiserror::Error;

/// Error returned by [`crate::Sender::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// No receivers are attached to the ring; the frame would have nobody to
    /// reach, so it was not published.
    #[error("no receivers attached to the ring")]
    NoReceivers,
}

/// Error returned by [`crate::Receiver::recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecvError {
    /// The sender has been dropped. No further frames will ever arrive.
    #[error("sender has been dropped")]
    SenderClosed,
}

/// Error returned by [`crate::Receiver::try_clone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CloneError {
    /// The segment table is already at [`crate::MAX_SEGMENTS`]; no more
    /// receivers can be supported without violating pool sufficiency.
    #[error("segment table is at maximum capacity ({max_segments} segments)")]
    MaxReceivers {
        /// The configured segment table ceiling.
        max_segments: usize,
    },
}
