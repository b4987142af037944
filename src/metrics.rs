/// Optional counters for monitoring ring activity.
///
/// Accumulated under the ring's lock and snapshotted via
/// [`crate::Sender::metrics`]. Collection only happens when
/// [`crate::Config::with_metrics`] was used to build the ring; otherwise the
/// snapshot stays at its default value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Total number of completed `send` calls.
    pub sends: u64,
    /// Number of those sends that landed on a conflated (already-last-written) slot.
    pub conflations: u64,
}

impl Metrics {
    /// Returns a zeroed metrics snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
