/// Configuration for [`crate::new_ring_with_config`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Size in bytes of every segment in the ring.
    pub(crate) bufsize: usize,
    /// Whether the ring accumulates send/conflation counters.
    pub(crate) enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration for the given segment size.
    ///
    /// # Panics
    ///
    /// Panics if `bufsize` is zero.
    #[must_use]
    pub const fn new(bufsize: usize) -> Self {
        assert!(bufsize > 0, "bufsize must be greater than zero");

        Self {
            bufsize,
            enable_metrics: false,
        }
    }

    /// Enables metrics collection on the resulting ring.
    #[must_use]
    pub const fn with_metrics(mut self) -> Self {
        self.enable_metrics = true;
        self
    }

    /// Returns the configured segment size in bytes.
    #[inline]
    #[must_use]
    pub const fn bufsize(&self) -> usize {
        self.bufsize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_carries_bufsize() {
        let config = Config::new(4096);
        assert_eq!(config.bufsize(), 4096);
        assert!(!config.enable_metrics);
    }

    #[test]
    fn with_metrics_toggles_flag() {
        let config = Config::new(16).with_metrics();
        assert!(config.enable_metrics);
    }

    #[test]
    #[should_panic(expected = "bufsize must be greater than zero")]
    fn zero_bufsize_panics() {
        Config::new(0);
    }
}
