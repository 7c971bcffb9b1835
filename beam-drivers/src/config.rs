//! Driver timing configuration

/// Bus and sequencing timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeamConfig {
    /// Reset line held low (ms)
    pub reset_low_ms: u32,
    /// Settle time after releasing reset (ms)
    pub reset_settle_ms: u32,
    /// Wait for read data before giving up (ms)
    pub read_timeout_ms: u32,
    /// Consecutive failed section selects before the bus is reset
    ///
    /// The count restarts after each reset, so a chip that stays missing
    /// resets the bus once every `failure_threshold` writes.
    pub failure_threshold: u16,
    /// Delay between cascade polls (ms)
    pub cascade_poll_ms: u32,
    /// Give up on a cascade after this long (ms)
    pub cascade_timeout_ms: u32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            reset_low_ms: 100,
            reset_settle_ms: 250,
            read_timeout_ms: 250,
            failure_threshold: 50,
            cascade_poll_ms: 10,
            cascade_timeout_ms: 5000,
        }
    }
}

impl BeamConfig {
    /// Override the reset pulse timings
    pub fn with_reset_timing(mut self, low_ms: u32, settle_ms: u32) -> Self {
        self.reset_low_ms = low_ms;
        self.reset_settle_ms = settle_ms;
        self
    }

    /// Override the read timeout
    pub fn with_read_timeout(mut self, timeout_ms: u32) -> Self {
        self.read_timeout_ms = timeout_ms;
        self
    }

    /// Override the write failure threshold (at least 1)
    pub fn with_failure_threshold(mut self, threshold: u16) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Override cascade polling
    pub fn with_cascade(mut self, poll_ms: u32, timeout_ms: u32) -> Self {
        self.cascade_poll_ms = poll_ms;
        self.cascade_timeout_ms = timeout_ms;
        self
    }
}
