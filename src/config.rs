use embedded_time::duration::Microseconds;

/// Timing of the synchronized write protocol.
///
/// The defaults fit the unit's 32.768 kHz low power domain: a write needs four of its cycles
/// (122 μs) to land.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Fixed wait after each write while bringing the unit up
    pub settle: Microseconds<u32>,
    /// How long to poll for write complete or write error
    pub write_timeout: Microseconds<u32>,
    /// Pause between two status polls
    pub poll_interval: Microseconds<u32>,
    /// How many times to look for the write error flag to clear
    pub clear_retries: u32,
    /// Pause between two looks at the write error flag
    pub clear_interval: Microseconds<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settle: Microseconds(130),
            write_timeout: Microseconds(1_000),
            poll_interval: Microseconds(10),
            clear_retries: 1_000,
            clear_interval: Microseconds(10),
        }
    }
}

impl Config {
    pub fn settle(mut self, settle: Microseconds<u32>) -> Self {
        self.settle = settle;
        self
    }

    pub fn write_timeout(mut self, timeout: Microseconds<u32>) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Microseconds<u32>) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn clear_retries(mut self, retries: u32) -> Self {
        self.clear_retries = retries;
        self
    }

    pub fn clear_interval(mut self, interval: Microseconds<u32>) -> Self {
        self.clear_interval = interval;
        self
    }

    /// Number of status polls that fit in the write timeout. Always at least one.
    pub(crate) fn polls(&self) -> u32 {
        (self.write_timeout.0 / self.poll_interval.0.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settle_covers_four_slow_cycles() {
        // 4 / 32768 Hz
        assert!(Config::default().settle.0 >= 123);
    }

    #[test]
    fn polls_fill_the_timeout() {
        assert_eq!(Config::default().polls(), 100);
        assert_eq!(
            Config::default()
                .write_timeout(Microseconds(5))
                .poll_interval(Microseconds(10))
                .polls(),
            1
        );
        assert_eq!(Config::default().poll_interval(Microseconds(0)).polls(), 1_000);
    }
}
