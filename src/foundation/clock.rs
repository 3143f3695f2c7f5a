use std::time::{Duration, Instant};

/// Time source for every scheduling loop in the crate.
///
/// Progress is always derived from `now()`, never from a tick count, so a loop that wakes up
/// late simply samples further along its curve.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
    /// Block until roughly `d` has passed.
    fn sleep(&mut self, d: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Virtual clock for tests: time only moves when something sleeps.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Duration,
    jitter: Duration,
    sleeps: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sleep overshoots by `jitter`, like a loaded scheduler would.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Move time forward without counting a sleep.
    pub fn advance(&mut self, d: Duration) {
        self.now += d;
    }

    /// Number of `sleep` calls seen so far.
    pub fn sleeps(&self) -> u64 {
        self.sleeps
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, d: Duration) {
        self.sleeps += 1;
        self.now += d + self.jitter;
    }
}
