//! Small, self-contained helpers

use std::{iter::Iterator, num::ParseIntError, time::Duration};

/// Exponential backoff iterator
///
/// This struct implements the iterator trait and returns monotonically increasing values until a
/// specified limit of iterations is reached. The first element equals the `initial` duration and
/// each subsequent element is the previous one multiplied by the `multiplier` property.
pub struct Backoff {
    retries: u32,
    limit: u32,
    multiplier: u32,
    current: Duration,
}

impl Backoff {
    /// Creates a new instance yielding `limit` durations starting at `initial`
    pub fn new(initial: Duration, multiplier: u32, limit: u32) -> Self {
        Self {
            retries: 0,
            limit,
            multiplier,
            current: initial,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 2, 3)
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        self.retries += 1;

        if self.retries > self.limit {
            None
        } else {
            let value = self.current;
            self.current *= self.multiplier;
            Some(value)
        }
    }
}

/// Parses a string containing a number of seconds into a [`Duration`]
pub fn parse_seconds(src: &str) -> Result<Duration, ParseIntError> {
    Ok(Duration::from_secs(src.parse()?))
}
