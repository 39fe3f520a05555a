use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC. The default epoch.
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: u64 = 1_288_834_974_657;

/// Instagram epoch: Saturday, January 1, 2011 00:00:00 UTC
pub const INSTAGRAM_EPOCH: u64 = 1_293_840_000_000;

/// Mastodon uses standard UNIX epoch: Thursday, January 1, 1970 00:00:00 UTC
pub const MASTODON_EPOCH: u64 = 0;

/// A source of wall-clock timestamps.
///
/// Timestamps are **milliseconds since the Unix epoch**. The configured
/// snowflake epoch is subtracted later by the codec, so a time source never
/// needs to know about it.
///
/// This abstraction allows you to plug in the system clock or a mocked time
/// source in tests.
///
/// # Example
///
/// ```
/// use flakeforge::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_514_790_000_000
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_514_790_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// The host wall clock.
///
/// Reads [`SystemTime::now`] on every call. A host clock set before 1970
/// reads as `0` rather than panicking.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_default_epoch() {
        assert!(SystemClock.current_millis() > DISCORD_EPOCH);
    }

    #[test]
    fn shared_clock_delegates() {
        let clock = Arc::new(SystemClock);
        let before = SystemClock.current_millis();
        assert!(clock.current_millis() >= before);
    }
}
