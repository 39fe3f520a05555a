use core::future::{self, Future};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Config, GeneratorState, Snowflake, SnowflakeGenerator, SystemClock, TimeSource, codec,
};

/// The sequential-mode generator.
///
/// Every call advances the increment by one modulo `2^increment_bits` and
/// packs it with the current clock reading. There is no lock and no
/// suspension: the increment is bumped with a single atomic
/// read-modify-write, so the generator is also safe to share across threads.
///
/// ## Trade-off
///
/// The increment is **never** reset when the timestamp changes. Once more
/// than `2^increment_bits` snowflakes are generated within one millisecond
/// the counter wraps and a duplicate is possible. Use [`LockSequencer`] when
/// that matters.
///
/// ## See Also
/// - [`LockSequencer`]
/// - [`Sequencer`]
///
/// [`LockSequencer`]: crate::LockSequencer
/// [`Sequencer`]: crate::Sequencer
#[derive(Debug)]
pub struct BasicSequencer<T = SystemClock> {
    config: Config,
    time: T,
    last_timestamp: AtomicU64,
    increment: AtomicU64,
}

impl BasicSequencer<SystemClock> {
    /// Creates a generator reading the host wall clock.
    ///
    /// # Example
    /// ```
    /// use flakeforge::{BasicSequencer, Config};
    ///
    /// let generator = BasicSequencer::new(Config::default());
    /// let a = generator.generate();
    /// let b = generator.generate();
    /// assert_ne!(a, b);
    /// ```
    pub fn new(config: Config) -> Self {
        Self::with_time(config, SystemClock)
    }
}

impl<T: TimeSource> BasicSequencer<T> {
    /// Creates a generator reading `time`.
    ///
    /// The last timestamp is seeded with the construction time and the
    /// increment with the value one before zero, so the first snowflake
    /// carries increment 0.
    pub fn with_time(config: Config, time: T) -> Self {
        let state = GeneratorState {
            last_timestamp: time.current_millis(),
            increment: config.layout().max_increment(),
        };
        Self::from_components(config, time, state)
    }

    /// Creates a generator resuming from explicit state.
    ///
    /// The next snowflake carries `state.increment + 1`, wrapped to the
    /// increment width. An increment at or above the maximum is clamped to
    /// it, so the next snowflake carries increment 0.
    pub fn from_components(config: Config, time: T, state: GeneratorState) -> Self {
        let increment = state.increment.min(config.layout().max_increment());
        Self {
            config,
            time,
            last_timestamp: AtomicU64::new(state.last_timestamp),
            increment: AtomicU64::new(increment),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// A snapshot of the clock/increment state.
    pub fn state(&self) -> GeneratorState {
        GeneratorState {
            last_timestamp: self.last_timestamp.load(Ordering::Relaxed),
            increment: self.increment.load(Ordering::Relaxed),
        }
    }

    /// Generates the next snowflake without suspending.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Snowflake {
        let increment = self.next_increment();
        let now = self.time.current_millis();
        self.last_timestamp.store(now, Ordering::Relaxed);
        codec::pack_node(&self.config, now, self.config.node_bits(), increment)
    }

    fn next_increment(&self) -> u64 {
        let max = self.config.layout().max_increment();
        let step = |current: u64| current.wrapping_add(1) & max;
        let previous = match self
            .increment
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(step(current))
            }) {
            Ok(previous) | Err(previous) => previous,
        };
        step(previous)
    }
}

impl<T> SnowflakeGenerator for BasicSequencer<T>
where
    T: TimeSource + Send + Sync,
{
    fn config(&self) -> &Config {
        self.config()
    }

    fn generate(&self) -> impl Future<Output = Snowflake> + Send {
        future::ready(BasicSequencer::generate(self))
    }
}
