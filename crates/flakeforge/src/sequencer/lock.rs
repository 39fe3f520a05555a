use core::{future::Future, marker::PhantomData, time::Duration};

use tokio::sync::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Config, GeneratorState, SleepProvider, Snowflake, SnowflakeGenerator, SystemClock,
    TimeSource, TokioSleep, codec,
};

/// How long the critical section sleeps when the increment is exhausted for
/// the current millisecond.
pub const EXHAUSTED_BACKOFF: Duration = Duration::from_millis(2);

/// The concurrent-mode generator.
///
/// Generation runs inside a critical section guarded by a
/// [`tokio::sync::Mutex`], whose waiters are served in FIFO order. Within one
/// millisecond the increments handed out are `0, 1, 2, ...` with no gaps;
/// once `2^increment_bits` snowflakes have been issued, the section sleeps
/// for [`EXHAUSTED_BACKOFF`] until the clock moves, then restarts the
/// increment at zero. A rollover is therefore always paired with a fresh
/// timestamp and never produces a duplicate.
///
/// No OS thread blocks: waiting for the section and the backoff are both
/// `.await` points. There is no timeout on acquisition. The backoff is
/// awaited through the [`SleepProvider`] `S`, [`TokioSleep`] by default,
/// which needs the tokio time driver; swap it with [`Self::with_sleep`].
///
/// ## Cancellation
///
/// Dropping a queued [`Self::generate`] future removes it from the queue.
/// Dropping it during the backoff releases the section without consuming an
/// increment.
///
/// ## See Also
/// - [`BasicSequencer`]
/// - [`Sequencer`]
///
/// [`BasicSequencer`]: crate::BasicSequencer
/// [`Sequencer`]: crate::Sequencer
#[derive(Debug)]
pub struct LockSequencer<T = SystemClock, S = TokioSleep> {
    config: Config,
    time: T,
    state: Mutex<LockState>,
    _sleep: PhantomData<fn() -> S>,
}

#[derive(Debug)]
struct LockState {
    last_timestamp: u64,
    // `None` until something is issued at `last_timestamp`.
    increment: Option<u64>,
}

impl LockSequencer<SystemClock> {
    /// Creates a generator reading the host wall clock.
    ///
    /// # Example
    /// ```
    /// use flakeforge::{Config, LockSequencer};
    ///
    /// # tokio_test();
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn tokio_test() {
    /// let generator = LockSequencer::new(Config::default());
    /// let a = generator.generate().await;
    /// let b = generator.generate().await;
    /// assert!(a < b);
    /// # }
    /// ```
    pub fn new(config: Config) -> Self {
        Self::with_time(config, SystemClock)
    }
}

impl<T: TimeSource> LockSequencer<T> {
    /// Creates a generator reading `time`.
    ///
    /// The last timestamp is seeded with the construction time and nothing is
    /// marked as issued, so the first snowflake carries increment 0.
    pub fn with_time(config: Config, time: T) -> Self {
        let last_timestamp = time.current_millis();
        Self {
            config,
            time,
            state: Mutex::new(LockState {
                last_timestamp,
                increment: None,
            }),
            _sleep: PhantomData,
        }
    }

    /// Creates a generator resuming from explicit state.
    ///
    /// `state.increment` is treated as already issued at
    /// `state.last_timestamp`. An increment at or above the maximum is
    /// clamped to it, so the next call within that millisecond waits for the
    /// clock to move.
    pub fn from_components(config: Config, time: T, state: GeneratorState) -> Self {
        let increment = state.increment.min(config.layout().max_increment());
        Self {
            config,
            time,
            state: Mutex::new(LockState {
                last_timestamp: state.last_timestamp,
                increment: Some(increment),
            }),
            _sleep: PhantomData,
        }
    }
}

impl<T: TimeSource, S: SleepProvider> LockSequencer<T, S> {
    /// Returns the same generator awaiting its backoff through `S2`.
    ///
    /// # Example
    /// ```
    /// use flakeforge::{Config, LockSequencer, TokioYield};
    ///
    /// // A runtime without the time driver.
    /// let runtime = tokio::runtime::Builder::new_current_thread()
    ///     .build()
    ///     .unwrap();
    /// let generator = LockSequencer::new(Config::default()).with_sleep::<TokioYield>();
    /// let id = runtime.block_on(generator.generate());
    /// assert!(!id.is_zero());
    /// ```
    pub fn with_sleep<S2: SleepProvider>(self) -> LockSequencer<T, S2> {
        LockSequencer {
            config: self.config,
            time: self.time,
            state: self.state,
            _sleep: PhantomData,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Generates the next snowflake, suspending while another caller holds
    /// the critical section or while the increment is exhausted.
    ///
    /// # Panics
    ///
    /// With the default [`TokioSleep`] provider, panics if the increment is
    /// exhausted while running on a tokio runtime without the time driver.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub async fn generate(&self) -> Snowflake {
        let mut state = self.state.lock().await;
        let now = self.time.current_millis();

        if now == state.last_timestamp {
            let next = state.increment.map_or(0, |issued| issued + 1);
            if next > self.config.layout().max_increment() {
                let fresh = self.wait_past(now).await;
                *state = LockState {
                    last_timestamp: fresh,
                    increment: Some(0),
                };
            } else {
                state.increment = Some(next);
            }
        } else {
            #[cfg(feature = "tracing")]
            if now < state.last_timestamp {
                cold_clock_behind(now, state.last_timestamp);
            }
            *state = LockState {
                last_timestamp: now,
                increment: Some(0),
            };
        }

        let increment = state.increment.unwrap_or(0);
        codec::pack_node(
            &self.config,
            state.last_timestamp,
            self.config.node_bits(),
            increment,
        )
    }

    /// Sleeps in [`EXHAUSTED_BACKOFF`] steps until the clock leaves
    /// `exhausted`, returning the new reading.
    async fn wait_past(&self, exhausted: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(timestamp = exhausted, "increment exhausted; waiting for the clock");
        loop {
            S::sleep_for(EXHAUSTED_BACKOFF).await;
            let now = self.time.current_millis();
            if now != exhausted {
                break now;
            }
        }
    }
}

#[cfg(feature = "tracing")]
#[cold]
#[inline(never)]
fn cold_clock_behind(now: u64, last_timestamp: u64) {
    tracing::warn!(
        now,
        last_timestamp,
        behind_ms = last_timestamp - now,
        "clock moved backwards; adopting the earlier timestamp"
    );
}

impl<T, S> SnowflakeGenerator for LockSequencer<T, S>
where
    T: TimeSource + Send + Sync,
    S: SleepProvider,
{
    fn config(&self) -> &Config {
        self.config()
    }

    fn generate(&self) -> impl Future<Output = Snowflake> + Send {
        LockSequencer::generate(self)
    }
}
