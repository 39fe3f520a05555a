use core::future::Future;

use crate::{
    BasicSequencer, Config, Deconstructed, IntoSnowflake, LockSequencer, Output, Result,
    SleepProvider, Snowflake, SnowflakeGenerator, SnowflakeOptions, SystemClock, TimeSource,
    TokioSleep, codec,
};

/// A generator whose mode is picked by [`SnowflakeOptions::concurrent`].
///
/// This is the usual entry point: build it from options, then `generate` and
/// `deconstruct`. Construction fails if the bit widths are invalid, so no
/// half-configured generator is ever observable.
///
/// # Example
/// ```
/// use flakeforge::{Sequencer, SnowflakeOptions};
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let generator = Sequencer::new(SnowflakeOptions {
///     worker_id: 4,
///     process_id: 9,
///     concurrent: true,
///     ..SnowflakeOptions::default()
/// })
/// .unwrap();
///
/// let id = generator.generate().await;
/// let fields = generator.deconstruct(&id);
/// assert_eq!((fields.worker_id, fields.process_id), (4, 9));
/// assert!(fields.timestamp_millis().is_some());
/// # }
/// ```
#[derive(Debug)]
pub enum Sequencer<T = SystemClock, S = TokioSleep> {
    Sequential(BasicSequencer<T>),
    Concurrent(LockSequencer<T, S>),
}

impl Sequencer<SystemClock> {
    /// Validates `options` and builds a generator reading the host wall
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidBitWidthConfiguration`] unless the
    /// widths add up to 22.
    pub fn new(options: SnowflakeOptions) -> Result<Self> {
        Self::with_time(options, SystemClock)
    }
}

impl<T: TimeSource> Sequencer<T> {
    /// Validates `options` and builds a generator reading `time`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidBitWidthConfiguration`] unless the
    /// widths add up to 22.
    pub fn with_time(options: SnowflakeOptions, time: T) -> Result<Self> {
        Ok(Self::from_config(Config::try_from(options)?, time))
    }

    /// Builds a generator from an already validated configuration.
    pub fn from_config(config: Config, time: T) -> Self {
        if config.is_concurrent() {
            Self::Concurrent(LockSequencer::with_time(config, time))
        } else {
            Self::Sequential(BasicSequencer::with_time(config, time))
        }
    }
}

impl<T: TimeSource, S: SleepProvider> Sequencer<T, S> {
    /// Returns the same generator with the concurrent backoff awaited
    /// through `S2`. Sequential mode never sleeps and is unaffected.
    pub fn with_sleep<S2: SleepProvider>(self) -> Sequencer<T, S2> {
        match self {
            Self::Sequential(generator) => Sequencer::Sequential(generator),
            Self::Concurrent(generator) => Sequencer::Concurrent(generator.with_sleep()),
        }
    }

    pub const fn config(&self) -> &Config {
        match self {
            Self::Sequential(generator) => generator.config(),
            Self::Concurrent(generator) => generator.config(),
        }
    }

    /// Generates the next snowflake.
    ///
    /// Resolves on first poll in sequential mode.
    pub async fn generate(&self) -> Snowflake {
        match self {
            Self::Sequential(generator) => generator.generate(),
            Self::Concurrent(generator) => generator.generate().await,
        }
    }

    /// Generates the next snowflake rendered per the configured
    /// [`crate::OutputFormat`].
    pub async fn generate_output(&self) -> Output {
        let id = self.generate().await;
        self.config().render(id)
    }

    /// Recovers the fields of a snowflake. Never fails; see
    /// [`codec::unpack`].
    pub fn deconstruct(&self, value: impl IntoSnowflake) -> Deconstructed {
        codec::unpack(&value.into_snowflake(), self.config())
    }
}

impl<T, S> SnowflakeGenerator for Sequencer<T, S>
where
    T: TimeSource + Send + Sync,
    S: SleepProvider,
{
    fn config(&self) -> &Config {
        self.config()
    }

    fn generate(&self) -> impl Future<Output = Snowflake> + Send {
        Sequencer::generate(self)
    }
}
