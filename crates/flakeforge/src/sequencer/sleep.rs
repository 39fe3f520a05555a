use core::{future::Future, time::Duration};

/// Supplies the delay [`LockSequencer`] awaits while the increment is
/// exhausted for the current millisecond.
///
/// Implement this to run the concurrent generator on an executor other than
/// a timer-enabled tokio runtime.
///
/// [`LockSequencer`]: crate::LockSequencer
pub trait SleepProvider {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeps with [`tokio::time::sleep`]. The default provider.
///
/// # Panics
///
/// The returned future panics when polled outside a tokio runtime with the
/// time driver enabled (`enable_time` or `enable_all` on the builder;
/// `#[tokio::main]` enables it). Use [`TokioYield`] or a custom provider on
/// runtimes built without timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(dur)
    }
}

/// Yields to the scheduler instead of sleeping, re-reading the clock as soon
/// as the task is polled again. Needs no time driver, at the cost of
/// spinning through the scheduler until the millisecond passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioYield;

impl SleepProvider for TokioYield {
    async fn sleep_for(_dur: Duration) {
        tokio::task::yield_now().await;
    }
}
