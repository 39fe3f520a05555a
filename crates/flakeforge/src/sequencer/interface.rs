use core::future::Future;

use crate::{Config, Deconstructed, IntoSnowflake, Snowflake, codec};

/// A minimal interface shared by the generators.
///
/// Both generation modes are expressed as a future: the sequential generator
/// resolves immediately, the concurrent one may suspend while waiting for the
/// critical section or for the clock to advance.
pub trait SnowflakeGenerator {
    /// The frozen configuration this generator packs with.
    fn config(&self) -> &Config;

    /// Generates the next snowflake.
    fn generate(&self) -> impl Future<Output = Snowflake> + Send;

    /// Recovers the fields of a snowflake under this generator's
    /// configuration. Never fails; see [`codec::unpack`].
    fn deconstruct(&self, value: impl IntoSnowflake) -> Deconstructed {
        codec::unpack(&value.into_snowflake(), self.config())
    }
}
