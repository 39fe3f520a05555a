/// A result type defaulting to this crate's [`Error`].
///
/// Generation and deconstruction are infallible; only construction and the
/// strict parsing/narrowing conversions on [`crate::Snowflake`] return this.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakeforge` can emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The increment, process and worker widths do not add up to the fixed
    /// 22-bit budget.
    ///
    /// Raised only while building a [`crate::Config`]. No generator exists
    /// after this error.
    #[error(
        "invalid bit width configuration: increment ({increment_bits}) + process \
         ({process_bits}) + worker ({worker_bits}) must equal {expected}"
    )]
    InvalidBitWidthConfiguration {
        /// Requested increment width.
        increment_bits: u32,
        /// Requested process id width.
        process_bits: u32,
        /// Requested worker id width.
        worker_bits: u32,
        /// The required total, always [`crate::BitLayout::TOTAL_BITS`].
        expected: u32,
    },

    /// The input is not a base-10 unsigned integer.
    ///
    /// Only the strict [`core::str::FromStr`] path reports this. The lenient
    /// deconstruction path treats such input as zero.
    #[error("invalid snowflake: {input:?} is not a decimal integer")]
    InvalidSnowflake {
        /// The rejected input.
        input: String,
    },

    /// The snowflake no longer fits in the requested native integer.
    #[error("snowflake does not fit in {bits} bits")]
    Overflow {
        /// Width of the target integer type.
        bits: u32,
    },
}
