use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::{Config, Error, Result, Snowflake};

/// Bit allocation for the three low-order fields of a [`Snowflake`].
///
/// From most to least significant, a snowflake holds:
///
/// ```text
/// | timestamp delta (unbounded) | worker id | process id | increment |
///                               |<------- TOTAL_BITS (22) ------->|
/// ```
///
/// The three widths always add up to [`BitLayout::TOTAL_BITS`]; a layout
/// that does not is rejected by [`BitLayout::new`]. The timestamp field has
/// no fixed width and grows as the clock moves away from the epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    increment_bits: u32,
    process_bits: u32,
    worker_bits: u32,
}

impl BitLayout {
    /// The fixed budget shared by the increment, process id and worker id.
    pub const TOTAL_BITS: u32 = 22;

    /// 12 increment bits, 5 process bits, 5 worker bits.
    pub const DEFAULT: Self = Self {
        increment_bits: 12,
        process_bits: 5,
        worker_bits: 5,
    };

    /// Validates a layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBitWidthConfiguration`] unless the three widths
    /// add up to exactly [`Self::TOTAL_BITS`].
    ///
    /// # Example
    ///
    /// ```
    /// use flakeforge::{BitLayout, Error};
    ///
    /// assert!(BitLayout::new(12, 5, 5).is_ok());
    /// assert!(matches!(
    ///     BitLayout::new(12, 5, 4),
    ///     Err(Error::InvalidBitWidthConfiguration { .. })
    /// ));
    /// ```
    pub fn new(increment_bits: u32, process_bits: u32, worker_bits: u32) -> Result<Self> {
        let total = increment_bits
            .checked_add(process_bits)
            .and_then(|sum| sum.checked_add(worker_bits));

        if total != Some(Self::TOTAL_BITS) {
            return Err(Error::InvalidBitWidthConfiguration {
                increment_bits,
                process_bits,
                worker_bits,
                expected: Self::TOTAL_BITS,
            });
        }

        Ok(Self {
            increment_bits,
            process_bits,
            worker_bits,
        })
    }

    pub const fn increment_bits(&self) -> u32 {
        self.increment_bits
    }

    pub const fn process_bits(&self) -> u32 {
        self.process_bits
    }

    pub const fn worker_bits(&self) -> u32 {
        self.worker_bits
    }

    /// Position of the lowest process id bit.
    pub const fn process_shift(&self) -> u32 {
        self.increment_bits
    }

    /// Position of the lowest worker id bit.
    pub const fn worker_shift(&self) -> u32 {
        self.increment_bits + self.process_bits
    }

    /// Largest increment that fits, `2^increment_bits - 1`.
    pub const fn max_increment(&self) -> u64 {
        mask(self.increment_bits)
    }

    /// Largest process id that fits, `2^process_bits - 1`.
    pub const fn max_process_id(&self) -> u64 {
        mask(self.process_bits)
    }

    /// Largest worker id that fits, `2^worker_bits - 1`.
    pub const fn max_worker_id(&self) -> u64 {
        mask(self.worker_bits)
    }

    /// Places the worker and process ids at their final bit positions.
    ///
    /// Both ids are reduced modulo their field width first, so the result
    /// never spills into the increment or timestamp fields.
    pub const fn node_bits(&self, worker_id: u64, process_id: u64) -> u64 {
        ((worker_id & self.max_worker_id()) << self.worker_shift())
            | ((process_id & self.max_process_id()) << self.process_shift())
    }
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// Widths are validated to be at most 22, so the shift never overflows.
const fn mask(bits: u32) -> u64 {
    (1 << bits) - 1
}

const LOW_MASK: u64 = mask(BitLayout::TOTAL_BITS);

/// The four fields recovered from a [`Snowflake`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Deconstructed {
    /// Milliseconds since 1970-01-01 UTC, with the epoch added back.
    ///
    /// Unbounded like the timestamp field itself, so foreign input decodes
    /// without loss. Serializes as an integer while it fits in 64 bits and
    /// as decimal text beyond that.
    #[cfg_attr(feature = "serde", serde(with = "crate::serde::timestamp"))]
    pub timestamp: BigUint,
    pub worker_id: u64,
    pub process_id: u64,
    pub increment: u64,
}

impl Deconstructed {
    /// The timestamp as native milliseconds, or `None` if it does not fit.
    pub fn timestamp_millis(&self) -> Option<u64> {
        self.timestamp.to_u64()
    }
}

/// Packs the four fields into a [`Snowflake`].
///
/// `worker_id` and `process_id` are reduced modulo their field widths;
/// `increment` is expected to be below `2^increment_bits` and is masked to
/// that range. A `timestamp` earlier than the configured epoch encodes a
/// zero delta.
///
/// # Example
///
/// ```
/// use flakeforge::{Config, SnowflakeOptions, codec};
///
/// let config = Config::try_from(SnowflakeOptions::default()).unwrap();
/// let id = codec::pack(&config, 1_514_790_000_000, 4, 9, 3242);
/// assert_eq!(id.to_string(), "397282797158964394");
/// ```
pub fn pack(
    config: &Config,
    timestamp: u64,
    worker_id: u64,
    process_id: u64,
    increment: u64,
) -> Snowflake {
    let node_bits = config.layout().node_bits(worker_id, process_id);
    pack_node(config, timestamp, node_bits, increment)
}

/// Packs a timestamp and increment against pre-shifted node bits.
///
/// This is the hot path used by the generators, which compute
/// [`BitLayout::node_bits`] once at construction.
pub(crate) fn pack_node(config: &Config, timestamp: u64, node_bits: u64, increment: u64) -> Snowflake {
    let delta = timestamp_delta(timestamp, config.epoch());
    let low = node_bits | (increment & config.layout().max_increment());
    Snowflake::from((BigUint::from(delta) << BitLayout::TOTAL_BITS) + low)
}

fn timestamp_delta(timestamp: u64, epoch: u64) -> u64 {
    match timestamp.checked_sub(epoch) {
        Some(delta) => delta,
        None => cold_before_epoch(timestamp, epoch),
    }
}

#[cold]
#[inline(never)]
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn cold_before_epoch(timestamp: u64, epoch: u64) -> u64 {
    #[cfg(feature = "tracing")]
    tracing::warn!(timestamp, epoch, "clock reads earlier than the epoch; encoding a zero timestamp delta");
    0
}

/// Recovers the four fields of a [`Snowflake`].
///
/// There is no check that `snowflake` was produced under `config`: foreign
/// input yields some set of fields rather than an error.
///
/// # Example
///
/// ```
/// use flakeforge::{Config, Snowflake, SnowflakeOptions, codec};
///
/// let config = Config::try_from(SnowflakeOptions::default()).unwrap();
/// let id: Snowflake = "397282797158964394".parse().unwrap();
/// let fields = codec::unpack(&id, &config);
///
/// assert_eq!(fields.timestamp_millis(), Some(1_514_790_000_000));
/// assert_eq!(fields.worker_id, 4);
/// assert_eq!(fields.process_id, 9);
/// assert_eq!(fields.increment, 3242);
/// ```
pub fn unpack(snowflake: &Snowflake, config: &Config) -> Deconstructed {
    let layout = config.layout();
    let value = snowflake.as_biguint();
    let low = value.iter_u64_digits().next().unwrap_or(0) & LOW_MASK;

    let timestamp = (value >> BitLayout::TOTAL_BITS) + config.epoch();

    let worker_mask = layout.max_worker_id() << layout.worker_shift();
    let process_mask = layout.max_process_id() << layout.process_shift();

    Deconstructed {
        timestamp,
        worker_id: (low & worker_mask) >> layout.worker_shift(),
        process_id: (low & process_mask) >> layout.process_shift(),
        increment: low & layout.max_increment(),
    }
}
