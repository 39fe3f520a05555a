use core::{fmt, str::FromStr};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::{Error, Result};

/// A packed identifier.
///
/// Wraps an arbitrary-precision unsigned integer: the timestamp field is
/// unbounded, so a snowflake eventually outgrows any native integer. Ordering
/// follows the numeric value, which sorts snowflakes by timestamp first.
///
/// [`fmt::Display`] renders base-10 with no leading zeros or separators.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(BigUint);

impl Snowflake {
    /// Borrows the underlying integer.
    pub const fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Unwraps the underlying integer.
    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Snowflake {
    type Err = Error;

    /// Parses a base-10 unsigned integer.
    ///
    /// Signs, separators, whitespace and radix prefixes are rejected.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidSnowflake {
                input: s.to_owned(),
            });
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| Error::InvalidSnowflake {
                input: s.to_owned(),
            })
    }
}

impl From<BigUint> for Snowflake {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Snowflake {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<Snowflake> for BigUint {
    fn from(value: Snowflake) -> Self {
        value.0
    }
}

impl TryFrom<&Snowflake> for u64 {
    type Error = Error;

    fn try_from(value: &Snowflake) -> Result<Self> {
        value.0.to_u64().ok_or(Error::Overflow { bits: 64 })
    }
}

impl TryFrom<Snowflake> for u64 {
    type Error = Error;

    fn try_from(value: Snowflake) -> Result<Self> {
        Self::try_from(&value)
    }
}

impl TryFrom<&Snowflake> for u128 {
    type Error = Error;

    fn try_from(value: &Snowflake) -> Result<Self> {
        value.0.to_u128().ok_or(Error::Overflow { bits: 128 })
    }
}

/// Conversion into a [`Snowflake`] for deconstruction.
///
/// Accepts decimal text, native integers, and arbitrary-precision integers.
/// The conversion is total: text that is not a decimal integer becomes zero,
/// which deconstructs to the epoch with every other field zero. Use
/// [`Snowflake::from_str`] when malformed text should be an error.
pub trait IntoSnowflake {
    fn into_snowflake(self) -> Snowflake;
}

impl IntoSnowflake for Snowflake {
    fn into_snowflake(self) -> Snowflake {
        self
    }
}

impl IntoSnowflake for &Snowflake {
    fn into_snowflake(self) -> Snowflake {
        self.clone()
    }
}

impl IntoSnowflake for BigUint {
    fn into_snowflake(self) -> Snowflake {
        Snowflake(self)
    }
}

impl IntoSnowflake for &BigUint {
    fn into_snowflake(self) -> Snowflake {
        Snowflake(self.clone())
    }
}

impl IntoSnowflake for u64 {
    fn into_snowflake(self) -> Snowflake {
        Snowflake::from(self)
    }
}

impl IntoSnowflake for u128 {
    fn into_snowflake(self) -> Snowflake {
        Snowflake::from(self)
    }
}

impl IntoSnowflake for &str {
    fn into_snowflake(self) -> Snowflake {
        self.parse().unwrap_or_else(|_err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(err = %_err, "deconstructing unparsable input as zero");
            Snowflake::default()
        })
    }
}

impl IntoSnowflake for String {
    fn into_snowflake(self) -> Snowflake {
        self.as_str().into_snowflake()
    }
}

impl IntoSnowflake for &String {
    fn into_snowflake(self) -> Snowflake {
        self.as_str().into_snowflake()
    }
}

/// A generated snowflake rendered per [`crate::OutputFormat`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Output {
    /// Base-10 text.
    Text(String),
    /// The integer itself.
    Numeric(Snowflake),
}

impl Output {
    /// Returns the integer, parsing it back out of the text form if needed.
    pub fn into_snowflake(self) -> Snowflake {
        match self {
            Self::Text(text) => text.into_snowflake(),
            Self::Numeric(id) => id,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Numeric(id) => fmt::Display::fmt(id, f),
        }
    }
}
