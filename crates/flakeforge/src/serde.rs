use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};

use crate::{Output, Snowflake};

impl Serialize for Snowflake {
    /// Serializes as decimal text, which survives JSON consumers that read
    /// numbers as doubles.
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    /// Accepts decimal text or a non-negative integer.
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        d.deserialize_any(SnowflakeVisitor)
    }
}

struct SnowflakeVisitor;

impl Visitor<'_> for SnowflakeVisitor {
    type Value = Snowflake;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or a non-negative integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Snowflake, E> {
        Ok(Snowflake::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Snowflake, E> {
        Ok(Snowflake::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Snowflake, E> {
        u64::try_from(v)
            .map(Snowflake::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Snowflake, E> {
        v.parse().map_err(E::custom)
    }
}

impl Serialize for Output {
    /// Text serializes as a string. Numeric output serializes as the
    /// narrowest native integer that holds it, falling back to decimal text
    /// once it outgrows 128 bits.
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(text) => s.serialize_str(text),
            Self::Numeric(id) => {
                if let Ok(n) = u64::try_from(id) {
                    s.serialize_u64(n)
                } else if let Ok(n) = u128::try_from(id) {
                    s.serialize_u128(n)
                } else {
                    id.serialize(s)
                }
            }
        }
    }
}

/// `Deconstructed::timestamp`: an integer while it fits in 64 bits, decimal
/// text beyond that. Reads either form.
pub(crate) mod timestamp {
    use num_bigint::BigUint;
    use num_traits::ToPrimitive;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::Snowflake;

    pub(crate) fn serialize<S>(value: &BigUint, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value.to_u64() {
            Some(millis) => s.serialize_u64(millis),
            None => s.collect_str(value),
        }
    }

    pub(crate) fn deserialize<'de, D>(d: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        Snowflake::deserialize(d).map(Snowflake::into_biguint)
    }
}
