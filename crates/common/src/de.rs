//! Field deserializers for keys serde would otherwise default

use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer};

/// A key that must be present even though its value may be `null`
///
/// Going through `deserialize_with` turns a missing key into a
/// `missing field` error instead of silently decoding it as `None`.
pub(crate) fn required<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer)
}

/// A flag that is either absent or `true`
pub(crate) fn only_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match bool::deserialize(deserializer)? {
        true => Ok(true),
        false => Err(D::Error::invalid_value(Unexpected::Bool(false), &"`true` or an absent key")),
    }
}
