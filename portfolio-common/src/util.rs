use serde::{Deserialize, Deserializer, Serializer, de::Error};
use time::UtcDateTime;

/// Serde adapter storing a [`UtcDateTime`] as milliseconds since the unix epoch.
pub mod unix_millis {
    use super::{Deserialize, Deserializer, Error, Serializer, UtcDateTime};

    pub fn serialize<S>(value: &UtcDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = i64::try_from(value.unix_timestamp_nanos() / 1_000_000)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_i64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<UtcDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        UtcDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
            .map_err(D::Error::custom)
    }
}

/// Trims `value`, returning `None` when nothing is left.
#[must_use]
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
