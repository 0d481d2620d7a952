pub mod company;
pub mod job;

use serde::{Deserialize, Deserializer};

/// Deserializer for nullable columns in PATCH bodies, distinguishing "field
/// absent" from "field explicitly set to null": paired with
/// `#[serde(default)]`, an absent field stays `None` while an explicit null
/// becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
