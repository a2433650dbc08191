use serde::de::IntoDeserializer as _;
use serde::{Deserialize, Deserializer};

/// Blank and whitespace-only form fields deserialize as `None`.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let Some(str) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let str = str.trim();
    if str.is_empty() {
        Ok(None)
    } else {
        T::deserialize(str.into_deserializer()).map(Some)
    }
}
