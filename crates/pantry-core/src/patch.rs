//! Serde support for partial updates.

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in patch bodies. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}
