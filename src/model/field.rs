//! Explicit present/absent wrapper for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// A patch field that distinguishes "key absent from the payload" from "key
/// present" (including present-as-null, via `Field<Option<T>>`). Combined
/// with `#[serde(default)]`, an omitted key deserializes to `Missing` and a
/// provided key to `Set`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Missing,
    Set(T),
}

impl<T> Field<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Set(v) => Some(v),
            Field::Missing => None,
        }
    }

    /// The new value, when explicitly set and different from `current`.
    /// Unset and set-but-equal fields both yield `None`, so callers collect
    /// exactly the minimal changed-column set.
    pub fn changed_from<'a>(&'a self, current: &T) -> Option<&'a T>
    where
        T: PartialEq,
    {
        match self {
            Field::Set(v) if v != current => Some(v),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Set)
    }
}
