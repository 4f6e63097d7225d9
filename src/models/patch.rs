// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field-level patch values for partial updates.

use serde::{Deserialize, Deserializer};

/// A single field in a partial update.
///
/// A field that is absent from the request body deserializes to `Unset`
/// (via `#[serde(default)]` on the containing struct) and leaves the stored
/// value untouched. Any value present in the body, including `null` for
/// `Patch<Option<T>>`, becomes `Set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// Overwrite `target` if this field was set.
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        note: Patch<Option<String>>,
    }

    #[test]
    fn absent_fields_are_unset() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.name, Patch::Unset);
        assert_eq!(body.note, Patch::Unset);
    }

    #[test]
    fn null_clears_optional_field() {
        let body: Body = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(body.name, Patch::Unset);
        assert_eq!(body.note, Patch::Set(None));
    }

    #[test]
    fn null_is_rejected_for_required_field() {
        assert!(serde_json::from_str::<Body>(r#"{"name": null}"#).is_err());
    }

    #[test]
    fn apply_only_overwrites_set_fields() {
        let mut value = "old".to_string();
        Patch::Unset.apply_to(&mut value);
        assert_eq!(value, "old");

        Patch::Set("new".to_string()).apply_to(&mut value);
        assert_eq!(value, "new");
    }
}
