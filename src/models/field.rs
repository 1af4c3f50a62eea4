use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state value of an optional field in a partial update.
///
/// `Unset` means the key was absent from the body and the stored value must
/// stay as it is. `Null` means the caller sent `null` to clear the value.
/// `Value` carries a provided value.
///
/// Struct fields using this type need `#[serde(default)]` so an absent key
/// lands on `Unset`, and `skip_serializing_if = "Field::is_unset"` so it is
/// not written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Unset,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> Field<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// True when the caller supplied the key, either as `null` or a value
    pub fn is_provided(&self) -> bool {
        !self.is_unset()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Merge a patch onto this value: a provided patch replaces it, an
    /// unset patch leaves it alone.
    pub fn apply(&mut self, patch: Field<T>) {
        if patch.is_provided() {
            *self = patch;
        }
    }
}

impl<T: Copy> Field<T> {
    /// Resolve to a concrete value, using `default` when unset or cleared
    pub fn unwrap_or(&self, default: T) -> T {
        match self {
            Field::Value(v) => *v,
            _ => default,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
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
        // Only reached when the key is present; absence comes from Default.
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

impl<T> Serialize for Field<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}
