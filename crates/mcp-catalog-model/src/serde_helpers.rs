// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A JSON value read where text is expected.
///
/// Harvested manifests are not consistent about numeric ids or boolean-ish
/// names. Strings, numbers and booleans have a text form used for identity
/// and collision checks; `null` and structured values have none. The original
/// value is what gets written back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextValue {
    raw: Value,
    text: Option<String>,
}

impl TextValue {
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let text = match &raw {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        };
        Self { raw, text }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}

impl From<&str> for TextValue {
    fn from(value: &str) -> Self {
        Self::from_value(Value::String(value.to_string()))
    }
}

impl From<String> for TextValue {
    fn from(value: String) -> Self {
        Self::from_value(Value::String(value))
    }
}

impl Serialize for TextValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TextValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Distinguishes a key that is absent from a key that is present with `null`.
pub mod present {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        T::deserialize(deserializer).map(Some)
    }
}
