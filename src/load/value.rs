//! A generic YAML value tree.
//!
//! `serde-saphyr` has no dynamic `Value` type, so documents are first
//! deserialized into [`DocValue`] and the readers walk it afterwards. Unlike
//! a schema-bound deserialize, a malformed field here never aborts the whole
//! document; it becomes a fault on that field.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// One node of a parsed workflow document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    /// An explicit `null` or `~`, or an empty value.
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// A signed 64-bit integer scalar.
    Integer(i64),
    /// A floating-point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence.
    Sequence(Vec<Self>),
    /// An ordered mapping with string keys.
    Mapping(IndexMap<String, Self>),
}

impl DocValue {
    /// Short name of the value's shape, used in type mismatch messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    /// Returns `true` for [`DocValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The entries, if this is a mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// The items, if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for DocValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(DocValueVisitor)
    }
}

struct DocValueVisitor;

impl<'de> Visitor<'de> for DocValueVisitor {
    type Value = DocValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(DocValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(DocValue::Integer(v))
    }

    // Integers beyond i64 cannot fit any field, so keep them as text and
    // let the field reader report the mismatch.
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or_else(|_| DocValue::String(v.to_string()), DocValue::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(DocValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(DocValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(DocValue::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(DocValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(DocValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        DocValue::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(DocValue::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, val)) = map.next_entry()? {
            entries.insert(key, val);
        }
        Ok(DocValue::Mapping(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(input: &str) -> Result<DocValue, serde_saphyr::Error> {
        serde_saphyr::from_str(input)
    }

    #[rstest]
    #[case("x: ~", "null")]
    #[case("x: true", "bool")]
    #[case("x: 3", "integer")]
    #[case("x: 1.5", "float")]
    #[case("x: hello", "string")]
    #[case("x: [1, 2]", "sequence")]
    #[case("x: {a: 1}", "mapping")]
    fn scalar_shapes_are_preserved(
        #[case] input: &str,
        #[case] kind: &str,
    ) -> Result<(), serde_saphyr::Error> {
        let value = parse(input)?;
        let field = value.as_mapping().and_then(|entries| entries.get("x"));
        assert_eq!(field.map(DocValue::kind), Some(kind));
        Ok(())
    }

    #[test]
    fn mapping_keeps_document_order() -> Result<(), serde_saphyr::Error> {
        let value = parse("zeta: 1\nalpha: 2\nmid: 3\n")?;
        let keys: Vec<&str> = value
            .as_mapping()
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        Ok(())
    }
}
