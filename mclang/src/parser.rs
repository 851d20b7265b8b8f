//! Decoding of Minecraft `lang/*.json` documents into [`TranslationMap`]s.
//!
//! A lang document is a flat JSON object of string keys to string values.
//! Anything else (nested objects, arrays, numbers, a non-object root) is
//! malformed. An empty or whitespace-only document is a valid, empty map, which
//! keeps "resource present but empty" distinct from "resource absent".

use std::{borrow::Cow, fmt};

use encoding_rs::{Encoding, UTF_8};
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};

use crate::{error::Error, traits::Parser, types::TranslationMap};

/// Parses raw lang-file bytes into a [`TranslationMap`].
///
/// On duplicate keys the last value wins and the key keeps the position of its
/// first occurrence.
pub fn parse(bytes: &[u8]) -> Result<TranslationMap, Error> {
    let text = decode(bytes)?;
    if text.trim().is_empty() {
        return Ok(TranslationMap::new());
    }
    serde_json::from_str::<TranslationMap>(&text).map_err(|e| Error::malformed(e.to_string()))
}

/// Decodes bytes to text. A UTF-8 or UTF-16 byte order mark selects the
/// encoding (and is dropped); otherwise UTF-8 is assumed. Invalid sequences are
/// an error rather than being replaced.
pub fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, Error> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or_else(|| Error::malformed(format!("invalid {} byte sequence", encoding.name())))
}

impl Parser for TranslationMap {
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        parse(bytes)
    }
}

impl<'de> Deserialize<'de> for TranslationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FlatMapVisitor)
    }
}

struct FlatMapVisitor;

impl<'de> Visitor<'de> for FlatMapVisitor {
    type Value = TranslationMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a flat JSON object of string keys to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = TranslationMap::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            if map.insert(key.as_str(), value).is_some() {
                tracing::debug!(event = "duplicate_key", key = %key, "last occurrence wins");
            }
        }
        Ok(map)
    }
}
