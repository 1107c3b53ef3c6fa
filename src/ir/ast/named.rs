//! Serde helpers for name-keyed maps.
//!
//! Declarations are stored in `IndexMap`s keyed by their own name. On the
//! wire they are plain lists; reading a list back rejects repeated names
//! instead of letting the last one win.

use indexmap::IndexMap;
use serde::de::{Error, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Something keyed by its own name.
pub trait Named {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

/// Build a name-keyed map, returning the first repeated name on collision.
pub fn collect_named<V: Named>(items: impl IntoIterator<Item = V>) -> Result<IndexMap<String, V>, String> {
    let mut map = IndexMap::new();
    for item in items {
        let name = item.name().to_string();
        if map.contains_key(&name) {
            return Err(name);
        }
        map.insert(name, item);
    }
    Ok(map)
}

pub fn serialize<S, V>(map: &IndexMap<String, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut seq = serializer.serialize_seq(Some(map.len()))?;
    for value in map.values() {
        seq.serialize_element(value)?;
    }
    seq.end()
}

pub fn deserialize<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Named,
{
    struct SeqVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de> + Named> Visitor<'de> for SeqVisitor<V> {
        type Value = IndexMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list of named declarations")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::new();
            while let Some(item) = seq.next_element::<V>()? {
                items.push(item);
            }
            collect_named(items).map_err(|name| A::Error::custom(format!("duplicate name '{name}'")))
        }
    }

    deserializer.deserialize_seq(SeqVisitor(PhantomData))
}
