use serde::de::{self, Deserialize, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

/// A string-keyed Lua table decoded from JSON
///
/// Lua's `json.encode` cannot tell an empty table from an empty array, so an
/// empty table shows up as `[]`. Both `{...}` and `[]` decode here; a
/// non-empty array is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct LuaTable<T>(pub BTreeMap<String, T>);

impl<T> Default for LuaTable<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T> Deref for LuaTable<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<BTreeMap<String, T>> for LuaTable<T> {
    fn from(entries: BTreeMap<String, T>) -> Self {
        Self(entries)
    }
}

impl<K: Into<String>, T> FromIterator<(K, T)> for LuaTable<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a, T> IntoIterator for &'a LuaTable<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = std::collections::btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

struct LuaTableVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for LuaTableVisitor<T> {
    type Value = LuaTable<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a Lua table encoded as a JSON object or an empty array")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, T>()? {
            entries.insert(key, value);
        }
        Ok(LuaTable(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(1, &self));
        }
        Ok(LuaTable::default())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for LuaTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LuaTableVisitor(PhantomData))
    }
}
