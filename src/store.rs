use crate::codec::{decode_key, encode_key};
use crate::models::{Measurement, RecordKey};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// One user's records, held in [`RecordKey`] order.
///
/// Mutations never touch the existing mapping: `upsert` and `remove` build a
/// replacement, which is what gets persisted. Keys are unique; upserting an
/// existing key overwrites its measurement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordMapping {
    entries: Vec<(RecordKey, Measurement)>,
}

impl RecordMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, key: RecordKey, value: Measurement) -> Self {
        let mut entries = self.entries.clone();
        match entries.binary_search_by(|(existing, _)| existing.cmp(&key)) {
            Ok(index) => entries[index].1 = value,
            Err(index) => entries.insert(index, (key, value)),
        }
        Self { entries }
    }

    pub fn remove(&self, key: &RecordKey) -> Self {
        match self.entries.binary_search_by(|(existing, _)| existing.cmp(key)) {
            Ok(index) => {
                let mut entries = self.entries.clone();
                entries.remove(index);
                Self { entries }
            }
            Err(_) => self.clone(),
        }
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Measurement> {
        self.entries
            .binary_search_by(|(existing, _)| existing.cmp(key))
            .ok()
            .map(|index| &self.entries[index].1)
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &Measurement)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl FromIterator<(RecordKey, Measurement)> for RecordMapping {
    fn from_iter<I: IntoIterator<Item = (RecordKey, Measurement)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (key, value) in iter {
            mapping = mapping.upsert(key, value);
        }
        mapping
    }
}

// Persisted as a map of encoded key -> measurement, so the document format
// round-trips through the same codec the routing layer uses.
impl Serialize for RecordMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(&encode_key(key), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RecordMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Measurement>::deserialize(deserializer)?;
        let mut mapping = Self::new();
        for (encoded, value) in raw {
            let key = decode_key(&encoded).map_err(serde::de::Error::custom)?;
            mapping = mapping.upsert(key, value);
        }
        Ok(mapping)
    }
}
