use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-asset record of vendor name to vendor-assigned resource identifier.
///
/// Each vendor maps to at most one identifier; a missing entry means the
/// asset was never uploaded to that vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierMap(BTreeMap<String, String>);

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, vendor: &str) -> Option<&str> {
        self.0.get(vendor).map(String::as_str)
    }

    /// Set the vendor's identifier, returning the one it replaced.
    pub fn insert(&mut self, vendor: impl Into<String>, identifier: impl Into<String>) -> Option<String> {
        self.0.insert(vendor.into(), identifier.into())
    }

    pub fn remove(&mut self, vendor: &str) -> Option<String> {
        self.0.remove(vendor)
    }

    pub fn contains(&self, vendor: &str) -> bool {
        self.0.contains_key(vendor)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentifierMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_a_plain_object() {
        let map: IdentifierMap = [("Vimeo", "/videos/1"), ("YouTube", "abc")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Vimeo":"/videos/1","YouTube":"abc"}"#);

        let back: IdentifierMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn vendors_are_independent() {
        let mut map = IdentifierMap::new();
        map.insert("Vimeo", "1");
        map.insert("YouTube", "2");
        assert_eq!(map.insert("Vimeo", "3").as_deref(), Some("1"));
        map.remove("Vimeo");

        assert!(!map.contains("Vimeo"));
        assert_eq!(map.get("YouTube"), Some("2"));
        assert_eq!(map.len(), 1);
    }
}
