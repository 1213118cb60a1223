//! Content-addressed result cache
//!
//! Keys are content fingerprints, so any two writers racing on the same key
//! produce equivalent values; last write wins and no entry expires.

use argus_core::{ArgusResult, ContentHash};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct ResultCache {
    entries: DashMap<ContentHash, Vec<u8>>,
    max_entries: usize,
}

impl ResultCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    pub fn get(&self, key: &ContentHash) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    pub fn put(&self, key: ContentHash, value: Vec<u8>) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(&key) {
            self.entries.insert(key, value);
        }
    }

    /// Fetch and deserialize a cached value. A present-but-undecodable entry
    /// reads as a miss so a newer writer can replace it.
    pub fn get_json<T: DeserializeOwned>(&self, key: &ContentHash) -> Option<T> {
        let bytes = self.get(key)?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn put_json<T: Serialize>(&self, key: ContentHash, value: &T) -> ArgusResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.put(key, bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
