//! In-memory ancestry index with descendant closure
//!
//! Readers and incremental writers run concurrently: a record merge swaps a
//! single map entry, so a reader never sees a partially merged chain, and
//! merging taxon X leaves reads of unrelated taxon Y's descendant set intact.

use argus_core::{AncestryRecord, ArgusResult, TaxonId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of taxon ids fetched per ancestry batch during bulk loads
pub const DEFAULT_LOAD_CHUNK_SIZE: usize = 500;

/// Bulk source of taxon ancestry data
#[async_trait]
pub trait AncestrySource: Send + Sync {
    /// Fetch ancestry records for the given taxa. Taxa unknown to the source
    /// (or with no recorded ancestry) are simply absent from the result.
    async fn ancestry_for(
        &self,
        taxon_ids: &[TaxonId],
    ) -> ArgusResult<HashMap<TaxonId, AncestryRecord>>;
}

/// Process-wide index from taxon to ancestor chain and descendant closure.
///
/// The descendant closure of a taxon includes the taxon itself. Taxa never
/// loaded answer `None`/`false` rather than erroring.
pub struct AncestryIndex {
    ancestries: DashMap<TaxonId, Arc<AncestryRecord>>,
    descendants: DashMap<TaxonId, HashSet<TaxonId>>,
    chunk_size: usize,
}

impl AncestryIndex {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_LOAD_CHUNK_SIZE)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            ancestries: DashMap::new(),
            descendants: DashMap::new(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Whether a taxon's ancestry has been loaded
    pub fn contains(&self, taxon_id: TaxonId) -> bool {
        self.ancestries.contains_key(&taxon_id)
    }

    /// Number of taxa with loaded ancestry
    pub fn len(&self) -> usize {
        self.ancestries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ancestries.is_empty()
    }

    /// Merge one ancestry record, replacing any previous record for the same
    /// taxon. Descendant edges from a superseded chain are removed before the
    /// new edges are added, so unrelated descendant sets stay intact.
    pub fn merge(&self, record: AncestryRecord) {
        let taxon_id = record.taxon_id;
        let record = Arc::new(record);

        let previous = self.ancestries.insert(taxon_id, Arc::clone(&record));
        if let Some(old) = previous {
            for ancestor in &old.ancestor_ids {
                if !record.ancestor_ids.contains(ancestor) {
                    if let Some(mut set) = self.descendants.get_mut(ancestor) {
                        set.remove(&taxon_id);
                    }
                }
            }
        }

        self.descendants
            .entry(taxon_id)
            .or_default()
            .insert(taxon_id);
        for ancestor in &record.ancestor_ids {
            self.descendants
                .entry(*ancestor)
                .or_default()
                .insert(taxon_id);
        }
    }

    /// Fetch and merge ancestry for the given taxa in bounded batches.
    /// Returns the number of records merged.
    pub async fn bulk_load(
        &self,
        source: &dyn AncestrySource,
        taxon_ids: &[TaxonId],
    ) -> ArgusResult<usize> {
        let mut merged = 0;
        for chunk in taxon_ids.chunks(self.chunk_size) {
            let records = source.ancestry_for(chunk).await?;
            merged += records.len();
            for record in records.into_values() {
                self.merge(record);
            }
        }
        debug!(merged, requested = taxon_ids.len(), "ancestry bulk load");
        Ok(merged)
    }

    /// Like `bulk_load`, restricted to taxa not already present. Used to
    /// lazily extend coverage when requests reference new taxa.
    pub async fn ensure_loaded(
        &self,
        source: &dyn AncestrySource,
        taxon_ids: &[TaxonId],
    ) -> ArgusResult<usize> {
        let missing: Vec<TaxonId> = taxon_ids
            .iter()
            .copied()
            .filter(|id| !self.contains(*id))
            .collect();
        if missing.is_empty() {
            return Ok(0);
        }
        self.bulk_load(source, &missing).await
    }

    /// The descendant closure of a taxon (self included), or `None` if the
    /// taxon was never loaded
    pub fn descendants_of(&self, taxon_id: TaxonId) -> Option<HashSet<TaxonId>> {
        self.descendants.get(&taxon_id).map(|set| set.clone())
    }

    /// Whether `taxon` sits under `ancestor` (a taxon is a descendant of
    /// itself). Unknown taxa answer `false`.
    pub fn is_descendant(&self, ancestor: TaxonId, taxon: TaxonId) -> bool {
        self.descendants
            .get(&ancestor)
            .map(|set| set.contains(&taxon))
            .unwrap_or(false)
    }

    /// Run the startup bulk load on a background task so request processing
    /// is never blocked on it. Failed batches are logged and skipped; taxa
    /// they covered are picked up later by `ensure_loaded`.
    pub fn spawn_initial_load(
        index: Arc<AncestryIndex>,
        source: Arc<dyn AncestrySource>,
        taxon_ids: Vec<TaxonId>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let chunk_size = index.chunk_size;
            let mut merged = 0;
            for chunk in taxon_ids.chunks(chunk_size) {
                match source.ancestry_for(chunk).await {
                    Ok(records) => {
                        merged += records.len();
                        for record in records.into_values() {
                            index.merge(record);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, chunk_len = chunk.len(), "ancestry batch failed, skipping");
                    }
                }
            }
            info!(merged, "initial ancestry load complete");
        })
    }
}

impl Default for AncestryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, ancestors: &[u32]) -> AncestryRecord {
        AncestryRecord::new(
            TaxonId(id),
            ancestors.iter().copied().map(TaxonId).collect(),
        )
    }

    #[test]
    fn test_merge_builds_descendant_closure() {
        let index = AncestryIndex::new();
        index.merge(record(10, &[1, 2]));
        index.merge(record(11, &[1, 2]));
        index.merge(record(20, &[1, 3]));

        let under_2 = index.descendants_of(TaxonId(2)).unwrap();
        assert!(under_2.contains(&TaxonId(10)));
        assert!(under_2.contains(&TaxonId(11)));
        assert!(!under_2.contains(&TaxonId(20)));

        let under_1 = index.descendants_of(TaxonId(1)).unwrap();
        assert_eq!(under_1.len(), 3);
    }

    #[test]
    fn test_descendants_include_self() {
        let index = AncestryIndex::new();
        index.merge(record(10, &[1]));
        assert!(index.is_descendant(TaxonId(10), TaxonId(10)));
        assert!(index.is_descendant(TaxonId(1), TaxonId(10)));
    }

    #[test]
    fn test_unknown_taxa_answer_false() {
        let index = AncestryIndex::new();
        assert!(index.descendants_of(TaxonId(99)).is_none());
        assert!(!index.is_descendant(TaxonId(99), TaxonId(1)));
        assert!(!index.is_descendant(TaxonId(1), TaxonId(99)));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let index = AncestryIndex::new();
        index.merge(record(10, &[1, 2]));
        index.merge(record(10, &[1, 2]));

        assert_eq!(index.len(), 1);
        let under_1 = index.descendants_of(TaxonId(1)).unwrap();
        assert_eq!(under_1.len(), 1);
    }

    #[test]
    fn test_reload_removes_stale_edges() {
        let index = AncestryIndex::new();
        index.merge(record(10, &[1, 2]));
        index.merge(record(11, &[1, 2]));

        // taxon 10 moves from parent 2 to parent 3
        index.merge(record(10, &[1, 3]));

        assert!(!index.is_descendant(TaxonId(2), TaxonId(10)));
        assert!(index.is_descendant(TaxonId(3), TaxonId(10)));
        // unrelated taxon 11 untouched
        assert!(index.is_descendant(TaxonId(2), TaxonId(11)));
    }

    #[test]
    fn test_concurrent_reads_and_merges() {
        use std::thread;

        let index = Arc::new(AncestryIndex::new());
        index.merge(record(10, &[1]));

        let mut handles = vec![];
        for i in 0..8u32 {
            let index = Arc::clone(&index);
            handles.push(thread::spawn(move || {
                let id = 100 + i;
                index.merge(record(id, &[1, 2]));
                assert!(index.is_descendant(TaxonId(1), TaxonId(10)));
                assert!(index.is_descendant(TaxonId(1), TaxonId(id)));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.len(), 9);
        assert_eq!(index.descendants_of(TaxonId(2)).unwrap().len(), 8);
    }
}
