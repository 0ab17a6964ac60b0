//! The link collection and its persistence lifecycle.
//!
//! `LinkStore` owns the in-memory list and writes the entire collection back
//! to the key-value store after every mutation. Loading either restores the
//! stored list or migrates from the seed on first run.

use super::store::KeyValueStore;
use super::types::{decode_links, Link, LinkDraft, LinkPatch, StorageError};
use crate::seed::{SeedLoader, SeedOrigin};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Store key holding the whole collection as a JSON array.
pub const STORAGE_KEY: &str = "url_hub_links_v1";

/// Store key holding the theme preference.
pub const THEME_KEY: &str = "hub_theme";

/// What `LinkStore::load` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored collection was read back.
    Restored {
        count: usize,
        /// Links that received a generated id during this load.
        backfilled: usize,
    },
    /// Nothing was stored; the collection came from a seed and was persisted.
    Migrated { count: usize, origin: SeedOrigin },
    /// Nothing was stored and no seed source produced data.
    NoSeedData { reason: String },
    /// The stored value was not a valid collection; the list is now empty.
    Corrupt { error: String },
}

/// Counts of repairs made while sanitizing a raw list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Repairs {
    pub backfilled: usize,
    pub dropped: usize,
}

impl Repairs {
    fn changed(&self) -> bool {
        self.backfilled > 0 || self.dropped > 0
    }
}

/// Normalize every link, drop the ones without a URL, and give each survivor
/// a unique id. Ids that repeat an earlier entry are regenerated.
pub(crate) fn sanitize(raw: Vec<Link>) -> (Vec<Link>, Repairs) {
    let mut repairs = Repairs::default();
    let mut seen = HashSet::with_capacity(raw.len());
    let mut links = Vec::with_capacity(raw.len());

    for mut link in raw {
        if !link.normalize() {
            tracing::warn!(title = %link.title, "Dropping link without any URL");
            repairs.dropped += 1;
            continue;
        }
        if seen.contains(&link.id) {
            link.id.clear();
        }
        if link.ensure_id() {
            repairs.backfilled += 1;
        }
        seen.insert(link.id.clone());
        links.push(link);
    }

    (links, repairs)
}

/// The persisted bookmark collection.
pub struct LinkStore {
    store: Arc<dyn KeyValueStore>,
    links: Vec<Link>,
}

impl LinkStore {
    /// An empty collection bound to `store`. Call [`LinkStore::load`] next.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            links: Vec::new(),
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Backing store, shared with preferences.
    pub fn backend(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    /// Load the collection, migrating from the seed when nothing is stored.
    ///
    /// A stored value that is not a JSON array is logged and the collection
    /// starts empty; the bad value is left in place until the next successful
    /// save overwrites it. Inside a valid array, entries are decoded one by
    /// one and only those that are not link objects or carry no URL are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store itself cannot be read or written.
    pub async fn load(&mut self, seed: &SeedLoader) -> Result<LoadOutcome, StorageError> {
        match self.store.get(STORAGE_KEY)? {
            Some(text) => self.restore(&text),
            None => self.migrate(seed).await,
        }
    }

    fn restore(&mut self, text: &str) -> Result<LoadOutcome, StorageError> {
        let items = match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) => return Ok(self.corrupt("expected an array of links".to_string())),
            Err(e) => return Ok(self.corrupt(e.to_string())),
        };

        let (raw, skipped) = decode_links(items, "store");
        let (links, mut repairs) = sanitize(raw);
        repairs.dropped += skipped;
        self.links = links;

        if repairs.changed() {
            tracing::info!(
                backfilled = repairs.backfilled,
                dropped = repairs.dropped,
                "Repaired stored links"
            );
            self.save()?;
        }

        Ok(LoadOutcome::Restored {
            count: self.links.len(),
            backfilled: repairs.backfilled,
        })
    }

    fn corrupt(&mut self, error: String) -> LoadOutcome {
        tracing::error!(error = %error, "Stored links are malformed, starting empty");
        self.links.clear();
        LoadOutcome::Corrupt { error }
    }

    async fn migrate(&mut self, seed: &SeedLoader) -> Result<LoadOutcome, StorageError> {
        match seed.load().await {
            Ok(seeded) => {
                self.links = seeded.links;
                self.save()?;
                tracing::info!(
                    count = self.links.len(),
                    origin = ?seeded.origin,
                    "Migrated links from seed"
                );
                Ok(LoadOutcome::Migrated {
                    count: self.links.len(),
                    origin: seeded.origin,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "No seed data available");
                self.links.clear();
                Ok(LoadOutcome::NoSeedData {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Write the entire collection to the store.
    pub fn save(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.links)?;
        self.store.set(STORAGE_KEY, &json)
    }

    /// Create a link from `draft` and prepend it. Returns the new id.
    ///
    /// On a store error the link stays in memory; the next save persists it.
    pub fn add(&mut self, draft: LinkDraft) -> Result<String, StorageError> {
        let mut link = draft.into_link(super::types::new_link_id());
        if !link.normalize() {
            return Err(StorageError::MissingUrl(link.title));
        }
        let id = link.id.clone();
        self.links.insert(0, link);
        self.save()?;
        Ok(id)
    }

    /// Shallow-merge `patch` into the link with `id`.
    ///
    /// Returns `Ok(false)` without writing when no link has that id. A patch
    /// that would remove every URL is rejected and leaves the link unchanged.
    pub fn update(&mut self, id: &str, patch: LinkPatch) -> Result<bool, StorageError> {
        let Some(index) = self.links.iter().position(|l| l.id == id) else {
            return Ok(false);
        };

        let mut updated = self.links[index].clone();
        updated.apply(patch);
        if !updated.normalize() {
            return Err(StorageError::MissingUrl(updated.title));
        }
        self.links[index] = updated;
        self.save()?;
        Ok(true)
    }

    /// Remove the link with `id`. Unknown ids are a no-op without a write.
    pub fn delete(&mut self, id: &str) -> Result<Option<Link>, StorageError> {
        let Some(index) = self.links.iter().position(|l| l.id == id) else {
            return Ok(None);
        };
        let removed = self.links.remove(index);
        self.save()?;
        Ok(Some(removed))
    }

    /// Number of links per category, ordered by category name.
    pub fn stats(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for link in &self.links {
            *counts.entry(link.category.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Replace the whole collection (import). Returns the number kept.
    pub fn replace_all(&mut self, links: Vec<Link>) -> Result<usize, StorageError> {
        let (links, repairs) = sanitize(links);
        if repairs.changed() {
            tracing::debug!(
                backfilled = repairs.backfilled,
                dropped = repairs.dropped,
                "Repaired imported links"
            );
        }
        self.links = links;
        self.save()?;
        Ok(self.links.len())
    }

    /// Forget the stored collection and load again, forcing a migration.
    pub async fn reset(&mut self, seed: &SeedLoader) -> Result<LoadOutcome, StorageError> {
        self.store.remove(STORAGE_KEY)?;
        self.links.clear();
        self.load(seed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn draft(title: &str, url: &str, category: &str) -> LinkDraft {
        LinkDraft {
            title: title.to_string(),
            url: url.to_string(),
            urls: vec![],
            icon: None,
            category: category.to_string(),
        }
    }

    fn empty_seed() -> SeedLoader {
        SeedLoader::offline().with_embedded("[]")
    }

    fn store_with(json: &str) -> (Arc<MemoryStore>, LinkStore) {
        let backend = Arc::new(MemoryStore::with_value(STORAGE_KEY, json));
        let links = LinkStore::new(backend.clone());
        (backend, links)
    }

    #[tokio::test]
    async fn test_restore_backfills_ids_and_saves_once() {
        let (backend, mut links) = store_with(
            r#"[{"title":"A","url":"http://a"},{"id":"keep","title":"B","url":"http://b"}]"#,
        );
        let outcome = links.load(&empty_seed()).await.unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                count: 2,
                backfilled: 1
            }
        );
        assert_eq!(backend.write_count(), 1);
        assert!(!links.links()[0].id.is_empty());
        assert_eq!(links.links()[1].id, "keep");
    }

    #[tokio::test]
    async fn test_restore_without_repairs_does_not_write() {
        let (backend, mut links) =
            store_with(r#"[{"id":"x","title":"A","url":"http://a","urls":["http://a"]}]"#);
        links.load(&empty_seed()).await.unwrap();
        assert_eq!(backend.write_count(), 0);
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_malformed_json_starts_empty() {
        let (backend, mut links) = store_with("{not json");
        let outcome = links.load(&empty_seed()).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Corrupt { .. }));
        assert!(links.is_empty());
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_keeps_numeric_ids() {
        let (backend, mut links) = store_with(
            r#"[{"id":"a","title":"Keep","url":"http://a"},{"id":1700000000000,"title":"Num","url":"http://b"}]"#,
        );
        let outcome = links.load(&empty_seed()).await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                count: 2,
                backfilled: 0
            }
        );
        assert_eq!(links.links()[1].id, "1700000000000");
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_drops_only_unusable_entries() {
        let (backend, mut links) = store_with(
            r#"[{"id":"a","title":"Keep","url":"http://a"}, 42, {"id":"b","title":"No URL"}]"#,
        );
        let outcome = links.load(&empty_seed()).await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                count: 1,
                backfilled: 0
            }
        );
        assert_eq!(links.links()[0].title, "Keep");
        assert_eq!(backend.write_count(), 1);
    }

    #[tokio::test]
    async fn test_restore_non_array_is_corrupt() {
        let (backend, mut links) = store_with(r#"{"title":"A","url":"http://a"}"#);
        let outcome = links.load(&empty_seed()).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Corrupt { .. }));
        assert!(links.is_empty());
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_regenerates_duplicate_ids() {
        let (_backend, mut links) = store_with(
            r#"[{"id":"dup","url":"http://a"},{"id":"dup","url":"http://b"}]"#,
        );
        links.load(&empty_seed()).await.unwrap();
        assert_eq!(links.links()[0].id, "dup");
        assert_ne!(links.links()[1].id, "dup");
    }

    #[tokio::test]
    async fn test_migrate_from_embedded_seed() {
        let backend = Arc::new(MemoryStore::new());
        let mut links = LinkStore::new(backend.clone());
        let seed = SeedLoader::offline()
            .with_embedded(r#"[{"title":"Docs","url":"https://docs.rs"}]"#);

        let outcome = links.load(&seed).await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Migrated {
                count: 1,
                origin: SeedOrigin::Embedded
            }
        );
        assert_eq!(backend.write_count(), 1);
        assert_eq!(links.links()[0].category, "Others");
        assert_eq!(links.links()[0].urls, vec!["https://docs.rs".to_string()]);
    }

    #[tokio::test]
    async fn test_migrate_without_data_reports_and_does_not_persist() {
        let backend = Arc::new(MemoryStore::new());
        let mut links = LinkStore::new(backend.clone());
        let outcome = links.load(&empty_seed()).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::NoSeedData { .. }));
        assert_eq!(backend.write_count(), 0);
        assert_eq!(backend.get(STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_prepends_and_persists() {
        let (backend, mut links) = store_with("[]");
        links.load(&empty_seed()).await.unwrap();

        links.add(draft("First", "http://1", "Tools")).unwrap();
        let id = links.add(draft("Second", "http://2", "AI")).unwrap();

        assert_eq!(links.links()[0].id, id);
        assert_eq!(links.links()[0].title, "Second");
        assert_eq!(backend.write_count(), 2);

        let stored: Vec<Link> =
            serde_json::from_str(&backend.get(STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, links.links().to_vec());
    }

    #[tokio::test]
    async fn test_add_without_url_is_rejected() {
        let (backend, mut links) = store_with("[]");
        links.load(&empty_seed()).await.unwrap();
        let err = links.add(draft("Nothing", "", "Tools")).unwrap_err();
        assert!(matches!(err, StorageError::MissingUrl(_)));
        assert!(links.is_empty());
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let (backend, mut links) = store_with("[]");
        links.load(&empty_seed()).await.unwrap();
        let changed = links
            .update(
                "missing",
                LinkPatch {
                    title: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!changed);
        assert_eq!(backend.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_and_normalizes() {
        let (_backend, mut links) = store_with("[]");
        links.load(&empty_seed()).await.unwrap();
        let id = links.add(draft("Old", "http://old", "Tools")).unwrap();

        links
            .update(
                &id,
                LinkPatch {
                    url: Some("http://new".to_string()),
                    urls: Some(vec!["http://mirror".to_string()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let link = links.get(&id).unwrap();
        assert_eq!(link.title, "Old");
        assert_eq!(link.url, "http://new");
        assert_eq!(link.urls, vec!["http://new", "http://mirror"]);
    }

    #[tokio::test]
    async fn test_update_rejects_removing_all_urls() {
        let (_backend, mut links) = store_with("[]");
        links.load(&empty_seed()).await.unwrap();
        let id = links.add(draft("Keep", "http://keep", "Tools")).unwrap();

        let result = links.update(
            &id,
            LinkPatch {
                url: Some(String::new()),
                urls: Some(vec![]),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(links.get(&id).unwrap().url, "http://keep");
    }

    #[tokio::test]
    async fn test_delete_and_stats() {
        let (_backend, mut links) = store_with("[]");
        links.load(&empty_seed()).await.unwrap();
        let a = links.add(draft("A", "http://a", "Tools")).unwrap();
        links.add(draft("B", "http://b", "Tools")).unwrap();
        links.add(draft("C", "http://c", "AI")).unwrap();

        let stats = links.stats();
        assert_eq!(stats.get("Tools"), Some(&2));
        assert_eq!(stats.get("AI"), Some(&1));
        assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["AI", "Tools"]);

        let removed = links.delete(&a).unwrap().unwrap();
        assert_eq!(removed.title, "A");
        assert_eq!(links.stats().get("Tools"), Some(&1));
        assert!(links.delete(&a).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_all_and_reset() {
        let backend = Arc::new(MemoryStore::new());
        let mut links = LinkStore::new(backend.clone());
        let seed = SeedLoader::offline().with_embedded(
            r#"[{"title":"S1","url":"http://s1"},{"title":"S2","url":"http://s2"}]"#,
        );
        links.load(&seed).await.unwrap();
        assert_eq!(links.len(), 2);

        let imported: Vec<Link> =
            serde_json::from_str(r#"[{"title":"I","urls":["http://i"]},{"title":"none"}]"#)
                .unwrap();
        assert_eq!(links.replace_all(imported).unwrap(), 1);
        assert_eq!(links.links()[0].url, "http://i");

        let outcome = links.reset(&seed).await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Migrated { count: 2, .. }));
        assert_eq!(links.links()[0].title, "S1");
    }
}
