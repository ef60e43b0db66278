//! # Item Registry Module
//!
//! Owns the set of selected input items and their preview handles.
//!
//! ## Responsibilities:
//! - `add()` / `remove()` / `clear()` over selected items
//! - Assigns each item a fresh opaque id (truncated SHA-256)
//! - Owns every preview handle exclusively; nothing else acquires or
//!   releases them
//!
//! ## Preview handle discipline:
//! A `PreviewHandle` is acquired when an item enters the registry and
//! released exactly once: on `remove()`, on `clear()`, or - as a backstop
//! for abnormal teardown - when the handle is dropped. Releasing an
//! already-released handle is a logged no-op, never a crash. The registry
//! exposes `active_previews()` so the acquire/release pairing is
//! observable.
//!
//! ## Lifecycle notes:
//! - Items are never deduplicated by name; two files called `photo.png`
//!   are two items with two distinct ids
//! - The registry holds the raw bytes for each item until it is removed

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// A raw file as delivered by the selection source
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Scoped preview resource, released exactly once
#[derive(Debug)]
pub struct PreviewHandle {
    item_id: String,
    active: Arc<AtomicUsize>,
    released: bool,
}

impl PreviewHandle {
    fn acquire(item_id: &str, active: &Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        debug!("Acquired preview handle for item {}", item_id);
        Self {
            item_id: item_id.to_string(),
            active: Arc::clone(active),
            released: false,
        }
    }

    /// Release the preview resource; repeated calls are a no-op
    pub fn release(&mut self) {
        if self.released {
            debug!(
                "Preview handle for item {} already released, skipping",
                self.item_id
            );
            return;
        }
        self.released = true;
        self.active.fetch_sub(1, Ordering::SeqCst);
        debug!("Released preview handle for item {}", self.item_id);
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// One selected input file
#[derive(Debug)]
pub struct SelectedItem {
    pub id: String,
    pub source_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    preview: PreviewHandle,
}

impl SelectedItem {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Owns selected items and their preview handles
#[derive(Debug)]
pub struct ItemRegistry {
    items: Vec<SelectedItem>,
    active_previews: Arc<AtomicUsize>,
    next_seq: u64,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            active_previews: Arc::new(AtomicUsize::new(0)),
            next_seq: 0,
        }
    }

    /// Append one item per raw file, each with a fresh id and preview handle.
    /// Returns the assigned ids in input order.
    pub fn add(&mut self, raw_files: Vec<RawFile>) -> Vec<String> {
        let mut ids = Vec::with_capacity(raw_files.len());

        for raw in raw_files {
            let id = self.generate_id(&raw.name);
            let preview = PreviewHandle::acquire(&id, &self.active_previews);
            ids.push(id.clone());
            self.items.push(SelectedItem {
                id,
                source_name: raw.name,
                mime: raw.mime,
                bytes: raw.bytes,
                preview,
            });
        }

        ids
    }

    /// Remove an item and release its preview handle; no-op for unknown ids
    pub fn remove(&mut self, id: &str) {
        if let Some(pos) = self.items.iter().position(|item| item.id == id) {
            let mut item = self.items.remove(pos);
            item.preview.release();
        } else {
            debug!("Remove requested for unknown item id {}", id);
        }
    }

    /// Release every preview handle and empty the registry
    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.preview.release();
        }
        self.items.clear();
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of preview handles currently held (acquired minus released)
    pub fn active_previews(&self) -> usize {
        self.active_previews.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn preview_gauge(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.active_previews)
    }

    /// Opaque id: truncated SHA-256 over name, selection counter and clock
    fn generate_id(&mut self, name: &str) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;

        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(seq.to_le_bytes());
        hasher.update(nanos.to_le_bytes());
        hex::encode(hasher.finalize())[..16].to_string()
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    fn raw(name: &str) -> RawFile {
        RawFile::new(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn test_add_assigns_unique_ids_without_dedup() {
        let mut registry = ItemRegistry::new();
        let ids = registry.add(vec![raw("a.png"), raw("a.png"), raw("b.png")]);

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.active_previews(), 3);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }

    #[test]
    fn test_remove_releases_exactly_one_handle() {
        let mut registry = ItemRegistry::new();
        let ids = registry.add(vec![raw("a.png"), raw("b.png")]);

        registry.remove(&ids[0]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_previews(), 1);
        assert_eq!(registry.items()[0].source_name, "b.png");

        // Unknown id is a no-op
        registry.remove("no-such-id");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_previews(), 1);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut registry = ItemRegistry::new();
        registry.add(vec![raw("a.png"), raw("b.png"), raw("c.png")]);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.active_previews(), 0);
    }

    #[test]
    fn test_double_release_is_noop() {
        let gauge = Arc::new(AtomicUsize::new(0));
        let mut handle = PreviewHandle::acquire("item", &gauge);
        assert_eq!(gauge.load(Ordering::SeqCst), 1);

        handle.release();
        handle.release();
        assert_eq!(gauge.load(Ordering::SeqCst), 0);

        drop(handle);
        assert_eq!(gauge.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_releases_handles() {
        let gauge;
        {
            let mut registry = ItemRegistry::new();
            registry.add(vec![raw("a.png"), raw("b.png")]);
            gauge = registry.preview_gauge();
            assert_eq!(gauge.load(Ordering::SeqCst), 2);
        }
        assert_eq!(gauge.load(Ordering::SeqCst), 0);
    }
}
