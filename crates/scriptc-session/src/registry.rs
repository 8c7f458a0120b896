//! Per-source storage of compilation results.
//!
//! [`SourceRegistry`] holds at most one [`CompilationResult`] per
//! [`SourceId`]. It is backed by a `DashMap`, so readers and writers of
//! unrelated sources only contend on a shard, never on a global lock.
//!
//! Writes are crate-private: [`CompilationSession::compile`] is the only
//! path that inserts or replaces an entry, and `set_active` the only path
//! that mutates one in place. Entries leave the registry only through
//! [`SourceRegistry::discard`].
//!
//! [`CompilationSession::compile`]: crate::CompilationSession::compile

use dashmap::DashMap;

use scriptc_core::{CompilationResult, SourceId, Status};

#[derive(Debug)]
pub struct SourceRegistry<A> {
    entries: DashMap<SourceId, CompilationResult<A>>,
}

impl<A> SourceRegistry<A> {
    pub fn new() -> Self {
        SourceRegistry {
            entries: DashMap::new(),
        }
    }

    /// Whether any result (of any status) is stored for `source_id`.
    pub fn contains(&self, source_id: &SourceId) -> bool {
        self.entries.contains_key(source_id)
    }

    /// A snapshot of the stored result.
    pub fn get(&self, source_id: &SourceId) -> Option<CompilationResult<A>> {
        self.entries.get(source_id).map(|entry| entry.value().clone())
    }

    /// Reads the stored result without cloning it.
    pub fn with_entry<R>(
        &self,
        source_id: &SourceId,
        f: impl FnOnce(&CompilationResult<A>) -> R,
    ) -> Option<R> {
        self.entries.get(source_id).map(|entry| f(entry.value()))
    }

    /// Status of the stored result, [`Status::Uncompiled`] when there is none.
    pub fn status(&self, source_id: &SourceId) -> Status {
        self.with_entry(source_id, |r| r.status())
            .unwrap_or(Status::Uncompiled)
    }

    pub(crate) fn with_entry_mut<R>(
        &self,
        source_id: &SourceId,
        f: impl FnOnce(&mut CompilationResult<A>) -> R,
    ) -> Option<R> {
        self.entries
            .get_mut(source_id)
            .map(|mut entry| f(entry.value_mut()))
    }

    /// Replaces the entry for `source_id` wholesale, returning the old one.
    pub(crate) fn replace(
        &self,
        source_id: SourceId,
        result: CompilationResult<A>,
    ) -> Option<CompilationResult<A>> {
        self.entries.insert(source_id, result)
    }

    /// Removes the entry for `source_id`, e.g. when its buffer is closed.
    pub fn discard(&self, source_id: &SourceId) -> bool {
        self.entries.remove(source_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All source ids with a stored result, sorted.
    pub fn ids(&self) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}

impl<A> Default for SourceRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}
