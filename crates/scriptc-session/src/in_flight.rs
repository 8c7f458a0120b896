//! One-compile-per-source guard.
//!
//! [`InFlight`] records which sources are currently being compiled. Acquiring
//! a source that is already marked fails immediately instead of waiting; the
//! returned [`InFlightGuard`] clears the mark when dropped, including during
//! unwinding. Sources are tracked independently, so compiles of different
//! sources never contend here.

use dashmap::DashSet;

use scriptc_core::SourceId;

#[derive(Debug, Default)]
pub struct InFlight {
    sources: DashSet<SourceId>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `source_id` as in flight, or returns `None` if it already is.
    pub fn try_acquire(&self, source_id: &SourceId) -> Option<InFlightGuard<'_>> {
        if self.sources.insert(source_id.clone()) {
            Some(InFlightGuard {
                owner: self,
                source_id: source_id.clone(),
            })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self, source_id: &SourceId) -> bool {
        self.sources.contains(source_id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Clears the in-flight mark for one source on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    source_id: SourceId,
}

impl InFlightGuard<'_> {
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.sources.remove(&self.source_id);
    }
}
