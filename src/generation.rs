//! Stale-result suppression for overlapping generation requests.
//!
//! Callers that regenerate on every settings change can have several
//! generations in flight. Each request takes a [`GenerationId`] when it
//! starts; when it finishes, [`GenerationTracker::commit`] only hands the
//! result back if no newer request has started since. Superseded results are
//! dropped, never merged.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationId(u64);

impl GenerationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Hands out increasing [`GenerationId`]s and tracks the latest one.
#[derive(Debug, Default)]
pub struct GenerationTracker {
    latest: AtomicU64,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier one.
    pub fn begin(&self) -> GenerationId {
        GenerationId(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// The most recently started request, if any.
    pub fn latest(&self) -> Option<GenerationId> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            id => Some(GenerationId(id)),
        }
    }

    pub fn is_current(&self, id: GenerationId) -> bool {
        self.latest.load(Ordering::Acquire) == id.0
    }

    /// Returns `value` if `id` is still the latest request, or drops it.
    pub fn commit<T>(&self, id: GenerationId, value: T) -> Option<T> {
        if self.is_current(id) {
            Some(value)
        } else {
            log::debug!("dropping result of superseded generation {}", id.0);
            None
        }
    }
}
