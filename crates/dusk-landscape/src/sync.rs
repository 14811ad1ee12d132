use std::collections::VecDeque;

use dusk_core::RecordId;

/// Records whose renderable geometry must be rebuilt on the next sync pass.
///
/// Pushing the id that is already at the tail is a no-op. Earlier entries are
/// not searched, so an id may appear more than once when interleaved with
/// other ids.
#[derive(Debug, Default)]
pub struct RenderSyncQueue {
    pending: VecDeque<RecordId>,
}

impl RenderSyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `id`. Returns false if it was already the tail entry.
    pub fn push(&mut self, id: RecordId) -> bool {
        if self.pending.back() == Some(&id) {
            return false;
        }
        self.pending.push_back(id);
        true
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and yield every pending entry, front to back.
    pub fn drain(&mut self) -> impl Iterator<Item = RecordId> + '_ {
        self.pending.drain(..)
    }
}
