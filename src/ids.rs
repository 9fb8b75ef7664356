//! Per-run identifier sequences.
//!
//! Every run owns its allocators, so two runs built from the same inputs hand
//! out the same ids.

/// Monotonic `u64` sequence starting at zero.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id and advances the sequence.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// Id sequences for topology entities, used while building the grid.
#[derive(Debug, Clone, Default)]
pub struct EntityIds {
    pub households: IdAllocator,
    pub apartments: IdAllocator,
    pub buildings: IdAllocator,
    pub meters: IdAllocator,
}

/// Id sequences for log records, owned by the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordIds {
    pub history: IdAllocator,
    pub events: IdAllocator,
}
