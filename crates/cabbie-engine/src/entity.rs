//! Entity handles.
//!
//! An [`EntityId`] packs a slot index (low 32 bits) and a generation (high 32
//! bits). A slot's generation is bumped when its entity is removed, so a
//! handle kept past removal (say, the target of a trip that already expired)
//! never resolves to whatever reuses the slot later.

use std::collections::VecDeque;
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// A generational handle to a world entity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// Slot index.
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// Number of times the slot had been freed when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Issues and recycles [`EntityId`]s.
///
/// Freed slots are reused oldest first.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    live: Vec<bool>,
    free: VecDeque<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an id, reusing a freed slot if one is available.
    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free.pop_front() {
            self.live[index as usize] = true;
            return EntityId::new(index, self.generations[index as usize]);
        }
        let index = u32::try_from(self.generations.len()).unwrap_or_else(|_| {
            panic!("entity slots exhausted");
        });
        self.generations.push(0);
        self.live.push(true);
        EntityId::new(index, 0)
    }

    /// Free `id`'s slot. Returns `false` for stale or already freed ids.
    pub fn free(&mut self, id: EntityId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let slot = id.index() as usize;
        self.live[slot] = false;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push_back(id.index());
        true
    }

    /// Whether `id` is the current, live handle for its slot.
    pub fn is_live(&self, id: EntityId) -> bool {
        let slot = id.index() as usize;
        slot < self.generations.len()
            && self.live[slot]
            && self.generations[slot] == id.generation()
    }

    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|&&live| live).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
