//! Object handles and their allocator.
//!
//! An [`ObjectId`] packs a *generation* counter in the high 32 bits and a slot
//! *index* in the low 32 bits. Destroying an object bumps its slot's
//! generation, so a handle kept across a destroy is detected as stale instead
//! of silently resolving to whatever object reused the slot.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ObjectId
// ---------------------------------------------------------------------------

/// A generational handle to a registered game object.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// Slot index (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// Generation (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// IdAllocator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Hands out [`ObjectId`]s and recycles the slots of destroyed objects.
///
/// Free slots are reused first-in first-out so generations spread across
/// slots instead of piling up on one hot index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    slots: Vec<Slot>,
    free: VecDeque<u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh id, reusing a freed slot when one is available.
    pub fn allocate(&mut self) -> ObjectId {
        if let Some(index) = self.free.pop_front() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            return ObjectId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            alive: true,
        });
        ObjectId::new(index, 0)
    }

    /// Release `id`. Returns `false` if it was already released or stale.
    pub fn release(&mut self, id: ObjectId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index() as usize) else {
            return false;
        };
        if !slot.alive || slot.generation != id.generation() {
            return false;
        }
        slot.alive = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push_back(id.index());
        true
    }

    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.slots
            .get(id.index() as usize)
            .is_some_and(|slot| slot.alive && slot.generation == id.generation())
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alive).count()
    }

    /// Number of slots ever handed out, alive or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
