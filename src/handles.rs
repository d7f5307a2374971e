//! Typed handles and tombstoned arena storage for mesh elements.
//!
//! The half-edge graph is cyclic, so raw references are off the table.
//! Every vertex, half-edge and face instead lives in an [`Arena`] slot and
//! is addressed by a stable `u32` handle. Removal leaves a tombstone and
//! recycles the index through a free list, so a stale handle can be
//! *detected* (via [`Arena::get`]) instead of dereferencing freed memory.

use std::fmt;

macro_rules! handle_type {
    ($(#[$doc:meta])* $name:ident, $tag:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            /// Raw slot index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "{}"), self.0)
            }
        }
    };
}

handle_type!(
    /// Stable handle of a vertex in the mesh arena.
    VertexHandle,
    "V"
);
handle_type!(
    /// Stable handle of a half-edge in the mesh arena.
    EdgeHandle,
    "E"
);
handle_type!(
    /// Stable handle of a face in the mesh arena.
    FaceHandle,
    "F"
);

/// Slot vector with tombstone recycling.
///
/// `insert` prefers indices from the free list; `remove` tombstones the slot
/// and pushes its index back. Live-element count is tracked separately so
/// `len` stays O(1).
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Store `value`, reusing a tombstoned slot when one is available.
    pub fn insert(&mut self, value: T) -> u32 {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(value);
            idx
        } else {
            self.slots.push(Some(value));
            (self.slots.len() - 1) as u32
        }
    }

    /// Tombstone a slot, returning its value. `None` if already freed.
    pub fn remove(&mut self, idx: u32) -> Option<T> {
        let slot = self.slots.get_mut(idx as usize)?;
        let value = slot.take()?;
        self.free.push(idx);
        self.live -= 1;
        Some(value)
    }

    #[inline]
    pub fn get(&self, idx: u32) -> Option<&T> {
        self.slots.get(idx as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.slots.get_mut(idx as usize).and_then(Option::as_mut)
    }

    #[inline]
    pub fn contains(&self, idx: u32) -> bool {
        self.get(idx).is_some()
    }

    /// Iterate live slots as `(index, &value)`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }

    /// Iterate live slots mutably as `(index, &mut value)`.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i as u32, v)))
    }

    /// Snapshot of all live indices. Useful when the arena will be mutated
    /// while walking.
    pub fn indices(&self) -> Vec<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i as u32))
            .collect()
    }
}
