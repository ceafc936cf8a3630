//! Store implementation
//!
//! Slot table with tombstoning and capacity doubling.

use crate::error::StoreError;
use super::{Entry, Slot};

/// Snapshot of table occupancy, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Live entries
    pub live: usize,

    /// Slots in use, tombstones included
    pub size: usize,

    /// Slots available before the next growth
    pub capacity: usize,
}

/// In-memory key/value table
///
/// Invariants:
/// - keys of occupied slots are unique
/// - `size() <= capacity()`
pub struct Store {
    /// Slot table; `slots.len()` is the size
    slots: Vec<Slot>,

    /// Logical capacity, doubled on growth
    capacity: usize,

    /// Number of occupied slots
    live: usize,
}

impl Store {
    /// Create an empty store with room for `initial_capacity` slots
    pub fn new(initial_capacity: usize) -> Result<Self, StoreError> {
        if initial_capacity == 0 {
            return Err(StoreError::InvalidArgument);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(initial_capacity)
            .map_err(|_| StoreError::OutOfMemory)?;

        Ok(Self {
            slots,
            capacity: initial_capacity,
            live: 0,
        })
    }

    /// Insert or overwrite a key
    ///
    /// An existing key keeps its slot. A new key takes the first tombstone
    /// seen during the scan, otherwise it is appended (growing first if full).
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        if key.is_empty() || value.is_empty() {
            return Err(StoreError::InvalidArgument);
        }

        let mut free_slot = None;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            match slot {
                Slot::Occupied(entry) if entry.key == key => {
                    // Old value is dropped here
                    entry.value = value.to_vec();
                    return Ok(());
                }
                Slot::Tombstone if free_slot.is_none() => free_slot = Some(index),
                _ => {}
            }
        }

        let entry = Entry {
            key: key.to_vec(),
            value: value.to_vec(),
        };

        match free_slot {
            Some(index) => self.slots[index] = Slot::Occupied(entry),
            None => {
                if self.slots.len() == self.capacity {
                    self.grow()?;
                }
                self.slots.push(Slot::Occupied(entry));
            }
        }

        self.live += 1;
        Ok(())
    }

    /// Look up a key
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.slots.iter().find_map(|slot| match slot {
            Slot::Occupied(entry) if entry.key == key => Some(entry.value.as_slice()),
            _ => None,
        })
    }

    /// Tombstone the slot holding `key`
    ///
    /// The table is not compacted, so other entries keep their positions.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| matches!(slot, Slot::Occupied(entry) if entry.key == key))
            .ok_or(StoreError::NotFound)?;

        *slot = Slot::Tombstone;
        self.live -= 1;
        Ok(())
    }

    /// Release every entry and the table itself
    pub fn close(self) -> StoreStats {
        let stats = self.stats();
        drop(self);
        stats
    }

    /// Double the capacity
    fn grow(&mut self) -> Result<(), StoreError> {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .ok_or(StoreError::OutOfMemory)?;

        self.slots
            .try_reserve_exact(new_capacity - self.slots.len())
            .map_err(|_| StoreError::OutOfMemory)?;

        tracing::debug!(
            "Store grown from {} to {} slots",
            self.capacity,
            new_capacity
        );
        self.capacity = new_capacity;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots in use, tombstones included
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            live: self.live,
            size: self.slots.len(),
            capacity: self.capacity,
        }
    }

    /// Iterate over the table slots in position order
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }
}
