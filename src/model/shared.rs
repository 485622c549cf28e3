//! Lock-guarded inventory handle shared between the engine and callers.

use super::inventory::{Inventory, InventoryStats};
use super::pack::Pack;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A clonable handle to an [`Inventory`] behind a single mutex.
///
/// Every read and every trial holds the lock for its whole duration, so
/// no caller ever observes a pack list in the middle of an exchange.
#[derive(Debug, Clone, Default)]
pub struct SharedInventory {
    inner: Arc<Mutex<Inventory>>,
}

impl SharedInventory {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inventory)),
        }
    }

    /// Acquires the lock. A poisoned lock is recovered: trials restore
    /// their packs before returning, so the inventory is always whole.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Inventory> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the inventory while holding the lock.
    pub fn with<T>(&self, f: impl FnOnce(&Inventory) -> T) -> T {
        f(&self.lock())
    }

    /// Copy of the current pack list.
    pub fn snapshot(&self) -> Vec<Pack> {
        self.lock().snapshot()
    }

    /// Snapshot ranked by ascending spread.
    pub fn sorted_by_spread(&self) -> Vec<Pack> {
        self.lock().sorted_by_spread()
    }

    pub fn stats(&self) -> InventoryStats {
        self.lock().stats()
    }

    /// Swaps in a new inventory and returns the previous one.
    pub fn replace(&self, inventory: Inventory) -> Inventory {
        std::mem::replace(&mut *self.lock(), inventory)
    }

    /// Takes the inventory out, leaving an empty one behind.
    pub fn take(&self) -> Inventory {
        std::mem::take(&mut *self.lock())
    }
}

impl From<Inventory> for SharedInventory {
    fn from(inventory: Inventory) -> Self {
        Self::new(inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use std::thread;

    fn inventory() -> Inventory {
        Inventory::new(vec![
            Pack::with_cells("0", vec![Cell::new("a", 1.0), Cell::new("b", 1.2)]),
            Pack::with_cells("1", vec![Cell::new("c", 1.0), Cell::new("d", 1.05)]),
        ])
    }

    #[test]
    fn test_clones_share_state() {
        let shared = SharedInventory::new(inventory());
        let other = shared.clone();
        let old = other.replace(Inventory::default());
        assert_eq!(old.len(), 2);
        assert!(shared.snapshot().is_empty());
    }

    #[test]
    fn test_sorted_snapshot_from_other_thread() {
        let shared = SharedInventory::new(inventory());
        let handle = {
            let shared = shared.clone();
            thread::spawn(move || shared.sorted_by_spread())
        };
        let ranked = handle.join().unwrap();
        assert_eq!(ranked[0].id(), "1");
        assert_eq!(shared.stats().pack_count, 2);
    }

    #[test]
    fn test_take_leaves_empty() {
        let shared = SharedInventory::new(inventory());
        let inv = shared.take();
        assert_eq!(inv.cell_count(), 4);
        assert_eq!(shared.with(|i| i.len()), 0);
    }
}
