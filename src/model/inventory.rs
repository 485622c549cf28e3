//! The working set of packs under optimization.

use super::pack::Pack;

/// Aggregate spread statistics over an inventory.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryStats {
    pub pack_count: usize,
    pub cell_count: usize,
    pub average_spread: f64,
    pub min_spread: f64,
    pub max_spread: f64,
}

/// A mutable collection of packs.
///
/// Pack order carries no meaning during optimization; it only matters
/// for tie-breaking in [`worst_index`](Self::worst_index) and in the
/// stable [`sorted_by_spread`](Self::sorted_by_spread) ranking.
///
/// Aggregate queries on an empty inventory return `NaN`.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    packs: Vec<Pack>,
}

impl Inventory {
    pub fn new(packs: Vec<Pack>) -> Self {
        Self { packs }
    }

    pub fn packs(&self) -> &[Pack] {
        &self.packs
    }

    pub fn into_packs(self) -> Vec<Pack> {
        self.packs
    }

    /// Number of packs.
    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// Total number of cells across all packs.
    pub fn cell_count(&self) -> usize {
        self.packs.iter().map(Pack::len).sum()
    }

    /// Arithmetic mean of pack spreads.
    pub fn average_spread(&self) -> f64 {
        if self.packs.is_empty() {
            return f64::NAN;
        }
        let total: f64 = self.packs.iter().map(Pack::spread).sum();
        total / self.packs.len() as f64
    }

    /// Smallest pack spread.
    pub fn min_spread(&self) -> f64 {
        self.packs
            .iter()
            .map(Pack::spread)
            .reduce(f64::min)
            .unwrap_or(f64::NAN)
    }

    /// Largest pack spread.
    pub fn max_spread(&self) -> f64 {
        self.packs
            .iter()
            .map(Pack::spread)
            .reduce(f64::max)
            .unwrap_or(f64::NAN)
    }

    /// Index of the pack with the largest spread. Ties go to the first
    /// pack encountered.
    pub fn worst_index(&self) -> Option<usize> {
        let mut worst: Option<(usize, f64)> = None;
        for (i, pack) in self.packs.iter().enumerate() {
            let s = pack.spread();
            match worst {
                Some((_, w)) if s <= w => {}
                _ => worst = Some((i, s)),
            }
        }
        worst.map(|(i, _)| i)
    }

    /// The pack with the largest spread (first one on ties).
    pub fn worst_pack(&self) -> Option<&Pack> {
        self.worst_index().map(|i| &self.packs[i])
    }

    /// Copy of the current pack list.
    pub fn snapshot(&self) -> Vec<Pack> {
        self.packs.clone()
    }

    /// Snapshot sorted by ascending spread. The sort is stable, so packs
    /// with equal spread keep their current relative order.
    pub fn sorted_by_spread(&self) -> Vec<Pack> {
        rank_by_spread(&self.packs)
            .into_iter()
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Count, average, min and max spread in a single pass.
    pub fn stats(&self) -> InventoryStats {
        let mut cell_count = 0;
        let mut total = 0.0;
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;
        for pack in &self.packs {
            let s = pack.spread();
            cell_count += pack.len();
            total += s;
            low = low.min(s);
            high = high.max(s);
        }
        if self.packs.is_empty() {
            return InventoryStats {
                pack_count: 0,
                cell_count: 0,
                average_spread: f64::NAN,
                min_spread: f64::NAN,
                max_spread: f64::NAN,
            };
        }
        InventoryStats {
            pack_count: self.packs.len(),
            cell_count,
            average_spread: total / self.packs.len() as f64,
            min_spread: low,
            max_spread: high,
        }
    }

    /// Takes a pack out of the active set.
    pub(crate) fn take(&mut self, index: usize) -> Pack {
        self.packs.remove(index)
    }

    /// Puts a pack (back) into the active set.
    pub(crate) fn insert(&mut self, pack: Pack) {
        self.packs.push(pack);
    }

    /// Removes the most recently inserted pack.
    pub(crate) fn pop(&mut self) -> Option<Pack> {
        self.packs.pop()
    }
}

impl From<Vec<Pack>> for Inventory {
    fn from(packs: Vec<Pack>) -> Self {
        Self::new(packs)
    }
}

/// `packs` paired with their spreads, ascending by spread. The sort is
/// stable, so equal spreads keep their input order. Each spread is
/// computed once.
pub(crate) fn rank_by_spread(packs: &[Pack]) -> Vec<(f64, &Pack)> {
    let mut keyed: Vec<(f64, &Pack)> = packs.iter().map(|p| (p.spread(), p)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed
}
