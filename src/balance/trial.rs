//! A single exchange-and-evaluate trial.
//!
//! 1. Evaluate the objective (`baseline`).
//! 2. Take packs A and B out of the inventory (selection per strategy).
//! 3. Keep clones of A and B as restore points.
//! 4. Move a random cell B → A, then a random cell A → B. The cell
//!    leaving A may be the one that just arrived, making the trial a
//!    no-op; this is accepted as part of the random walk.
//! 5. Put A and B back and evaluate the objective again (`result`).
//! 6. Keep the exchange only if `result < baseline`; otherwise replace
//!    A and B with their clones.
//!
//! Whatever happens, the inventory leaves this function holding the same
//! cells it entered with.

use super::config::Strategy;
use super::observer::TrialOutcome;
use crate::error::{Error, Result};
use crate::model::{Inventory, Pack};
use rand::Rng;

/// Objective values around one trial.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrialReport {
    pub outcome: TrialOutcome,
    pub baseline: f64,
    pub objective: f64,
}

/// Runs one trial on `inventory`.
///
/// # Errors
///
/// [`Error::TrialFailure`] if two distinct packs cannot be selected or a
/// cell cannot be removed. The inventory is restored before returning.
pub(crate) fn run_trial<R: Rng>(
    inventory: &mut Inventory,
    strategy: Strategy,
    rng: &mut R,
) -> Result<TrialReport> {
    let n = inventory.len();
    if n < 2 {
        return Err(Error::TrialFailure(format!(
            "need two packs to exchange cells, inventory has {n}"
        )));
    }

    let baseline = strategy.objective(inventory);
    let (ia, ib) = select_pair(inventory, strategy, rng)?;
    let (mut a, mut b) = take_pair(inventory, ia, ib);

    let restore_a = a.clone();
    let restore_b = b.clone();

    if let Err(e) = exchange(&mut a, &mut b, rng) {
        inventory.insert(restore_a);
        inventory.insert(restore_b);
        return Err(e);
    }

    inventory.insert(a);
    inventory.insert(b);
    let result = strategy.objective(inventory);

    if result < baseline {
        return Ok(TrialReport {
            outcome: TrialOutcome::Accepted,
            baseline,
            objective: result,
        });
    }

    // A and B were the last two inserted.
    inventory.pop();
    inventory.pop();
    inventory.insert(restore_a);
    inventory.insert(restore_b);

    Ok(TrialReport {
        outcome: TrialOutcome::Rejected,
        baseline,
        objective: baseline,
    })
}

/// Picks indices of two distinct packs.
fn select_pair<R: Rng>(
    inventory: &Inventory,
    strategy: Strategy,
    rng: &mut R,
) -> Result<(usize, usize)> {
    let n = inventory.len();
    let ia = match strategy {
        Strategy::RandomPair => rng.random_range(0..n),
        Strategy::WorstFirst => inventory
            .worst_index()
            .ok_or_else(|| Error::TrialFailure("no worst pack in inventory".into()))?,
    };
    // Uniform over the other n - 1 packs.
    let ib = rng.random_range(0..n - 1);
    let ib = if ib >= ia { ib + 1 } else { ib };
    Ok((ia, ib))
}

/// Removes packs at `ia` and `ib` (distinct) and returns them in that order.
fn take_pair(inventory: &mut Inventory, ia: usize, ib: usize) -> (Pack, Pack) {
    if ia > ib {
        let a = inventory.take(ia);
        let b = inventory.take(ib);
        (a, b)
    } else {
        let b = inventory.take(ib);
        let a = inventory.take(ia);
        (a, b)
    }
}

/// One-for-one exchange: B gives A a cell, then A gives B a cell.
fn exchange<R: Rng>(a: &mut Pack, b: &mut Pack, rng: &mut R) -> Result<()> {
    let from_b = b.remove_random_cell(rng)?;
    a.add_cell(from_b);
    let from_a = a.remove_random_cell(rng)?;
    b.add_cell(from_a);
    Ok(())
}
