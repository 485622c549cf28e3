//! Background engine behaviour under concurrent access.

use std::thread;
use std::time::Duration;

use u_cellpack::balance::{
    BalanceConfig, BalanceEvent, Balancer, ChannelObserver, EngineState, Strategy,
};
use u_cellpack::model::{Cell, Inventory, Pack, SharedInventory};
use u_cellpack::Error;

fn inventory(packs: usize, per_pack: usize) -> Inventory {
    Inventory::new(
        (0..packs)
            .map(|p| {
                Pack::with_cells(
                    format!("P{p}"),
                    (0..per_pack)
                        .map(|i| {
                            let k = p * per_pack + i;
                            Cell::new(format!("C{k}"), 0.002 + (k * 13 % 31) as f64 * 1e-5)
                        })
                        .collect(),
                )
            })
            .collect(),
    )
}

fn uniform(packs: usize, per_pack: usize) -> Inventory {
    Inventory::new(
        (0..packs)
            .map(|p| {
                Pack::with_cells(
                    format!("P{p}"),
                    (0..per_pack)
                        .map(|i| Cell::new(format!("C{p}-{i}"), 0.0025))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn sorted_addresses(packs: &[Pack]) -> Vec<String> {
    let mut all: Vec<String> = packs
        .iter()
        .flat_map(|p| p.cells().iter().map(|c| c.address().to_string()))
        .collect();
    all.sort();
    all
}

fn endless() -> BalanceConfig {
    BalanceConfig::default()
        .with_convergence_threshold(usize::MAX)
        .with_seed(17)
}

#[test]
fn test_snapshots_never_observe_a_partial_exchange() {
    let inv = inventory(10, 6);
    let expected = sorted_addresses(inv.packs());

    let mut balancer = Balancer::new(inv, endless()).unwrap();
    balancer.start().unwrap();

    for _ in 0..200 {
        let snapshot = balancer.snapshot();
        assert_eq!(snapshot.len(), 10);
        assert!(snapshot.iter().all(|p| p.len() == 6));
        assert_eq!(sorted_addresses(&snapshot), expected);

        let ranked = balancer.sorted_by_spread();
        for w in ranked.windows(2) {
            assert!(w[0].spread() <= w[1].spread());
        }
    }

    assert!(balancer.stop());
    let result = balancer.wait().unwrap();
    assert!(result.cancelled);
    assert!(!result.converged);
    assert_eq!(sorted_addresses(&balancer.snapshot()), expected);
}

#[test]
fn test_stop_from_another_thread() {
    let mut balancer = Balancer::new(inventory(6, 4), endless()).unwrap();
    balancer.start().unwrap();

    let handle = balancer.stop_handle();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        let first = handle.stop();
        let second = handle.stop();
        (first, second)
    });

    let (first, second) = stopper.join().unwrap();
    assert!(first);
    assert!(!second);

    let result = balancer.wait().unwrap();
    assert!(result.cancelled);
    assert!(result.trials > 0);
    assert_eq!(balancer.state(), EngineState::Idle);
}

#[test]
fn test_convergence_is_reported_exactly_once() {
    let config = BalanceConfig::default()
        .with_convergence_threshold(500)
        .with_seed(4);
    let mut balancer = Balancer::new(uniform(4, 3), config).unwrap();

    let (observer, events) = ChannelObserver::bounded(1_000_000);
    balancer.start_with(observer).unwrap();
    let result = balancer.wait().unwrap();

    assert!(result.converged);
    assert_eq!(result.trials, 501);
    assert_eq!(balancer.state(), EngineState::Converged);

    let mut converged = 0;
    let mut progress = 0;
    while let Some(event) = events.try_recv() {
        match event {
            BalanceEvent::Converged(r) => {
                converged += 1;
                assert_eq!(r.trials, 501);
            }
            BalanceEvent::Progress(_) => progress += 1,
        }
    }
    assert_eq!(converged, 1);
    assert_eq!(progress, 501);
}

#[test]
fn test_restart_after_convergence() {
    let config = BalanceConfig::default()
        .with_convergence_threshold(100)
        .with_seed(8);
    let mut balancer = Balancer::new(inventory(5, 4), config).unwrap();

    balancer.start().unwrap();
    assert!(balancer.wait().unwrap().converged);
    assert_eq!(balancer.state(), EngineState::Converged);
    assert!(!balancer.stop(), "stop after convergence is a no-op");

    balancer.start().unwrap();
    let second = balancer.wait().unwrap();
    assert!(second.converged);
    assert_eq!(balancer.stats().cell_count, 20);
}

#[test]
fn test_worst_first_lowers_the_worst_pack() {
    let inv = inventory(8, 6);
    let before = inv.max_spread();
    let config = BalanceConfig::default()
        .with_strategy(Strategy::WorstFirst)
        .with_convergence_threshold(2_000)
        .with_seed(21);

    let mut balancer = Balancer::new(inv, config).unwrap();
    balancer.start().unwrap();
    let result = balancer.wait().unwrap();

    assert!(result.converged);
    let after = balancer.stats().max_spread;
    assert!(after < before, "worst spread {before} -> {after}");
    assert!((result.final_objective - after).abs() < 1e-12);
}

#[test]
fn test_shared_inventory_outlives_engine() {
    let shared = SharedInventory::new(inventory(4, 4));
    let config = BalanceConfig::default()
        .with_convergence_threshold(200)
        .with_seed(2);
    {
        let mut balancer = Balancer::new(shared.clone(), config).unwrap();
        balancer.start().unwrap();
        balancer.wait();
    }
    let inv = shared.take();
    assert_eq!(inv.len(), 4);
    assert_eq!(inv.cell_count(), 16);
}

#[test]
fn test_start_on_single_pack_fails_synchronously() {
    let mut balancer = Balancer::new(inventory(1, 6), BalanceConfig::default()).unwrap();
    let err = balancer.start().unwrap_err();
    assert!(matches!(err, Error::InsufficientPacks { found: 1 }));
    assert!(!balancer.is_running());
}
