// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use buzz::prelude::*;
use buzz::TryRecvError;
use buzz_test_utils::spawn_reader;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[tokio::test]
async fn example_subscriber_receives_each_broadcast() {
    let tower = AsyncTower::new();
    let mut mailbox = tower.subscribe("me").unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));

    let subscriber = {
        let received = Arc::clone(&received);
        tokio::spawn(async move {
            while let Some(value) = mailbox.next().await {
                received.lock().unwrap().push(value);
            }
        })
    };

    tower.broadcast(4).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    tower.broadcast(5).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    tower.clear();
    tokio::time::sleep(Duration::from_millis(20)).await;

    tower.close().unwrap();
    subscriber.await.unwrap();
    assert_eq!(*received.lock().unwrap(), vec![4, 5]);
}

#[test]
fn example_towers_replace_a_condition_variable() {
    // Consumer takes odd values and answers with the next even one.
    let even_tower = AsyncTower::new();
    let odd_tower = AsyncTower::new();
    let even_rx = even_tower.subscribe("even-consumer").unwrap();
    let odd_rx = odd_tower.subscribe("odd-consumer").unwrap();

    let consumer = {
        let even_tower = even_tower.clone();
        thread::spawn(move || {
            while let Ok(value) = odd_rx.recv() {
                even_tower.broadcast(value + 1).unwrap();
            }
        })
    };

    let mut value = 1u64;
    for _ in 0..1_000 {
        odd_tower.broadcast(value).unwrap();
        value = even_rx.recv().unwrap() + 1;
    }

    odd_tower.close().unwrap();
    consumer.join().unwrap();
    assert_eq!(value, 2_001);
}

#[test]
fn example_latest_state_survives_slow_readers() {
    let tower = AsyncTower::new();
    let dashboard = tower.subscribe("dashboard").unwrap();

    for temperature in [18, 19, 21, 22] {
        tower.broadcast(temperature).unwrap();
    }

    assert_eq!(dashboard.try_recv(), Ok(22));
    assert_eq!(dashboard.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn example_sync_tower_keeps_workers_in_lockstep() {
    let tower = SyncTower::new();
    let workers: Vec<_> = (0..3)
        .map(|i| spawn_reader(tower.subscribe(&format!("worker-{i}")).unwrap(), 5, None))
        .collect();

    for step in 0..5 {
        assert_eq!(tower.broadcast(step).unwrap(), 3);
    }

    for worker in workers {
        let steps: Vec<_> = worker.join().unwrap().into_iter().map(|r| r.value).collect();
        assert_eq!(steps, vec![0, 1, 2, 3, 4]);
    }
}

#[test]
fn example_signal_wakes_a_single_worker() {
    let tower = AsyncTower::with_seed(1);
    let workers: Vec<_> = (0..4)
        .map(|i| tower.subscribe(&format!("worker-{i}")).unwrap())
        .collect();

    let chosen = tower.signal("job").unwrap();

    for worker in &workers {
        if worker.identity() == chosen {
            assert_eq!(worker.try_recv(), Ok("job"));
        } else {
            assert_eq!(worker.try_recv(), Err(TryRecvError::Empty));
        }
    }
}

#[test]
fn example_errors_are_ordinary_results() {
    let tower = AsyncTower::<()>::new();

    assert_eq!(tower.signal(()), Err(TowerError::NoSubscribers));
    assert!(tower.unsubscribe("nobody").unwrap_err().is_registry_error());

    tower.close().unwrap();
    assert!(tower.close().unwrap_err().is_closed());
}
