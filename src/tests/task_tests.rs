use crate::task::{TaskPool, default_pool_size};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

#[test]
fn test_default_pool_size_bounds() {
    let size = default_pool_size();

    assert!(size >= 2);
    assert!(size <= 4);
}

#[tokio::test]
async fn test_spawn_and_join() {
    let pool = TaskPool::with_capacity(2);

    let handle = pool.spawn(async { 21 * 2 });

    assert_eq!(handle.join().await, Some(42));
}

#[tokio::test]
async fn test_cancel_drops_result() {
    let pool = TaskPool::with_capacity(2);

    let handle = pool.spawn(async {
        sleep(Duration::from_secs(60)).await;
        42
    });
    handle.cancel();

    assert_eq!(handle.join().await, None);
}

#[tokio::test]
async fn test_cancel_after_completion_is_noop() {
    let pool = TaskPool::with_capacity(2);

    let handle = pool.spawn(async { 42 });
    while !handle.is_finished() {
        sleep(Duration::from_millis(5)).await;
    }
    handle.cancel();

    assert_eq!(handle.join().await, Some(42));
}

#[tokio::test]
async fn test_capacity_bounds_concurrency() {
    let pool = TaskPool::with_capacity(2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.spawn(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(30)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.join().await;
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_spawn_into_delivers_completion() {
    let pool = TaskPool::with_capacity(2);
    let (tx, mut rx) = mpsc::unbounded_channel();

    pool.spawn_into(async { "done" }, tx);

    assert_eq!(rx.recv().await, Some("done"));
}

#[tokio::test]
async fn test_cancelled_spawn_into_never_delivers() {
    let pool = TaskPool::with_capacity(2);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = pool.spawn_into(
        async {
            sleep(Duration::from_millis(100)).await;
            "late"
        },
        tx,
    );
    handle.cancel();
    handle.join().await;

    sleep(Duration::from_millis(200)).await;
    // Channel is closed without a queued completion
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_dropped_receiver_is_harmless() {
    let pool = TaskPool::with_capacity(2);
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);

    // Screen torn down before the call completed
    let handle = pool.spawn_into(async { "orphaned" }, tx);

    assert_eq!(handle.join().await, Some(()));
}

#[tokio::test]
async fn test_panicked_task_joins_to_none() {
    let pool = TaskPool::with_capacity(2);

    let handle = pool.spawn(async {
        panic!("boom");
    });

    assert_eq!(handle.join().await, None);
}
