// 並行性の統合テスト
// 共有コンテナへの同時操作とプール経由の大量投入
#[path = "../fixtures/mod.rs"]
mod fixtures;

use cosmic_orders::{
    core::Task,
    engine::{FanOutDistributor, PoolJob, WorkerPool},
    services::NoOpProgressReporter,
};
use fixtures::*;
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_thousands_of_concurrent_inserts_through_pool() {
    let (app, sink) = collecting_app();
    let pool = Arc::new(WorkerPool::new(16));

    let mut values: Vec<i64> = (1..=2_000).collect();
    values.shuffle(&mut rand::rng());

    let submitters: Vec<_> = values
        .chunks(100)
        .map(|chunk| {
            let pool = Arc::clone(&pool);
            let catalog = Arc::clone(&app.catalog);
            let chunk = chunk.to_vec();
            tokio::spawn(async move {
                for value in chunk {
                    let catalog = Arc::clone(&catalog);
                    pool.submit(PoolJob::new(move || async move {
                        catalog.insert(value);
                        Ok(())
                    }))
                    .await
                    .unwrap();
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.await.unwrap();
    }
    pool.shutdown().await.unwrap();

    let traversed = app.catalog.traverse_in_order();
    assert_eq!(traversed, (1..=2_000).collect::<Vec<_>>());
    assert!(sink.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_pipeline_with_many_tasks_and_duplicates() {
    let (app, sink) = collecting_app();
    let pipeline = app.create_custom_pipeline(
        fast_config().with_pool_size(8).with_fan_out_workers(6),
        NoOpProgressReporter::new(),
    );

    // 1..=500 を2回ずつ
    let mut tasks = insert_tasks(1..=500);
    tasks.extend(insert_tasks(1..=500));
    tasks.shuffle(&mut rand::rng());

    let report = pipeline.run(tasks).await.unwrap();

    assert_eq!(report.tasks_dispatched, 1_000);
    assert_eq!(report.catalog_values, (1..=500).collect::<Vec<_>>());
    assert_eq!(sink.count("duplicate_ingredient"), 500);
    assert_eq!(report.catalog_summary.sum, 125_250);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_orders_keep_sequence_consistent() {
    let (app, sink) = collecting_app();
    let pipeline = app.create_custom_pipeline(
        fast_config().with_pool_size(10).with_fan_out_workers(5),
        NoOpProgressReporter::new(),
    );

    let additions: Vec<Task> = (1..=300).map(|id| add_order(id, "Galactic Cheese")).collect();
    let report = pipeline.run(additions).await.unwrap();
    assert_eq!(report.order_snapshot.len(), 300);

    // 追加済みの全注文を削除
    let removals: Vec<Task> = (1..=300).map(|order_id| Task::RemoveOrder { order_id }).collect();
    let report = pipeline.run(removals).await.unwrap();

    assert!(report.order_snapshot.is_empty());
    assert!(app.orders.is_empty());
    assert!(sink.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_backpressure_serializes_single_unit() {
    let pool = WorkerPool::new(1);
    let running = Arc::new(AtomicUsize::new(0));
    let max_running = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    for _ in 0..5 {
        let running = Arc::clone(&running);
        let max_running = Arc::clone(&max_running);
        pool.submit(PoolJob::new(move || async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            max_running.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(20)).await;
            running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }))
        .await
        .unwrap();
    }
    pool.shutdown().await.unwrap();

    assert_eq!(max_running.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distributor_spreads_work_without_duplication() {
    let (source_tx, source_rx) = mpsc::channel(1);
    let distributor = FanOutDistributor::new(&source_tx, source_rx, 8);
    let outputs = distributor.take_outputs();

    let counted = Arc::new(AtomicUsize::new(0));
    let drains: Vec<_> = outputs
        .into_iter()
        .map(|mut output| {
            let counted = Arc::clone(&counted);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(task) = output.recv().await {
                    counted.fetch_add(1, Ordering::SeqCst);
                    seen.extend(task.ingredient());
                }
                seen
            })
        })
        .collect();

    for value in 0..1_000 {
        assert!(distributor.add_data(Task::SearchIngredient { value }).await);
    }
    drop(source_tx);

    let mut all = Vec::new();
    for drain in drains {
        all.extend(timeout(Duration::from_secs(5), drain).await.unwrap().unwrap());
    }
    all.sort_unstable();

    assert_eq!(counted.load(Ordering::SeqCst), 1_000);
    assert_eq!(all, (0..1_000).collect::<Vec<_>>());
    distributor.shutdown().await;
}
