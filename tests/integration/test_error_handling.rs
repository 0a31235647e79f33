// エラーハンドリングの統合テスト
// 非致命的な診断・設定エラー・停止後の操作
#[path = "../fixtures/mod.rs"]
mod fixtures;

use cosmic_orders::{
    core::{traits::MockProgressReporter, OrderRecord, PipelineError, Task},
    engine::{demonstrate_edge_cases, FanOutDistributor, PoolJob, WorkerPool},
    services::NoOpProgressReporter,
};
use fixtures::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_edge_cases_only_emit_diagnostics() {
    let (app, sink) = collecting_app();
    app.orders.append(1, "Mars", "Galactic Cheese");

    let outcome = demonstrate_edge_cases(&app.orders, &app.catalog).await;

    assert!(outcome.out_of_range_ignored);
    assert!(outcome.duplicate_stored_once);
    assert!(outcome.late_task_discarded);

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].code, "index_out_of_range");
    assert!(records[0].message.contains("10000000"));
    assert_eq!(records[1].code, "duplicate_ingredient");
}

#[test]
fn test_try_variants_return_structured_errors() {
    let (app, sink) = collecting_app();

    let result = app
        .orders
        .try_insert_at(3, OrderRecord::new(1, "Venus", "Quantum Anchoa"));
    assert!(matches!(
        result,
        Err(PipelineError::IndexOutOfRange { index: 3, len: 0 })
    ));

    app.catalog.try_insert(5).unwrap();
    let duplicate = app.catalog.try_insert(5).unwrap_err();
    assert!(duplicate.is_recoverable());
    assert_eq!(duplicate.code(), "duplicate_ingredient");

    // try_* は診断チャネルへは流さない
    assert!(sink.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_invalid_configs_are_rejected() {
    let (app, _sink) = collecting_app();

    for config in [
        fast_config().with_pool_size(0),
        fast_config().with_fan_out_workers(0),
        fast_config().with_buffer_size(0),
        fast_config().with_max_ingredient(0),
    ] {
        let pipeline = app.create_custom_pipeline(config, NoOpProgressReporter::new());
        let error = pipeline.run(insert_tasks([1])).await.unwrap_err();

        assert!(matches!(error, PipelineError::Configuration { .. }));
        assert!(!error.is_recoverable());
    }
    assert!(app.catalog.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failing_jobs_are_logged_and_pool_continues() {
    let pool = WorkerPool::new(2);
    let succeeded = Arc::new(AtomicUsize::new(0));

    for index in 0..10 {
        let succeeded = Arc::clone(&succeeded);
        pool.submit(PoolJob::new(move || async move {
            if index % 2 == 0 {
                anyhow::bail!("oven {index} overheated");
            }
            succeeded.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .await
        .unwrap();
    }
    pool.shutdown().await.unwrap();

    assert_eq!(succeeded.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_submit_after_shutdown_returns_pool_closed() {
    let pool = WorkerPool::new(1);
    pool.shutdown().await.unwrap();

    let error = pool
        .submit(PoolJob::new(|| async { Ok(()) }))
        .await
        .unwrap_err();
    assert!(matches!(error, PipelineError::PoolClosed));
    assert_eq!(error.code(), "pool_closed");
}

#[tokio::test]
async fn test_add_data_after_shutdown_is_silent() {
    let (source_tx, source_rx) = mpsc::channel(1);
    let distributor = FanOutDistributor::new(&source_tx, source_rx, 3);
    distributor.shutdown().await;

    for value in 0..5 {
        assert!(!distributor.add_data(Task::InsertIngredient { value }).await);
    }
    assert!(distributor.is_shutdown());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reporter_is_not_started_for_invalid_config() {
    let (app, _sink) = collecting_app();
    let mut reporter = MockProgressReporter::new();
    reporter.expect_report_started().never();
    reporter.expect_report_completed().never();

    let pipeline = app.create_custom_pipeline(fast_config().with_pool_size(0), reporter);
    assert!(pipeline.run(Vec::new()).await.is_err());
}
