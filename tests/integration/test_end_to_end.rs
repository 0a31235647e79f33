// エンドツーエンド統合テスト
#[path = "../fixtures/mod.rs"]
mod fixtures;

use cosmic_orders::{
    cli::write_report,
    core::{PipelineConfig, PipelineReport, Task, TaskKind},
    engine::Pipeline,
    services::{
        generate_batch, ConsoleProgressReporter, DefaultPipelineConfig, NoOpProgressReporter,
        RandomTaskGenerator, TaskMix,
    },
};
use fixtures::*;
use std::collections::HashSet;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_scenario_after_full_drain() {
    let (app, _sink) = collecting_app();
    let config = DefaultPipelineConfig::default();
    let generator = RandomTaskGenerator::seeded(7, config.max_ingredient_value());

    let tasks = generate_batch(&generator, &TaskMix::from_config(&config));
    let removed_candidates: HashSet<u64> = tasks
        .iter()
        .filter(|t| t.kind() == TaskKind::RemoveOrder)
        .filter_map(Task::order_id)
        .collect();

    let pipeline = app.create_custom_pipeline(config, NoOpProgressReporter::new());
    let report = pipeline.run(tasks).await.unwrap();

    // 5件追加、0〜2件削除
    let ids: HashSet<u64> = app.orders.snapshot().iter().map(|o| o.order_id).collect();
    assert_eq!(ids.len(), app.orders.len());
    assert!(ids.is_subset(&(1..=5).collect()));
    let missing: HashSet<u64> = (1..=5).filter(|id| !ids.contains(id)).collect();
    assert!(missing.is_subset(&removed_candidates));
    assert!(missing.len() <= 2);

    // 食材は1〜6件の異なる値、昇順
    let values = app.catalog.traverse_in_order();
    assert!((1..=6).contains(&values.len()));
    assert_strictly_ascending(&values);
    assert_eq!(values, report.catalog_values);
    assert_eq!(report.tasks_dispatched, 19);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_report_json_round_trip_through_file() {
    let (app, _sink) = collecting_app();
    let pipeline = app.create_custom_pipeline(fast_config(), ConsoleProgressReporter::quiet());

    let mut tasks = vec![
        add_order(1, "Antimatter Pizza"),
        add_order(2, "Galactic Cheese"),
    ];
    tasks.extend(insert_tasks([50, 25, 75]));
    let report = pipeline.run(tasks).await.unwrap();

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("report.json");
    write_report(&report, &output).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["special_item"], "Antimatter Pizza");
    assert_eq!(json["special_item_present"], true);
    assert_eq!(json["catalog_values"], serde_json::json!([25, 50, 75]));
    assert_eq!(json["catalog_summary"]["sum"], 150);

    let parsed: PipelineReport = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.order_snapshot.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_special_item_missing_after_removal() {
    let (app, _sink) = collecting_app();
    let pipeline = Pipeline::new(
        Arc::clone(&app.orders),
        Arc::clone(&app.catalog),
        fast_config().with_fan_out_workers(1).with_pool_size(1),
        Arc::new(NoOpProgressReporter::new()),
    );

    // 集計は結果ストリームの到着順に再生される
    let report = pipeline
        .run(vec![
            add_order(1, "Antimatter Pizza"),
            add_order(2, "Nebula Deluxe"),
            Task::RemoveOrder { order_id: 1 },
        ])
        .await
        .unwrap();

    assert!(!report.special_item_present);
    assert_eq!(report.surviving_orders.len(), 1);
    assert_eq!(report.surviving_orders[0].order_id, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_app_run_quiet_uses_shared_containers() {
    let (app, _sink) = collecting_app();

    let first = app.run_quiet().await.unwrap();
    let second = app.run_quiet().await.unwrap();

    assert_eq!(first.tasks_dispatched, 19);
    assert_eq!(second.tasks_dispatched, 19);
    // 2回目の実行は1回目の結果の上に積み上がる
    assert!(second.catalog_values.len() >= first.catalog_values.len());
    assert_strictly_ascending(&second.catalog_values);
}
