// テストユーティリティ
// 統合テストで共有するApp・設定・タスク生成のヘルパー
#![allow(dead_code)]

use cosmic_orders::{
    core::{OrderRecord, Task},
    services::{CollectingDiagnosticSink, DefaultPipelineConfig},
    App,
};
use std::sync::Arc;
use std::time::Duration;

/// 診断を収集するAppを作成
pub fn collecting_app() -> (App, Arc<CollectingDiagnosticSink>) {
    let sink = Arc::new(CollectingDiagnosticSink::new());
    (App::with_diagnostics(sink.clone()), sink)
}

/// 処理時間を短くした設定
pub fn fast_config() -> DefaultPipelineConfig {
    DefaultPipelineConfig::default()
        .with_process_times(Duration::from_millis(1), Duration::from_millis(1))
}

pub fn add_order(order_id: u64, item_type: &str) -> Task {
    Task::AddOrder(OrderRecord::new(order_id, "Mars", item_type))
}

pub fn insert_tasks(values: impl IntoIterator<Item = i64>) -> Vec<Task> {
    values
        .into_iter()
        .map(|value| Task::InsertIngredient { value })
        .collect()
}

/// 値が厳密に昇順であることを確認
pub fn assert_strictly_ascending(values: &[i64]) {
    assert!(
        values.windows(2).all(|pair| pair[0] < pair[1]),
        "not strictly ascending: {values:?}"
    );
}
