// Collector - 結果ストリームの集計機能
// 到着したタスクを再生して最終状態を推定する（ベストエフォート）

use crate::core::{OrderRecord, ProgressReporter, Task};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 結果ストリームから再構成した最終状態
///
/// 到着順は生成順と一致しないため、実際のコンテナの内容とずれることがある。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedView {
    pub surviving_orders: Vec<OrderRecord>,
    /// 挿入タスクの到着順（重複もそのまま含む）
    pub ingredients: Vec<i64>,
    pub special_item_present: bool,
    pub tasks_observed: usize,
}

/// タスクを1件ずつ取り込むアグリゲータ
#[derive(Debug, Default)]
pub struct ResultAggregator {
    orders: Vec<OrderRecord>,
    ingredients: Vec<i64>,
    observed: usize,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, task: &Task) {
        self.observed += 1;
        match task {
            Task::AddOrder(record) => self.orders.push(record.clone()),
            Task::RemoveOrder { order_id } => {
                // 集計側で見えていないIDの削除は無視する
                if let Some(position) = self.orders.iter().position(|o| o.order_id == *order_id) {
                    self.orders.remove(position);
                }
            }
            Task::InsertIngredient { value } => self.ingredients.push(*value),
            Task::SearchIngredient { .. } => {}
        }
    }

    pub fn observed(&self) -> usize {
        self.observed
    }

    /// 集計を確定し、特別メニューが残っているかを判定する
    pub fn finish(self, special_item: &str) -> AggregatedView {
        let special_item_present = self.orders.iter().any(|o| o.item_type == special_item);
        AggregatedView {
            surviving_orders: self.orders,
            ingredients: self.ingredients,
            special_item_present,
            tasks_observed: self.observed,
        }
    }
}

/// Collector: 結果ストリームを最後まで読み、集計結果を返す
pub fn spawn_result_collector<R>(
    mut results_rx: mpsc::Receiver<Task>,
    special_item: String,
    reporter: Arc<R>,
    total_tasks: usize,
) -> tokio::task::JoinHandle<Result<AggregatedView>>
where
    R: ProgressReporter + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut aggregator = ResultAggregator::new();

        while let Some(task) = results_rx.recv().await {
            aggregator.observe(&task);

            // 進捗報告
            reporter
                .report_progress(aggregator.observed(), total_tasks)
                .await;
        }

        Ok(aggregator.finish(&special_item))
    })
}
