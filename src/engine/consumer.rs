// Consumer - 分配器の出力ごとのディスパッチワーカー

use super::worker_pool::{PoolJob, WorkerPool};
use crate::containers::{IngredientCatalog, OrderSequence};
use crate::core::Task;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// ディスパッチ先（プールと共有コンテナ）
#[derive(Clone)]
pub struct DispatchTargets {
    pub pool: Arc<WorkerPool>,
    pub orders: Arc<OrderSequence>,
    pub catalog: Arc<IngredientCatalog>,
}

/// タスク1件をコンテナへ適用
///
/// コンテナ操作の失敗は診断として通知済みなので、ここでは常に成功扱い。
pub fn apply_task(task: &Task, orders: &OrderSequence, catalog: &IngredientCatalog) -> Result<()> {
    match task {
        Task::AddOrder(record) => orders.append_record(record.clone()),
        Task::RemoveOrder { order_id } => {
            let removed = orders.remove_by_id(*order_id);
            tracing::debug!(order_id, removed, "注文削除");
        }
        Task::InsertIngredient { value } => catalog.insert(*value),
        Task::SearchIngredient { value } => {
            let found = catalog.search(*value);
            tracing::debug!(value, found, "食材検索");
        }
    }
    Ok(())
}

/// 単一ディスパッチワーカー
///
/// 受け取ったタスクをプールのジョブとして投入し、同じタスクを結果ストリームへ転送する。
pub fn spawn_single_dispatcher(
    dispatcher_id: usize,
    mut output: mpsc::Receiver<Task>,
    targets: DispatchTargets,
    processed_tx: mpsc::Sender<Task>,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        while let Some(task) = output.recv().await {
            let job_task = task.clone();
            let orders = Arc::clone(&targets.orders);
            let catalog = Arc::clone(&targets.catalog);
            let job = PoolJob::new(move || async move { apply_task(&job_task, &orders, &catalog) });

            // プールへの投入（空きユニットが出るまで待機）
            if let Err(error) = targets.pool.submit(job).await {
                tracing::warn!(dispatcher_id, kind = ?task.kind(), "{error}");
            }

            if processed_tx.send(task).await.is_err() {
                // 結果チャンネルが閉じられた場合は終了
                break;
            }
        }
        Ok(())
    })
}

/// 分配器の出力1本につき1つのディスパッチワーカーを起動
pub fn spawn_dispatchers(
    outputs: Vec<mpsc::Receiver<Task>>,
    targets: DispatchTargets,
    processed_tx: mpsc::Sender<Task>,
) -> Vec<tokio::task::JoinHandle<Result<()>>> {
    outputs
        .into_iter()
        .enumerate()
        .map(|(dispatcher_id, output)| {
            spawn_single_dispatcher(dispatcher_id, output, targets.clone(), processed_tx.clone())
        })
        .collect()
}
